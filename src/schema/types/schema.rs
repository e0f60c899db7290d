use serde::{Deserialize, Serialize};

/// Name of the audit field holding the creation time.
pub const CREATED_AT: &str = "createdAt";
/// Name of the audit field holding the last modification time.
pub const UPDATED_AT: &str = "updatedAt";
/// Name of the document identifier field.
pub const ID_FIELD: &str = "_id";

/// Storage-level type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    /// Identifier of a document in another collection.
    ObjectRef,
    Array(Box<FieldType>),
    /// Any JSON value.
    Mixed,
}

/// Storage definition of a single field, produced by a field mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFragment {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Target collection for [`FieldType::ObjectRef`] fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Closed set of accepted string values, empty when unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl FieldFragment {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            reference: None,
            allowed_values: Vec::new(),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_reference(mut self, collection: impl Into<String>) -> Self {
        self.reference = Some(collection.into());
        self
    }

    pub fn with_allowed_values(mut self, values: Vec<String>) -> Self {
        self.allowed_values = values;
        self
    }
}

/// Clock used for automatic `createdAt`/`updatedAt` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampSource {
    /// Milliseconds since the Unix epoch, stored as a number.
    EpochMillis,
    /// RFC 3339 date string.
    Rfc3339,
}

/// Schema-level behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    /// Documents may use `type` as an ordinary data key.
    pub flexible_keying: bool,
    /// Drop keys that the schema does not declare.
    pub strict_field_checking: bool,
    /// Generate `_id` when a document has none. When disabled the document's
    /// own `_id` is its natural key and must be supplied.
    pub auto_id: bool,
    pub timestamps: Option<TimestampSource>,
}

impl SchemaOptions {
    /// Options attached to every schema built from a collection description.
    pub fn collection() -> Self {
        Self {
            flexible_keying: true,
            strict_field_checking: false,
            auto_id: true,
            timestamps: Some(TimestampSource::EpochMillis),
        }
    }

    /// Options for fixed system collections keyed by their own identifier.
    pub fn natural_key() -> Self {
        Self {
            flexible_keying: false,
            strict_field_checking: true,
            auto_id: false,
            timestamps: None,
        }
    }

    pub fn with_timestamps(mut self, source: TimestampSource) -> Self {
        self.timestamps = Some(source);
        self
    }
}

/// Complete storage schema of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSchema {
    pub fields: Vec<FieldFragment>,
    pub options: SchemaOptions,
}

impl StorageSchema {
    pub fn new(fields: Vec<FieldFragment>, options: SchemaOptions) -> Self {
        Self { fields, options }
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldFragment> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    pub fn has_timestamps(&self) -> bool {
        self.options.timestamps.is_some()
    }
}
