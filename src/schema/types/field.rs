//! Declarative field descriptions as they arrive from collection configuration.
//!
//! On the wire a field is a flat JSON object carrying a `type` tag plus
//! kind-specific options, e.g. `{"name": "author", "type": "relation", "collection": "users"}`.
//! Tags this crate does not know deserialize into [`FieldKind::Unknown`] so the
//! field mapper can reject them explicitly instead of the parser dropping them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single field of a collection description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub struct FieldDescription {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Translated fields hold one value per content language.
    pub translated: bool,
}

/// Known field kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    RichText,
    Email,
    Number,
    Currency,
    Checkbox,
    Date,
    DateTime,
    Relation { collection: Option<String> },
    Media { multiple: bool },
    Select { options: Vec<String> },
    Json,
    Unknown(String),
}

impl FieldKind {
    /// The wire tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::RichText => "rich_text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Relation { .. } => "relation",
            Self::Media { .. } => "media",
            Self::Select { .. } => "select",
            Self::Json => "json",
            Self::Unknown(kind) => kind,
        }
    }
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            translated: false,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_translated(mut self, translated: bool) -> Self {
        self.translated = translated;
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Serialize, Deserialize)]
struct RawField {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "is_false")]
    required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    translated: bool,
    #[serde(flatten)]
    options: Map<String, Value>,
}

impl From<RawField> for FieldDescription {
    fn from(raw: RawField) -> Self {
        let RawField {
            name,
            kind,
            required,
            translated,
            options,
        } = raw;

        let kind = match kind.to_ascii_lowercase().as_str() {
            "text" => FieldKind::Text,
            "rich_text" => FieldKind::RichText,
            "email" => FieldKind::Email,
            "number" => FieldKind::Number,
            "currency" => FieldKind::Currency,
            "checkbox" => FieldKind::Checkbox,
            "date" => FieldKind::Date,
            "date_time" => FieldKind::DateTime,
            "relation" => FieldKind::Relation {
                collection: options
                    .get("collection")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            "media" => FieldKind::Media {
                multiple: options
                    .get("multiple")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            "select" => FieldKind::Select {
                options: options
                    .get("options")
                    .and_then(Value::as_array)
                    .map(|values| {
                        values
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            "json" => FieldKind::Json,
            _ => FieldKind::Unknown(kind),
        };

        Self {
            name,
            kind,
            required,
            translated,
        }
    }
}

impl From<FieldDescription> for RawField {
    fn from(field: FieldDescription) -> Self {
        let mut options = Map::new();
        match &field.kind {
            FieldKind::Relation {
                collection: Some(collection),
            } => {
                options.insert("collection".to_string(), Value::from(collection.clone()));
            }
            FieldKind::Media { multiple: true } => {
                options.insert("multiple".to_string(), Value::Bool(true));
            }
            FieldKind::Select { options: values } => {
                options.insert("options".to_string(), Value::from(values.clone()));
            }
            _ => {}
        }

        Self {
            kind: field.kind.tag().to_string(),
            name: field.name,
            required: field.required,
            translated: field.translated,
            options,
        }
    }
}
