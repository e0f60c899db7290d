use crate::schema::types::{FieldDescription, FieldFragment, FieldKind, FieldType, SchemaError};

/// Converts one field description into its storage fragment.
///
/// Implementations must be pure: the schema builder calls `map` exactly once
/// per field and expects the same answer for the same input.
pub trait FieldMapper: Send + Sync {
    fn map(&self, field: &FieldDescription) -> Result<FieldFragment, SchemaError>;
}

impl<F> FieldMapper for F
where
    F: Fn(&FieldDescription) -> Result<FieldFragment, SchemaError> + Send + Sync,
{
    fn map(&self, field: &FieldDescription) -> Result<FieldFragment, SchemaError> {
        self(field)
    }
}

/// Field mapper covering every [`FieldKind`] this crate understands.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFieldMapper;

impl FieldMapper for StandardFieldMapper {
    fn map(&self, field: &FieldDescription) -> Result<FieldFragment, SchemaError> {
        if field.name.trim().is_empty() {
            return Err(SchemaError::InvalidField(format!(
                "field of kind '{}' has an empty name",
                field.kind.tag()
            )));
        }

        let mut fragment = match &field.kind {
            FieldKind::Text | FieldKind::RichText | FieldKind::Email => {
                FieldFragment::new(&field.name, FieldType::String)
            }
            FieldKind::Number | FieldKind::Currency => {
                FieldFragment::new(&field.name, FieldType::Number)
            }
            FieldKind::Checkbox => FieldFragment::new(&field.name, FieldType::Boolean),
            FieldKind::Date | FieldKind::DateTime => {
                FieldFragment::new(&field.name, FieldType::Date)
            }
            FieldKind::Relation { collection } => match collection {
                Some(target) if !target.is_empty() => {
                    FieldFragment::new(&field.name, FieldType::ObjectRef).with_reference(target)
                }
                _ => {
                    return Err(SchemaError::MappingError(format!(
                        "relation field '{}' does not name a target collection",
                        field.name
                    )))
                }
            },
            FieldKind::Media { multiple: false } => {
                FieldFragment::new(&field.name, FieldType::String)
            }
            FieldKind::Media { multiple: true } => FieldFragment::new(
                &field.name,
                FieldType::Array(Box::new(FieldType::String)),
            ),
            FieldKind::Select { options } => {
                if options.is_empty() {
                    return Err(SchemaError::InvalidField(format!(
                        "select field '{}' has no options",
                        field.name
                    )));
                }
                FieldFragment::new(&field.name, FieldType::String)
                    .with_allowed_values(options.clone())
            }
            FieldKind::Json => FieldFragment::new(&field.name, FieldType::Mixed),
            FieldKind::Unknown(kind) => {
                return Err(SchemaError::UnknownFieldKind {
                    field: field.name.clone(),
                    kind: kind.clone(),
                })
            }
        };

        // One value per language: the stored shape is an object keyed by language code.
        if field.translated {
            fragment.field_type = FieldType::Mixed;
            fragment.allowed_values.clear();
        }

        Ok(fragment.with_required(field.required))
    }
}
