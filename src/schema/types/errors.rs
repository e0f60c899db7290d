use std::fmt;

/// Errors raised while turning field descriptions into a storage schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    NotFound(String),
    InvalidField(String),
    UnknownFieldKind { field: String, kind: String },
    MappingError(String),
    InvalidData(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::NotFound(msg) => write!(f, "Schema not found: {}", msg),
            SchemaError::InvalidField(msg) => write!(f, "Invalid field: {}", msg),
            SchemaError::UnknownFieldKind { field, kind } => {
                write!(f, "Unknown field kind '{}' for field '{}'", kind, field)
            }
            SchemaError::MappingError(msg) => write!(f, "Mapping error: {}", msg),
            SchemaError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for SchemaError {}
