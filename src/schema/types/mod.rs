pub mod errors;
pub mod field;
pub mod schema;
pub use errors::SchemaError;
pub use field::{FieldDescription, FieldKind};
pub use schema::{
    FieldFragment, FieldType, SchemaOptions, StorageSchema, TimestampSource, CREATED_AT,
    ID_FIELD, UPDATED_AT,
};
