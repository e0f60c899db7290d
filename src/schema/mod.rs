pub mod builder;
pub mod collection;
pub mod mapper;
pub mod types;

pub use builder::SchemaBuilder;
pub use collection::{load_collection_from_file, load_collections_from_dir, CollectionDescription};
pub use mapper::{FieldMapper, StandardFieldMapper};

// Re-export all types at the schema module level
pub use types::{
    FieldDescription, FieldFragment, FieldKind, FieldType, SchemaError, SchemaOptions,
    StorageSchema, TimestampSource,
};
