//! Collection descriptions and their JSON loaders.

use crate::schema::types::{FieldDescription, SchemaError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A collection as described by external configuration: its name and an
/// ordered list of fields. Unrelated configuration keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
}

impl CollectionDescription {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescription>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Whether this description can be registered at all.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Loads a single collection description from a JSON file.
pub fn load_collection_from_file(path: &Path) -> Result<CollectionDescription, SchemaError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        SchemaError::NotFound(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        SchemaError::InvalidData(format!(
            "Failed to parse collection '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Loads every `*.json` file of a directory, ordered by file name.
pub fn load_collections_from_dir(dir: &Path) -> Result<Vec<CollectionDescription>, SchemaError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        SchemaError::NotFound(format!(
            "Failed to read collections directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SchemaError::InvalidData(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            paths.push(path);
        } else {
            debug!("Ignoring non-JSON entry {}", path.display());
        }
    }
    paths.sort();

    let collections = paths
        .iter()
        .map(|path| load_collection_from_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        "Loaded {} collection descriptions from {}",
        collections.len(),
        dir.display()
    );
    Ok(collections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldKind;
    use tempfile::tempdir;

    #[test]
    fn test_parses_description_and_ignores_extra_keys() {
        let description: CollectionDescription = serde_json::from_str(
            r#"{"name": "posts", "icon": "bi:card-text", "status": "published",
                "fields": [{"name": "title", "type": "text"}]}"#,
        )
        .unwrap();
        assert_eq!(description.name, "posts");
        assert_eq!(description.fields.len(), 1);
        assert_eq!(description.fields[0].kind, FieldKind::Text);
    }

    #[test]
    fn test_missing_name_deserializes_as_empty() {
        let description: CollectionDescription =
            serde_json::from_str(r#"{"fields": []}"#).unwrap();
        assert!(!description.has_name());
    }

    #[test]
    fn test_loads_directory_in_file_name_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b_pages.json"),
            r#"{"name": "pages", "fields": []}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a_posts.json"),
            r#"{"name": "posts", "fields": [{"name": "title", "type": "text"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a collection").unwrap();

        let collections = load_collections_from_dir(dir.path()).unwrap();
        let names: Vec<_> = collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "pages"]);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_collection_from_file(&path),
            Err(SchemaError::InvalidData(_))
        ));
    }
}
