//! Schema registry - JSON Schemas embedded into the binary

use rust_embed::Embed;
use std::collections::BTreeMap;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Registry of form schemas keyed by form name ("course", "registration")
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, String>,
}

impl SchemaRegistry {
    /// Get the raw schema text for a form
    pub fn get(&self, name: &str) -> Option<&str> {
        self.schemas.get(name).map(String::as_str)
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Names of all registered schemas
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut schemas = BTreeMap::new();

        for file in EmbeddedSchemas::iter() {
            let filename = file.as_ref();
            let Some(name) = filename.strip_suffix(".schema.json") else {
                continue;
            };
            if let Some(content) = EmbeddedSchemas::get(filename) {
                if let Ok(text) = std::str::from_utf8(&content.data) {
                    schemas.insert(name.to_string(), text.to_string());
                }
            }
        }

        Self { schemas }
    }
}
