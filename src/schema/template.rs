//! Draft generation for new form records

use rust_embed::Embed;
use serde_json::{Map, Value};
use tera::Tera;
use thiserror::Error;

use crate::schema::validator::Validator;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Template generator using Tera
pub struct TemplateGenerator {
    tera: Tera,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

impl TemplateGenerator {
    /// Create a new template generator with embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Render a YAML draft for the validator's form, pre-filled with `values`
    pub fn render(&self, validator: &Validator, values: &Value) -> Result<String, TemplateError> {
        let template = format!("{}.yaml.tera", validator.name());
        if !self.tera.get_template_names().any(|n| n == template) {
            return Err(TemplateError::NotFound(template));
        }

        let mut options = Map::new();
        let mut labels = Map::new();
        collect_choices(validator.schema(), &mut options, &mut labels);

        let mut context = tera::Context::new();
        context.insert("values", values);
        context.insert("options", &options);
        context.insert("labels", &labels);

        self.tera
            .render(&template, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}

/// Gather enum values and integer labels, keyed by property name
fn collect_choices(node: &Value, options: &mut Map<String, Value>, labels: &mut Map<String, Value>) {
    let Some(properties) = node.get("properties").and_then(Value::as_object) else {
        return;
    };

    for (name, property) in properties {
        if let Some(values) = property.get("enum") {
            options.insert(name.clone(), values.clone());
        }
        if let Some(map) = property.get("x-enumLabels").and_then(Value::as_object) {
            let list = map
                .iter()
                .filter_map(|(n, label)| Some(Value::from(format!("{} = {}", n, label.as_str()?))))
                .collect();
            labels.insert(name.clone(), Value::Array(list));
        }
        collect_choices(property, options, labels);
    }
}
