//! Schema-driven interactive wizard for filling in a form
//!
//! Walks the form's fields in declaration order, picks a prompt from the
//! field's schema and writes answers through the form controller. Fields
//! marked `x-options` get their choices from an [`OptionSource`]; a field
//! marked `x-dependsOn` is cleared whenever the field it names changes.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::core::FormController;
use crate::forms::Form;
use crate::schema::validator::Validator;

/// Supplies choices for fields whose options live outside the schema
pub trait OptionSource {
    /// Choices for the named option list, e.g. "countries"
    fn choices(&mut self, list: &str) -> Result<Vec<String>>;

    /// Called after the user picks a value from `list`
    fn chosen(&mut self, list: &str, value: &str) -> Result<()> {
        let _ = (list, value);
        Ok(())
    }
}

/// For forms with no remote option lists
pub struct NoOptions;

impl OptionSource for NoOptions {
    fn choices(&mut self, list: &str) -> Result<Vec<String>> {
        Err(miette::miette!("No option source for '{}'", list))
    }
}

/// How a field is prompted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text { placeholder: Option<String> },
    Enum { values: Vec<String> },
    Labelled { choices: Vec<(i64, String)> },
    Integer { minimum: Option<i64>, maximum: Option<i64> },
    Options { list: String },
}

/// Prompt information for one field
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub path: String,
    pub label: String,
    pub description: Option<String>,
    pub field_type: FieldType,
    /// Field whose value this one is only meaningful under
    pub depends_on: Option<String>,
}

impl FieldInfo {
    /// Read prompt information from a field's schema node
    pub fn from_schema(path: &str, node: &Value) -> Self {
        let description = node.get("description").and_then(Value::as_str).map(String::from);

        let field_type = if let Some(list) = node.get("x-options").and_then(Value::as_str) {
            FieldType::Options {
                list: list.to_string(),
            }
        } else if let Some(values) = node.get("enum").and_then(Value::as_array) {
            FieldType::Enum {
                values: values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect(),
            }
        } else if let Some(labels) = node.get("x-enumLabels").and_then(Value::as_object) {
            let mut choices: Vec<(i64, String)> = labels
                .iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_str()?.to_string())))
                .collect();
            choices.sort_by_key(|(n, _)| *n);
            FieldType::Labelled { choices }
        } else if node.get("type").and_then(Value::as_str) == Some("integer") {
            FieldType::Integer {
                minimum: node.get("minimum").and_then(Value::as_i64),
                maximum: node.get("maximum").and_then(Value::as_i64),
            }
        } else {
            FieldType::Text {
                placeholder: node.get("x-placeholder").and_then(Value::as_str).map(String::from),
            }
        };

        Self {
            path: path.to_string(),
            label: format_label(path),
            description,
            field_type,
            depends_on: node.get("x-dependsOn").and_then(Value::as_str).map(String::from),
        }
    }
}

/// Interactive wizard over a form's schema
pub struct SchemaWizard<'v> {
    validator: &'v Validator,
    theme: ColorfulTheme,
}

impl<'v> SchemaWizard<'v> {
    pub fn new(validator: &'v Validator) -> Self {
        Self {
            validator,
            theme: ColorfulTheme::default(),
        }
    }

    /// Prompt for every field of the form
    pub fn run<F: Form>(
        &self,
        controller: &mut FormController<F>,
        options: &mut dyn OptionSource,
    ) -> Result<()> {
        println!();
        println!("{} {}", style("◆").cyan(), style(F::TITLE).bold());
        println!("{}", style("─".repeat(50)).dim());
        println!();

        let paths = controller.field_paths();
        self.prompt_fields(controller, &paths, options)?;

        println!();
        println!("{} Values collected!", style("✓").green());
        Ok(())
    }

    /// Prompt again for just the given fields (e.g. those that failed validation)
    pub fn prompt_fields<F: Form>(
        &self,
        controller: &mut FormController<F>,
        paths: &[String],
        options: &mut dyn OptionSource,
    ) -> Result<()> {
        for path in paths {
            let field = self.field_info(path);
            if let Some(message) = controller.error(path) {
                println!("  {} {}", style("✗").red(), style(message).red());
            }

            loop {
                let current = controller.field(path).text();
                let answer = self.prompt(&field, &current, options)?;
                match controller.set_str(path, &answer) {
                    Ok(()) => {
                        if controller.field(path).text() != current {
                            self.clear_dependents(controller, path);
                        }
                        if let FieldType::Options { list } = &field.field_type {
                            options.chosen(list, &answer)?;
                        }
                        break;
                    }
                    Err(e) => println!("  {} {}", style("✗").red(), e),
                }
            }
        }
        Ok(())
    }

    /// Reset every field that depends on `path` back to its default
    pub fn clear_dependents<F: Form>(&self, controller: &mut FormController<F>, path: &str) {
        for other in controller.field_paths() {
            if self.field_info(&other).depends_on.as_deref() != Some(path) {
                continue;
            }
            if let Some(default) = controller.default_of(&other).cloned() {
                // Writing a field's own default can't fail
                let _ = controller.set(&other, default);
            }
        }
    }

    fn field_info(&self, path: &str) -> FieldInfo {
        let segments: Vec<String> = path.split('.').map(String::from).collect();
        let node = self.validator.property(&segments).cloned().unwrap_or(Value::Null);
        FieldInfo::from_schema(path, &node)
    }

    fn prompt(&self, field: &FieldInfo, current: &str, options: &mut dyn OptionSource) -> Result<String> {
        let prompt = format_prompt(field);

        match &field.field_type {
            FieldType::Enum { values } => self.select(&prompt, values, current),

            FieldType::Options { list } => {
                let values = options.choices(list)?;
                if values.is_empty() {
                    return Err(miette::miette!("No {} available to choose from", list));
                }
                self.select(&prompt, &values, current)
            }

            FieldType::Labelled { choices } => {
                let labels: Vec<&str> = choices.iter().map(|(_, label)| label.as_str()).collect();
                let default_idx = choices
                    .iter()
                    .position(|(n, _)| n.to_string() == current)
                    .unwrap_or(0);
                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(&labels)
                    .default(default_idx)
                    .interact()
                    .into_diagnostic()?;
                Ok(choices[selection].0.to_string())
            }

            FieldType::Integer { minimum, maximum } => {
                let hint = match (minimum, maximum) {
                    (Some(min), Some(max)) => format!("{} ({}-{})", prompt, min, max),
                    _ => prompt,
                };
                Input::with_theme(&self.theme)
                    .with_prompt(&hint)
                    .default(current.to_string())
                    .interact_text()
                    .into_diagnostic()
            }

            FieldType::Text { placeholder } => {
                let prompt = match placeholder {
                    Some(placeholder) if current.is_empty() => {
                        format!("{} {}", prompt, style(format!("[{}]", placeholder)).dim())
                    }
                    _ => prompt,
                };
                let input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .allow_empty(true);
                let input = if current.is_empty() {
                    input
                } else {
                    input.default(current.to_string())
                };
                input.interact_text().into_diagnostic()
            }
        }
    }

    fn select(&self, prompt: &str, values: &[String], current: &str) -> Result<String> {
        let default_idx = values.iter().position(|v| v == current).unwrap_or(0);
        let selection = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(values)
            .default(default_idx)
            .interact()
            .into_diagnostic()?;
        Ok(values[selection].clone())
    }
}

/// "links.resourceLink" -> "Links › Resource Link"
pub fn format_label(path: &str) -> String {
    path.split('.')
        .map(split_camel_case)
        .collect::<Vec<_>>()
        .join(" › ")
}

fn split_camel_case(segment: &str) -> String {
    // All-caps segments (USD, NGN) are acronyms
    if segment.chars().all(|c| c.is_ascii_uppercase()) {
        return segment.to_string();
    }

    let mut words = String::new();
    for (i, c) in segment.chars().enumerate() {
        if i == 0 {
            words.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            words.push(' ');
            words.push(c);
        } else {
            words.push(c);
        }
    }
    words
}

fn format_prompt(field: &FieldInfo) -> String {
    if let Some(ref desc) = field.description {
        let short_desc = if desc.chars().count() > 50 {
            format!("{}...", desc.chars().take(47).collect::<String>())
        } else {
            desc.clone()
        };
        format!("{} ({})", field.label, style(short_desc).dim())
    } else {
        field.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{Course, Registration};

    fn info<F: Form>(path: &str) -> FieldInfo {
        let validator = Validator::for_form::<F>().unwrap();
        let segments: Vec<String> = path.split('.').map(String::from).collect();
        FieldInfo::from_schema(path, validator.property(&segments).unwrap())
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label("startDate"), "Start Date");
        assert_eq!(format_label("links.resourceLink"), "Links › Resource Link");
        assert_eq!(format_label("recurrentPrice.USD"), "Recurrent Price › USD");
    }

    #[test]
    fn test_frequency_is_labelled_select() {
        let field = info::<Course>("recurrentPrice.frequency");
        let FieldType::Labelled { choices } = field.field_type else {
            panic!("expected labelled choices");
        };
        assert_eq!(choices.first(), Some(&(1, "Once".to_string())));
        assert_eq!(choices.last(), Some(&(4, "Four times".to_string())));
    }

    #[test]
    fn test_text_field_carries_placeholder() {
        let field = info::<Course>("links.platformLink");
        assert_eq!(
            field.field_type,
            FieldType::Text {
                placeholder: Some("https://discord.gg/...".to_string())
            }
        );
    }

    #[test]
    fn test_registration_field_types() {
        assert!(matches!(
            info::<Registration>("course").field_type,
            FieldType::Enum { ref values } if values.len() == 6
        ));
        assert_eq!(
            info::<Registration>("state").field_type,
            FieldType::Options {
                list: "states".to_string()
            }
        );
    }

    #[test]
    fn test_changing_country_clears_state() {
        let validator = Validator::for_form::<Registration>().unwrap();
        let wizard = SchemaWizard::new(&validator);
        let mut controller = FormController::<Registration>::new();
        controller.set_str("country", "Nigeria").unwrap();
        controller.set_str("state", "Lagos").unwrap();
        controller.set_str("cohort", "April 2025").unwrap();

        controller.set_str("country", "Ghana").unwrap();
        wizard.clear_dependents(&mut controller, "country");

        assert_eq!(controller.get("state"), Some(&Value::String(String::new())));
        assert!(!controller.is_dirty("state"));
        assert_eq!(controller.field("cohort").text(), "April 2025");
        assert_eq!(info::<Registration>("state").depends_on.as_deref(), Some("country"));
        assert_eq!(info::<Registration>("country").depends_on, None);
    }

    #[test]
    fn test_no_options_source_errors() {
        assert!(NoOptions.choices("countries").is_err());
        assert!(NoOptions.chosen("countries", "Nigeria").is_ok());
    }
}
