//! `academy schema` command - Show a form's schema
//!
//! Lists every field with its type, the values it accepts and the message
//! shown when it's invalid, so drafts can be written without the wizard.

use miette::Result;
use serde_json::Value;

use crate::forms::FormKind;
use crate::schema::registry::SchemaRegistry;

#[derive(clap::Args, Debug)]
pub struct SchemaArgs {
    /// Form to describe
    #[arg(value_enum)]
    pub form: FormKind,

    /// Show raw JSON schema instead of formatted summary
    #[arg(long)]
    pub raw: bool,
}

/// One row of the field listing
struct FieldRow {
    path: String,
    kind: String,
    accepts: Option<String>,
    message: Option<String>,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let registry = SchemaRegistry::default();
    let name = args.form.schema_name();
    let content = registry
        .get(name)
        .ok_or_else(|| miette::miette!("Schema not found: {}", name))?;

    if args.raw {
        println!("{}", content);
        return Ok(());
    }

    let schema: Value = serde_json::from_str(content).map_err(|e| miette::miette!("{}", e))?;

    let title = schema["title"].as_str().unwrap_or(name);
    let desc = schema["description"].as_str().unwrap_or("");
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    if !desc.is_empty() {
        println!("{}\n", desc);
    }

    let mut rows = Vec::new();
    collect_rows(&schema, "", &mut rows);

    println!("Fields:");
    println!("{:<28} {:<10} {}", "NAME", "TYPE", "MESSAGE");
    println!("{}", "-".repeat(80));
    for row in &rows {
        println!(
            "{:<28} {:<10} {}",
            row.path,
            row.kind,
            row.message.as_deref().unwrap_or("")
        );
    }

    let choices: Vec<&FieldRow> = rows.iter().filter(|row| row.accepts.is_some()).collect();
    if !choices.is_empty() {
        println!("\nAccepted Values:");
        for row in choices {
            println!("  {}: {}", row.path, row.accepts.as_deref().unwrap_or(""));
        }
    }

    println!("\nUse --raw for full JSON schema");
    Ok(())
}

fn collect_rows(node: &Value, prefix: &str, rows: &mut Vec<FieldRow>) {
    let Some(props) = node["properties"].as_object() else {
        return;
    };

    for (name, prop) in props {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        if prop["type"].as_str() == Some("object") {
            collect_rows(prop, &path, rows);
            continue;
        }

        rows.push(FieldRow {
            kind: get_type_str(prop),
            accepts: accepted_values(prop),
            message: first_message(prop),
            path,
        });
    }
}

fn get_type_str(prop: &Value) -> String {
    match (prop["type"].as_str(), prop["format"].as_str()) {
        (Some(t), Some(format)) => format!("{} ({})", t, format),
        (Some(t), None) => t.to_string(),
        (None, _) => "any".to_string(),
    }
}

fn accepted_values(prop: &Value) -> Option<String> {
    if let Some(values) = prop["enum"].as_array() {
        let vals: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
        return Some(vals.join(", "));
    }
    if let Some(labels) = prop["x-enumLabels"].as_object() {
        let vals: Vec<String> = labels
            .iter()
            .map(|(n, label)| format!("{} ({})", n, label.as_str().unwrap_or("")))
            .collect();
        return Some(vals.join(", "));
    }
    match prop["x-options"].as_str() {
        Some("countries") => Some("see `academy countries`".to_string()),
        Some("states") => Some("see `academy states <COUNTRY>`".to_string()),
        _ => None,
    }
}

/// The message for a missing or empty value
fn first_message(prop: &Value) -> Option<String> {
    match &prop["errorMessage"] {
        Value::String(message) => Some(message.clone()),
        Value::Object(by_keyword) => by_keyword
            .get("required")
            .or_else(|| by_keyword.values().next())
            .and_then(Value::as_str)
            .map(String::from),
        _ => None,
    }
}
