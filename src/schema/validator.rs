//! Schema validation with per-field messages
//!
//! Records are checked against the form's JSON Schema and every failure is
//! reported against a dotted field path (`links.resourceLink`). Schemas may
//! carry an `errorMessage` annotation per property, either a single string or
//! an object keyed by the failing keyword; anything else gets a generic text.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::forms::Form;
use crate::schema::registry::SchemaRegistry;
use crate::yaml::YamlSyntaxError;

/// Failure to load or compile a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No schema registered for form: {0}")]
    NotFound(String),

    #[error("Schema '{name}' is invalid: {message}")]
    Invalid { name: String, message: String },
}

/// Validation messages keyed by dotted field path
///
/// Only the first message for a path is kept. The root record uses the
/// empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a path; returns false if the path already had one
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) -> bool {
        let path = path.into();
        if self.errors.contains_key(&path) {
            return false;
        }
        self.errors.insert(path, message.into());
        true
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.errors.remove(path)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(p, m)| (p.as_str(), m.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.errors.len() {
            1 => write!(f, "1 field is invalid"),
            n => write!(f, "{} fields are invalid", n),
        }
    }
}

impl std::error::Error for FieldErrors {}

/// Draft file failed schema validation
#[derive(Debug, Error, Diagnostic)]
#[error("Draft validation failed: {summary}")]
#[diagnostic(code(academy::schema::draft_invalid))]
pub struct DraftValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<FieldViolation>,

    errors: FieldErrors,
}

impl DraftValidationError {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// The underlying per-field messages
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }
}

/// A single field failing validation inside a draft file
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct FieldViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

/// Anything that can go wrong with a draft file
#[derive(Debug, Error, Diagnostic)]
pub enum DraftError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] DraftValidationError),
}

/// Compiled validator for one form schema
pub struct Validator {
    name: String,
    schema: Value,
    compiled: JsonValidator,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish()
    }
}

impl Validator {
    /// Compile the named schema from the registry
    pub fn new(registry: &SchemaRegistry, name: &str) -> Result<Self, SchemaError> {
        let text = registry
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        let schema: Value = serde_json::from_str(text).map_err(|e| SchemaError::Invalid {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let compiled = jsonschema::options()
            .should_validate_formats(true)
            .with_format("url", is_url)
            .build(&schema)
            .map_err(|e| SchemaError::Invalid {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            schema,
            compiled,
        })
    }

    /// Compile the schema belonging to a form type
    pub fn for_form<F: Form>() -> Result<Self, SchemaError> {
        Self::new(&SchemaRegistry::default(), F::SCHEMA)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Collect every field error in a record. Never fails; an empty result
    /// means the record is valid.
    pub fn check(&self, record: &Value) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for error in self.compiled.iter_errors(record) {
            let segments = error_segments(&error);
            let message = self.message_for(&segments, &error);
            errors.insert(segments.join("."), message);
        }
        errors
    }

    /// Validate a record and convert it into the form's typed value
    pub fn validate<F: Form>(&self, record: &Value) -> Result<F, FieldErrors> {
        let errors = self.check(record);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut record = record.clone();
        whole_numbers(&mut record);
        serde_json::from_value(record).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.insert("", format!("Record does not match the {} form: {}", self.name, e));
            errors
        })
    }

    /// Parse and validate a YAML draft file
    ///
    /// Scalars are coerced toward the types in `shape` first, so `USD: 500`
    /// is read as the string "500". On failure every violation points at the
    /// offending key in `content`.
    pub fn validate_draft(
        &self,
        content: &str,
        filename: &str,
        shape: &Value,
    ) -> Result<Value, DraftError> {
        let mut record = parse_draft(content, filename)?;
        coerce_scalars(&mut record, shape);

        let mut violations = Vec::new();
        let mut errors = FieldErrors::new();
        for error in self.compiled.iter_errors(&record) {
            let segments = error_segments(&error);
            let path = segments.join(".");
            if errors.contains(&path) {
                continue;
            }

            let message = self.message_for(&segments, &error);
            let display = if path.is_empty() {
                message.clone()
            } else {
                format!("{}: {}", path, message)
            };
            violations.push(FieldViolation {
                span: find_path_span(content, &segments),
                message: display,
                hint: format_error_hint(&error.kind).to_string(),
                help: self.help_for(&segments, &error.kind),
            });
            errors.insert(path, message);
        }

        if violations.is_empty() {
            return Ok(record);
        }

        let summary = match violations.len() {
            1 => "1 error".to_string(),
            n => format!("{} errors", n),
        };
        Err(DraftError::Invalid(DraftValidationError {
            summary,
            src: NamedSource::new(filename, content.to_string()),
            violations,
            errors,
        }))
    }

    /// Schema node describing the field at `segments`
    pub fn property(&self, segments: &[String]) -> Option<&Value> {
        segments.iter().try_fold(&self.schema, |node, segment| {
            node.get("properties").and_then(|props| props.get(segment.as_str()))
        })
    }

    fn message_for(&self, segments: &[String], error: &JsonSchemaError) -> String {
        self.property(segments)
            .and_then(|node| node.get("errorMessage"))
            .and_then(|annotation| match annotation {
                Value::String(message) => Some(message.clone()),
                Value::Object(by_keyword) => by_keyword
                    .get(keyword_of(&error.kind))
                    .and_then(Value::as_str)
                    .map(String::from),
                _ => None,
            })
            .unwrap_or_else(|| format_schema_error(error))
    }

    fn help_for(&self, segments: &[String], kind: &ValidationErrorKind) -> Option<String> {
        match kind {
            ValidationErrorKind::Enum { options } => {
                Some(format!("Valid values: {}", format_enum_options(options)))
            }
            ValidationErrorKind::Format { format } if format == "url" => {
                Some("Use a full URL, e.g. https://example.com".to_string())
            }
            ValidationErrorKind::Required { property } => {
                let name = property.as_str().map(String::from).unwrap_or_else(|| property.to_string());
                Some(format!("Add the '{}' field to your draft", name))
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                if unexpected.len() == 1 {
                    Some(format!("Remove the '{}' field or check spelling", unexpected[0]))
                } else {
                    Some("Remove unknown fields or check spelling".to_string())
                }
            }
            ValidationErrorKind::Minimum { .. } | ValidationErrorKind::Maximum { .. } => {
                let node = self.property(segments)?;
                let min = node.get("minimum")?;
                let max = node.get("maximum")?;
                Some(format!("Choose a value from {} to {}", min, max))
            }
            _ => None,
        }
    }
}

fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Field path segments for an error. A missing property is reported at the
/// property itself rather than at its parent object.
fn error_segments(error: &JsonSchemaError) -> Vec<String> {
    let mut segments = pointer_segments(error.instance_path.as_str());
    if let ValidationErrorKind::Required { property } = &error.kind {
        segments.push(
            property
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| property.to_string()),
        );
    }
    segments
}

/// Split a JSON pointer into unescaped segments
pub fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Turn a dotted field path into a JSON pointer
pub fn path_to_pointer(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    path.split('.')
        .map(|s| format!("/{}", s.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Keyword name used to key `errorMessage` objects
fn keyword_of(kind: &ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::Required { .. } => "required",
        ValidationErrorKind::Type { .. } => "type",
        ValidationErrorKind::Enum { .. } => "enum",
        ValidationErrorKind::MinLength { .. } => "minLength",
        ValidationErrorKind::MaxLength { .. } => "maxLength",
        ValidationErrorKind::Minimum { .. } => "minimum",
        ValidationErrorKind::Maximum { .. } => "maximum",
        ValidationErrorKind::Format { .. } => "format",
        ValidationErrorKind::Pattern { .. } => "pattern",
        ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
        _ => "other",
    }
}

/// Generic message when the schema has no annotation for the failure
fn format_schema_error(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "This field is required".to_string(),
        ValidationErrorKind::Enum { options } => {
            format!("Must be one of: {}", format_enum_options(options))
        }
        ValidationErrorKind::MinLength { limit } if *limit == 1 => {
            "This field is required".to_string()
        }
        ValidationErrorKind::MinLength { limit } => {
            format!("Must be at least {} characters", limit)
        }
        ValidationErrorKind::MaxLength { limit } => {
            format!("Must be at most {} characters", limit)
        }
        ValidationErrorKind::Minimum { limit } => format!("Must be at least {}", limit),
        ValidationErrorKind::Maximum { limit } => format!("Must be at most {}", limit),
        ValidationErrorKind::Format { format } => format!("Invalid {}", format),
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s): {}", unexpected.join(", "))
        }
        _ => error.to_string(),
    }
}

/// Short hint for a diagnostic label
fn format_error_hint(kind: &ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::Required { .. } => "required field missing",
        ValidationErrorKind::Type { .. } => "wrong type",
        ValidationErrorKind::Enum { .. } => "not an option",
        ValidationErrorKind::MinLength { .. } => "empty",
        ValidationErrorKind::Minimum { .. } => "too small",
        ValidationErrorKind::Maximum { .. } => "too large",
        ValidationErrorKind::Format { .. } => "malformed",
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field",
        _ => "validation error",
    }
}

fn format_enum_options(options: &Value) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Parse YAML draft content into a JSON record
pub fn parse_draft(content: &str, filename: &str) -> Result<Value, YamlSyntaxError> {
    let yaml: serde_yml::Value = serde_yml::from_str(content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename))?;

    serde_json::to_value(&yaml).map_err(|e| {
        YamlSyntaxError::at_location(
            format!("Draft cannot be represented as JSON: {}", e),
            content,
            filename,
            1,
            1,
            Some("Use plain strings, numbers and nested mappings only".to_string()),
        )
    })
}

/// Coerce scalars toward the JSON types found at the same place in `shape`
///
/// Numbers and booleans become strings where a string is expected, and
/// numeric strings become integers where an integer is expected. Values
/// that don't convert are left for the schema to reject.
pub fn coerce_scalars(value: &mut Value, shape: &Value) {
    match shape {
        Value::Object(shape_fields) => {
            if let Value::Object(fields) = value {
                for (key, field) in fields.iter_mut() {
                    if let Some(field_shape) = shape_fields.get(key) {
                        coerce_scalars(field, field_shape);
                    }
                }
            }
        }
        Value::String(_) => {
            if matches!(value, Value::Number(_) | Value::Bool(_)) {
                *value = Value::String(value.to_string());
            }
        }
        Value::Number(_) => {
            if let Some(parsed) = value.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
                *value = Value::Number(parsed.into());
            } else {
                whole_numbers(value);
            }
        }
        _ => {}
    }
}

/// Rewrite floats with no fractional part (`2.0`) as integers, recursively
///
/// JSON Schema's `integer` accepts `2.0`; typed integer fields do not.
/// Fractional values are left alone for the schema to reject.
pub fn whole_numbers(value: &mut Value) {
    match value {
        Value::Object(fields) => fields.values_mut().for_each(whole_numbers),
        Value::Array(items) => items.iter_mut().for_each(whole_numbers),
        Value::Number(n) if !n.is_i64() && !n.is_u64() => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    *value = Value::Number((f as i64).into());
                }
            }
        }
        _ => {}
    }
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span for a nested key path in YAML content
///
/// Each segment is searched for after the previous one, so `price.USD`
/// and `recurrentPrice.USD` land on different lines. Falls back to the
/// deepest ancestor found, then to the first line.
fn find_path_span(content: &str, segments: &[String]) -> SourceSpan {
    let mut from = 0;
    let mut found = None;

    for segment in segments {
        match find_key_span(content, segment, from) {
            Some((offset, len)) => {
                from = offset + len;
                found = Some((offset, len));
            }
            None => break,
        }
    }

    found
        .map(SourceSpan::from)
        .unwrap_or_else(|| first_line_span(content))
}

/// Find `key:` at the start of a line at or after byte offset `from`
fn find_key_span(content: &str, key: &str, from: usize) -> Option<(usize, usize)> {
    let plain = format!("{}:", key);
    let double_quoted = format!("\"{}\":", key);
    let single_quoted = format!("'{}':", key);

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line_start < from {
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with(&plain)
            || trimmed.starts_with(&double_quoted)
            || trimmed.starts_with(&single_quoted)
        {
            let key_start = line_start + (line.len() - trimmed.len());
            let key_len = trimmed.trim_end().len().max(1);
            return Some((key_start, key_len));
        }
    }
    None
}
