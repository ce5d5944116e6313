//! YAML syntax diagnostics for draft files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("YAML syntax error: {message}")]
#[diagnostic(code(academy::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let message = err.to_string();
        let help = generate_help(&message);
        Self::at_location(message, source, filename, line, column, help)
    }

    /// Create a syntax error at a 1-based line and column
    pub fn at_location(
        message: impl Into<String>,
        source: &str,
        filename: &str,
        line: usize,
        column: usize,
        help: Option<String>,
    ) -> Self {
        let offset = line_col_to_offset(source, line, column);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert a 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();

    if line_start >= source.len() {
        return source.len().saturating_sub(1);
    }

    let line_text = source[line_start..].split('\n').next().unwrap_or("");
    let column_offset = line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line_text.len());

    line_start + column_offset
}

/// Suggestions for the mistakes people make when hand-editing drafts
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs.".to_string());
    }

    if msg_lower.contains("duplicate") {
        return Some("Each field can only appear once in a draft.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") || msg_lower.contains("unexpected ':'") {
        return Some(
            "URLs and other values containing ': ' need quotes: \"https://example.com\"".to_string(),
        );
    }

    if msg_lower.contains("did not find expected") || msg_lower.contains("block end") {
        return Some("Check indentation - nested fields use two spaces under their group.".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
    }

    #[test]
    fn test_offset_clamped_past_end() {
        let source = "a: 1\n";
        assert_eq!(line_col_to_offset(source, 9, 1), 4);
        assert_eq!(line_col_to_offset(source, 1, 40), 4);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("found tab character").is_some());
        assert!(generate_help("duplicate entry with key \"name\"").is_some());
        assert!(generate_help("mapping values are not allowed in this context").is_some());
        assert!(generate_help("some random error").is_none());
    }
}
