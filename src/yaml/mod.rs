//! YAML handling for draft files

pub mod diagnostics;

pub use diagnostics::YamlSyntaxError;
