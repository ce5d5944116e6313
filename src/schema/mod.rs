//! Schema system - validation, draft templates and the interactive wizard

pub mod registry;
pub mod template;
pub mod validator;
pub mod wizard;

pub use registry::SchemaRegistry;
pub use template::{TemplateError, TemplateGenerator};
pub use validator::{DraftError, DraftValidationError, FieldErrors, SchemaError, Validator};
pub use wizard::{NoOptions, OptionSource, SchemaWizard};
