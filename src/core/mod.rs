//! Core module - form state, submission and configuration

pub mod config;
pub mod controller;
pub mod pipeline;
pub mod submit;

pub use config::{Config, ConfigError};
pub use controller::{ControllerError, FieldBinding, FormController};
pub use pipeline::{Notification, NotificationKind, SubmitOutcome, SubmitPipeline, SubmitState};
pub use submit::{CourseEndpoint, RegistrationLog, SubmitError, Submitter};
