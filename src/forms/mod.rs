//! Form definitions - the records each flow collects and submits

pub mod course;
pub mod registration;

pub use course::{Course, CourseLinks, CoursePrice, RecurrentPrice};
pub use registration::{
    AgeRange, CourseChoice, Registration, ReferralSource, PaymentMethod, PaymentPlan,
    RegistrationCohort,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Common trait for all form records
///
/// A form ties a typed value to the schema that guards it, the record it
/// starts from, and the notification texts shown after a submission.
pub trait Form: Serialize + DeserializeOwned {
    /// Schema name in the embedded registry (e.g., "course")
    const SCHEMA: &'static str;

    /// Human-readable form title
    const TITLE: &'static str;

    /// The record a fresh or reset form holds
    fn defaults() -> Value;

    /// Acknowledgement shown after a successful submission
    fn success_message() -> String;

    /// Message shown when the submission itself fails
    fn failure_message(error: &str) -> String;
}

/// Which form a command or draft file refers to
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Course,
    Registration,
}

impl FormKind {
    pub fn schema_name(&self) -> &'static str {
        match self {
            FormKind::Course => Course::SCHEMA,
            FormKind::Registration => Registration::SCHEMA,
        }
    }

    pub fn defaults(&self) -> Value {
        match self {
            FormKind::Course => Course::defaults(),
            FormKind::Registration => Registration::defaults(),
        }
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.schema_name())
    }
}
