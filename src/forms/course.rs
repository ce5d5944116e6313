//! Course entity - a course offering as submitted to the backend

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::forms::Form;

/// Default number of recurrent payments per cycle
pub const DEFAULT_FREQUENCY: u8 = 2;

/// A course offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Course name
    pub name: String,

    /// First day of the course (free text, e.g. "2025-01-13")
    pub start_date: String,

    /// Duration (e.g. "2 months")
    pub duration: String,

    /// Cohort label (e.g. "December(2024)")
    pub cohort: String,

    pub links: CourseLinks,

    /// One-off price
    pub price: CoursePrice,

    /// Installment price
    pub recurrent_price: RecurrentPrice,
}

/// Links shared with enrolled students
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseLinks {
    pub resource_link: String,
    pub community_link: String,
    pub platform_name: String,
    pub platform_link: String,
}

/// Prices are kept as entered; the backend owns their interpretation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePrice {
    #[serde(rename = "USD")]
    pub usd: String,

    #[serde(rename = "NGN")]
    pub ngn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrentPrice {
    #[serde(rename = "USD")]
    pub usd: String,

    #[serde(rename = "NGN")]
    pub ngn: String,

    /// Payments per cycle, 1 through 4
    pub frequency: u8,
}

impl Form for Course {
    const SCHEMA: &'static str = "course";
    const TITLE: &'static str = "Upload Course";

    fn defaults() -> Value {
        json!({
            "name": "",
            "startDate": "",
            "duration": "",
            "cohort": "",
            "links": {
                "resourceLink": "",
                "communityLink": "",
                "platformName": "",
                "platformLink": "",
            },
            "price": {
                "USD": "",
                "NGN": "",
            },
            "recurrentPrice": {
                "USD": "",
                "NGN": "",
                "frequency": DEFAULT_FREQUENCY,
            },
        })
    }

    fn success_message() -> String {
        "New Course Added Successfully!".to_string()
    }

    fn failure_message(error: &str) -> String {
        format!("Failed to add course: {}", error)
    }
}
