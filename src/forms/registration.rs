//! Registration entity - a student signing up for a course cohort

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::forms::Form;

/// Declares a closed set of labelled options with serde, Display and FromStr
/// all agreeing on the label text.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl From<$name> for &'static str {
            fn from(option: $name) -> Self {
                option.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|option| option.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| format!("Unknown {}: {}", stringify!($name), s))
            }
        }
    };
}

option_set! {
    /// Age bracket of the applicant
    pub enum AgeRange {
        Under18 => "Under 18",
        From18To24 => "18-24",
        From25To34 => "25-34",
        From35To44 => "35-44",
        Over45 => "45 and above",
    }
}

option_set! {
    /// Courses open for registration
    pub enum CourseChoice {
        Frontend => "Frontend Development",
        Backend => "Backend Development",
        ProductDesign => "Product Design",
        DataAnalysis => "Data Analysis",
        Cybersecurity => "Cybersecurity",
        Blockchain => "Blockchain Development",
    }
}

option_set! {
    /// Intake dates
    pub enum RegistrationCohort {
        January2025 => "January 2025",
        April2025 => "April 2025",
        July2025 => "July 2025",
        October2025 => "October 2025",
    }
}

option_set! {
    pub enum ReferralSource {
        SocialMedia => "Social Media",
        Friend => "Friend or Colleague",
        SearchEngine => "Search Engine",
        Advertisement => "Advertisement",
        Other => "Other",
    }
}

option_set! {
    /// Pay everything up front or spread over installments
    pub enum PaymentPlan {
        Full => "Full Payment",
        Installments => "Installments",
    }
}

option_set! {
    pub enum PaymentMethod {
        Card => "Card",
        BankTransfer => "Bank Transfer",
        Ussd => "USSD",
    }
}

/// A student registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub age_range: AgeRange,

    /// Country name as listed by the country directory
    pub country: String,

    /// State name; only meaningful once a country is chosen
    pub state: String,

    pub course: CourseChoice,
    pub cohort: RegistrationCohort,
    pub referral_source: ReferralSource,
    pub payment_plan: PaymentPlan,
    pub payment_method: PaymentMethod,
}

impl Form for Registration {
    const SCHEMA: &'static str = "registration";
    const TITLE: &'static str = "Student Registration";

    fn defaults() -> Value {
        json!({
            "fullName": "",
            "email": "",
            "phone": "",
            "ageRange": "",
            "country": "",
            "state": "",
            "course": "",
            "cohort": "",
            "referralSource": "",
            "paymentPlan": "",
            "paymentMethod": "",
        })
    }

    fn success_message() -> String {
        "Registration received!".to_string()
    }

    fn failure_message(error: &str) -> String {
        format!("Failed to register: {}", error)
    }
}
