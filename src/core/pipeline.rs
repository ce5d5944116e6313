//! Submit pipeline - validate, then conditionally send
//!
//! ```text
//! idle -> validating -> submitting -> succeeded | failed
//!                    \-> rejected -> idle
//! ```
//!
//! Validation always completes before anything touches the network, and a
//! rejected record never reaches the submitter. There are no retries.

use std::marker::PhantomData;
use tracing::{debug, info, warn};

use crate::core::controller::FormController;
use crate::core::submit::{SubmitError, Submitter};
use crate::forms::Form;
use crate::schema::validator::{FieldErrors, SchemaError, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
    Rejected,
}

impl std::fmt::Display for SubmitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitState::Idle => write!(f, "idle"),
            SubmitState::Validating => write!(f, "validating"),
            SubmitState::Submitting => write!(f, "submitting"),
            SubmitState::Succeeded => write!(f, "succeeded"),
            SubmitState::Failed => write!(f, "failed"),
            SubmitState::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// User-visible result of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// How a submission attempt ended
#[derive(Debug)]
pub enum SubmitOutcome<F> {
    /// Validation failed; nothing was sent
    Rejected(FieldErrors),

    /// Sent and accepted; the controller has been reset
    Succeeded { value: F, notification: Notification },

    /// Sent but the transport or server failed; entered values are kept
    Failed {
        error: SubmitError,
        notification: Notification,
    },
}

impl<F> SubmitOutcome<F> {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            SubmitOutcome::Rejected(_) => None,
            SubmitOutcome::Succeeded { notification, .. }
            | SubmitOutcome::Failed { notification, .. } => Some(notification),
        }
    }
}

/// Two-phase submit for one form type
pub struct SubmitPipeline<F: Form> {
    validator: Validator,
    state: SubmitState,
    trail: Vec<SubmitState>,
    _form: PhantomData<F>,
}

impl<F: Form + Sync> SubmitPipeline<F> {
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self::with_validator(Validator::for_form::<F>()?))
    }

    pub fn with_validator(validator: Validator) -> Self {
        Self {
            validator,
            state: SubmitState::Idle,
            trail: vec![SubmitState::Idle],
            _form: PhantomData,
        }
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// States visited by the most recent submission, starting from idle
    pub fn transitions(&self) -> &[SubmitState] {
        &self.trail
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validate the controller's current values without sending anything
    pub fn check(&self, controller: &mut FormController<F>) -> Result<F, FieldErrors> {
        let result = self.validator.validate::<F>(&controller.snapshot());
        match &result {
            Ok(_) => controller.clear_errors(),
            Err(errors) => controller.set_errors(errors.clone()),
        }
        result
    }

    /// Run one submission against `submitter`
    pub async fn submit<S>(
        &mut self,
        controller: &mut FormController<F>,
        submitter: &S,
    ) -> SubmitOutcome<F>
    where
        S: Submitter<F> + ?Sized,
    {
        self.trail = vec![SubmitState::Idle];
        self.enter(SubmitState::Validating);

        let value = match self.check(controller) {
            Ok(value) => value,
            Err(errors) => {
                debug!(form = F::SCHEMA, errors = errors.len(), "submission rejected");
                self.enter(SubmitState::Rejected);
                self.enter(SubmitState::Idle);
                return SubmitOutcome::Rejected(errors);
            }
        };

        self.enter(SubmitState::Submitting);
        match submitter.submit(&value).await {
            Ok(()) => {
                info!(form = F::SCHEMA, "submission succeeded");
                controller.reset();
                self.enter(SubmitState::Succeeded);
                SubmitOutcome::Succeeded {
                    value,
                    notification: Notification::success(F::success_message()),
                }
            }
            Err(error) => {
                warn!(form = F::SCHEMA, error = %error, "submission failed");
                self.enter(SubmitState::Failed);
                let notification = Notification::failure(F::failure_message(&error.to_string()));
                SubmitOutcome::Failed {
                    error,
                    notification,
                }
            }
        }
    }

    fn enter(&mut self, state: SubmitState) {
        debug!(form = F::SCHEMA, from = %self.state, to = %state, "pipeline transition");
        self.state = state;
        self.trail.push(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::Course;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and answers with a fixed result
    struct FakeEndpoint {
        calls: AtomicUsize,
        fail_with: Option<u16>,
    }

    impl FakeEndpoint {
        fn accepting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(status),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Submitter<Course> for FakeEndpoint {
        async fn submit(&self, _value: &Course) -> Result<(), SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(status) => Err(SubmitError::Status {
                    status,
                    body: String::new(),
                }),
                None => Ok(()),
            }
        }
    }

    fn filled_controller() -> FormController<Course> {
        let mut controller = FormController::<Course>::new();
        controller
            .load(&json!({
                "name": "Rust 101",
                "startDate": "2025-01-13",
                "duration": "2 months",
                "cohort": "January(2025)",
                "links": {
                    "resourceLink": "https://example.com/resources",
                    "communityLink": "https://chat.whatsapp.com/abc",
                    "platformName": "Discord",
                    "platformLink": "https://discord.gg/abc"
                },
                "price": { "USD": "500", "NGN": "350000" },
                "recurrentPrice": { "USD": "300", "NGN": "200000", "frequency": 3 }
            }))
            .unwrap();
        controller
    }

    #[tokio::test]
    async fn test_rejected_submission_never_sends() {
        let mut pipeline = SubmitPipeline::<Course>::new().unwrap();
        let mut controller = filled_controller();
        controller.set_str("name", "").unwrap();
        let endpoint = FakeEndpoint::accepting();

        let outcome = pipeline.submit(&mut controller, &endpoint).await;

        let SubmitOutcome::Rejected(errors) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(errors.get("name"), Some("Course name is required"));
        assert_eq!(controller.error("name"), Some("Course name is required"));
        assert_eq!(endpoint.calls(), 0);
        assert_eq!(pipeline.state(), SubmitState::Idle);
        assert_eq!(
            pipeline.transitions(),
            &[
                SubmitState::Idle,
                SubmitState::Validating,
                SubmitState::Rejected,
                SubmitState::Idle
            ]
        );
    }

    #[tokio::test]
    async fn test_success_resets_to_defaults() {
        let mut pipeline = SubmitPipeline::<Course>::new().unwrap();
        let mut controller = filled_controller();
        let endpoint = FakeEndpoint::accepting();

        let outcome = pipeline.submit(&mut controller, &endpoint).await;

        let SubmitOutcome::Succeeded { value, notification } = outcome else {
            panic!("expected success");
        };
        assert_eq!(value.recurrent_price.frequency, 3);
        assert!(notification.is_success());
        assert_eq!(notification.message, "New Course Added Successfully!");
        assert_eq!(controller.snapshot(), Course::defaults());
        assert_eq!(endpoint.calls(), 1);
        assert_eq!(pipeline.state(), SubmitState::Succeeded);
        assert_eq!(
            pipeline.transitions(),
            &[
                SubmitState::Idle,
                SubmitState::Validating,
                SubmitState::Submitting,
                SubmitState::Succeeded
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_entered_values() {
        let mut pipeline = SubmitPipeline::<Course>::new().unwrap();
        let mut controller = filled_controller();
        let before = controller.snapshot();
        let endpoint = FakeEndpoint::failing(503);

        let outcome = pipeline.submit(&mut controller, &endpoint).await;

        let notification = outcome.notification().cloned().unwrap();
        assert!(!notification.is_success());
        assert_eq!(
            notification.message,
            "Failed to add course: request failed with status code 503"
        );
        assert_eq!(controller.snapshot(), before);
        assert_eq!(pipeline.state(), SubmitState::Failed);
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_retry_after_failure() {
        let mut pipeline = SubmitPipeline::<Course>::new().unwrap();
        let mut controller = filled_controller();
        let endpoint = FakeEndpoint::failing(500);

        pipeline.submit(&mut controller, &endpoint).await;
        assert_eq!(endpoint.calls(), 1);

        // Resubmitting is an explicit second attempt
        pipeline.submit(&mut controller, &endpoint).await;
        assert_eq!(endpoint.calls(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_frequency_rejected() {
        let mut pipeline = SubmitPipeline::<Course>::new().unwrap();
        let mut controller = filled_controller();
        controller.set("recurrentPrice.frequency", 5).unwrap();
        let endpoint = FakeEndpoint::accepting();

        let outcome = pipeline.submit(&mut controller, &endpoint).await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(ref e) if e.contains("recurrentPrice.frequency")));
        assert_eq!(endpoint.calls(), 0);
        assert_eq!(controller.get("recurrentPrice.frequency"), Some(&json!(5)));
    }
}
