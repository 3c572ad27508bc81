//! User-facing feedback: toast notifications and the shared failure handler.

use shared::protocol::ApiEnvelope;
use tracing::{error, info, warn};

use crate::error::ListClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

pub trait FeedbackHandler: Send + Sync {
    fn handle_exception(&self, error: &ListClientError);

    fn show_tiny_notification(&self, message: &str, kind: NotificationKind);
}

pub struct TracingFeedback;

impl FeedbackHandler for TracingFeedback {
    fn handle_exception(&self, err: &ListClientError) {
        error!("feedback: action failed: {}", err.user_message());
    }

    fn show_tiny_notification(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Error => error!("feedback: {message}"),
            NotificationKind::Warning => warn!("feedback: {message}"),
            NotificationKind::Success | NotificationKind::Info => info!("feedback: {message}"),
        }
    }
}

/// Runs `on_success` only when the envelope reports success. A `success:
/// false` envelope becomes [`ListClientError::Rejected`] carrying the
/// server's message.
pub fn handle_success_response<T>(
    envelope: ApiEnvelope,
    on_success: impl FnOnce(ApiEnvelope) -> Result<T, ListClientError>,
) -> Result<T, ListClientError> {
    if !envelope.success {
        let message = match (&envelope.error, envelope.message.is_empty()) {
            (Some(api_error), true) => api_error.message.clone(),
            _ => envelope.message,
        };
        return Err(ListClientError::Rejected { message });
    }
    on_success(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::error::{ApiError, ErrorCode};

    #[test]
    fn success_envelope_runs_callback() {
        let value = handle_success_response(ApiEnvelope::ok("done", json!(3)), |envelope| {
            Ok(envelope.payload.as_i64())
        })
        .expect("success");
        assert_eq!(value, Some(3));
    }

    #[test]
    fn failed_envelope_skips_callback_and_keeps_message() {
        let mut called = false;
        let err = handle_success_response(ApiEnvelope::failure("not allowed"), |_| {
            called = true;
            Ok(())
        })
        .expect_err("must be rejected");
        assert!(!called);
        assert_eq!(err.user_message(), "not allowed");
    }

    #[test]
    fn failed_envelope_falls_back_to_error_body_message() {
        let mut envelope = ApiEnvelope::failure("");
        envelope.error = Some(ApiError::new(ErrorCode::Forbidden, "admins only"));
        let err = handle_success_response(envelope, |_| Ok(())).expect_err("rejected");
        assert!(matches!(err, ListClientError::Rejected { ref message } if message == "admins only"));
    }
}
