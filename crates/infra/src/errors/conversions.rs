//! Conversions from external infrastructure errors into domain errors.

use chatcal_domain::ChatCalError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ChatCalError);

impl From<InfraError> for ChatCalError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ChatCalError> for InfraError {
    fn from(value: ChatCalError) -> Self {
        InfraError(value)
    }
}

impl std::fmt::Display for InfraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for InfraError {}

trait IntoChatCalError {
    fn into_chatcal(self) -> ChatCalError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ChatCalError */
/* -------------------------------------------------------------------------- */

impl IntoChatCalError for HttpError {
    fn into_chatcal(self) -> ChatCalError {
        if self.is_timeout() {
            return ChatCalError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ChatCalError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return ChatCalError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return ChatCalError::Analysis(format!("undecodable webhook response: {self}"));
        }

        if let Some(status) = self.status() {
            return ChatCalError::Network(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        ChatCalError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_chatcal())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
