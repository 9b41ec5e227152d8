//! The only error shape allowed to leave the engine.

use serde::{Deserialize, Serialize};

use crate::error::AggregateError;

/// `{ "error": "<message>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl From<&AggregateError> for ErrorResponse {
    fn from(err: &AggregateError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<AggregateError> for ErrorResponse {
    fn from(err: AggregateError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_single_error_field() {
        let body = ErrorResponse::from(AggregateError::NoProviderData);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": "no provider returned any data" })
        );
    }
}
