use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            CoreError::Unauthorized => SESSION_EXPIRED_MESSAGE.to_string(),
            CoreError::Validation(message) => message.clone(),
            CoreError::Server { message, .. } => message.clone(),
            CoreError::NotFound => "This entry no longer exists.".to_string(),
            CoreError::Conflict(message) => message.clone(),
            CoreError::Decode(_) | CoreError::Storage(_) | CoreError::Config(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::Server { status: 500.., .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_transport_details() {
        let err = CoreError::Network("tcp connect error: refused".to_string());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_user_message_passes_server_message_through() {
        let err = CoreError::Server {
            status: 400,
            message: "Ensure this value is greater than 0.".to_string(),
        };
        assert_eq!(err.user_message(), "Ensure this value is greater than 0.");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_errors_above_500_are_retryable() {
        let err = CoreError::Server {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_retryable());
    }
}
