use serde::Deserialize;
use thiserror::Error;

/// Shown when the server gives no usable `detail`.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    Unauthorized(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("Device error: {0}")]
    Device(String),
    #[error("Another request is already in progress")]
    Busy,
    #[error("{0}")]
    Validation(String),
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("{0} is not available on this device")]
    Unsupported(&'static str),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ClientError {
    /// Builds the error for a non-success response. Only a string `detail`
    /// is surfaced; validation arrays and non-JSON bodies fall back to the
    /// generic message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| d.as_str().map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        if status == 401 {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Api { status, message }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_becomes_message() {
        let err = ClientError::from_response(400, r#"{"detail":"Saldo insuficiente"}"#);
        assert_eq!(err.to_string(), "Saldo insuficiente");
        assert!(matches!(err, ClientError::Api { status: 400, .. }));
    }

    #[test]
    fn test_unauthorized_status() {
        let err = ClientError::from_response(401, r#"{"detail":"Token expirado"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Token expirado");
    }

    #[test]
    fn test_generic_message_fallbacks() {
        // FastAPI validation errors carry a list, not a string
        let validation = r#"{"detail":[{"loc":["body","amount"],"msg":"field required"}]}"#;
        assert_eq!(
            ClientError::from_response(422, validation).to_string(),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            ClientError::from_response(502, "<html>Bad Gateway</html>").to_string(),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            ClientError::from_response(500, "{}").to_string(),
            GENERIC_ERROR_MESSAGE
        );
    }
}
