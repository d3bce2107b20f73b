//! Error types for the OpenAI adapter

use thiserror::Error;
use triangulation_application::GatewayError;

/// Result type alias for OpenAI operations
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Errors that can occur when calling a chat completions endpoint
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("No API key found (set {0} or llm.api_key)")]
    MissingApiKey(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response contained no message content")]
    EmptyResponse,
}

impl From<OpenAiError> for GatewayError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::MissingApiKey(_) => GatewayError::AuthenticationFailed(err.to_string()),
            OpenAiError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            OpenAiError::Http(e) if e.is_connect() => GatewayError::ConnectionError(e.to_string()),
            OpenAiError::Http(e) => GatewayError::RequestFailed(e.to_string()),
            OpenAiError::Api { status, message } if status == 401 || status == 403 => {
                GatewayError::AuthenticationFailed(message)
            }
            OpenAiError::Api { status, message } => {
                GatewayError::RequestFailed(format!("status {}: {}", status, message))
            }
            OpenAiError::EmptyResponse => GatewayError::EmptyResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_map_to_gateway_errors() {
        let auth: GatewayError = OpenAiError::Api {
            status: 401,
            message: "bad key".into(),
        }
        .into();
        assert_eq!(auth, GatewayError::AuthenticationFailed("bad key".into()));

        let server: GatewayError = OpenAiError::Api {
            status: 500,
            message: "oops".into(),
        }
        .into();
        assert_eq!(server, GatewayError::RequestFailed("status 500: oops".into()));

        let empty: GatewayError = OpenAiError::EmptyResponse.into();
        assert_eq!(empty, GatewayError::EmptyResponse);
    }
}
