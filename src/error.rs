use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Bearer token missing, expired or revoked.
    #[error("not authenticated, please log in again")]
    Unauthorized,

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized | ApiError::Authentication { .. }
        )
    }

    /// Maps a failed response to an error, pulling `error` or `message` out of a JSON body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["error", "message", "errors"].iter().find_map(|key| {
                    value.get(*key).map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_status_maps_to_auth_error() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, "{}");
        assert!(err.is_auth_error());
    }

    #[test]
    fn json_error_message_is_extracted() {
        let err = ApiError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error":"Title can't be blank"}"#,
        );
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Title can't be blank");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_uses_reason_phrase() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "API error (404): Not Found");
        assert!(!err.is_auth_error());
    }
}
