//! Unified error type for the Roundkeep server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roundkeep_protocol::ProtocolError;
use roundkeep_session::SessionError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Handlers return `Result<_, RoundkeepError>`; the `#[from]` impls let
/// `?` convert sub-crate errors, and [`IntoResponse`] turns the result into
/// an HTTP status with a plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum RoundkeepError {
    /// A request body couldn't be decoded, or a response couldn't be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session store rejected the operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration couldn't be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding or serving the listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RoundkeepError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Protocol(ProtocolError::Encode(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Protocol(_) => StatusCode::BAD_REQUEST,
            Self::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Session(SessionError::InvalidParameter(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RoundkeepError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundkeep_protocol::GameId;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: RoundkeepError = SessionError::NotFound(GameId::new("ABCD")).into();
        assert!(matches!(err, RoundkeepError::Session(_)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("ABCD"));
    }

    #[test]
    fn test_invalid_parameter_maps_to_400() {
        let err: RoundkeepError =
            SessionError::InvalidParameter("too many".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_body_maps_to_400() {
        let err: RoundkeepError =
            ProtocolError::InvalidMessage("request body is empty".into()).into();
        assert!(matches!(err, RoundkeepError::Protocol(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_config_error_maps_to_500() {
        let err: RoundkeepError = ConfigError::Invalid {
            var: "SERVER_PORT",
            value: "x".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_carries_status() {
        let err: RoundkeepError = SessionError::NotFound(GameId::new("ZZZZ")).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
