//! Shared response handling for the collaborator HTTP clients.

use formflow_core::FormError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

/// Error body shape used by the collaborator services.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Maps a non-success response to a typed error.
///
/// Bodies shaped like `{ "detail": ... }` surface as collaborator errors
/// with the service-reported detail; anything else is a transport failure
/// carrying the status code.
pub(crate) async fn error_from_response(response: Response) -> FormError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_from_parts(status, &body)
}

pub(crate) fn error_from_parts(status: StatusCode, body: &str) -> FormError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(detail) = parsed.detail {
            return FormError::collaborator(detail);
        }
    }
    FormError::transport(format!("service returned {}", status))
}

/// Maps a failure to send a request (connect/timeout/DNS) to a typed error.
pub(crate) fn request_failure(operation: &str, err: reqwest::Error) -> FormError {
    FormError::transport(format!("{} request failed: {}", operation, err))
}

/// Maps a failure to decode a success payload to a typed error.
pub(crate) fn decode_failure(operation: &str, err: reqwest::Error) -> FormError {
    FormError::transport(format!("failed to decode {} response: {}", operation, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_body_maps_to_collaborator_error() {
        let err = error_from_parts(
            StatusCode::NOT_FOUND,
            r#"{"detail": "Example file 'cerfa.pdf' not found on server."}"#,
        );
        assert!(err.is_collaborator());
        assert_eq!(err.detail(), "Example file 'cerfa.pdf' not found on server.");
    }

    #[test]
    fn opaque_body_maps_to_transport_error() {
        let err = error_from_parts(StatusCode::BAD_GATEWAY, "<html>gateway</html>");
        assert!(err.is_transport());
    }

    #[test]
    fn json_body_without_detail_maps_to_transport_error() {
        let err = error_from_parts(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "boom"}"#);
        assert!(err.is_transport());
    }
}
