//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use homeflux_domain::error::HomeFluxError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HomeFluxError`] to an HTTP response with appropriate status code.
pub struct ApiError(HomeFluxError);

impl From<HomeFluxError> for ApiError {
    fn from(err: HomeFluxError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HomeFluxError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HomeFluxError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HomeFluxError::InvalidState(err) => (StatusCode::CONFLICT, err.to_string()),
            HomeFluxError::DeviceUnavailable(err) => {
                tracing::warn!(error = %err, "device unavailable during request");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeflux_domain::error::{InvalidStateError, NotFoundError, ValidationError};

    fn status_of(err: HomeFluxError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn should_map_each_error_kind_to_its_status_code() {
        assert_eq!(
            status_of(ValidationError::EmptyName.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                NotFoundError {
                    entity: "Rule",
                    id: "abc".to_string(),
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(InvalidStateError::AlreadyUndone.into()),
            StatusCode::CONFLICT
        );
    }
}
