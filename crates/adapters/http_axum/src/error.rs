//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use needlehub_domain::error::{NeedleError, QueryError, ResolveError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Maps [`NeedleError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(NeedleError);

impl From<NeedleError> for ApiError {
    fn from(err: NeedleError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            NeedleError::Validation(_) | NeedleError::Secret(_) => StatusCode::BAD_REQUEST,
            NeedleError::Resolve(ResolveError::NotFound { .. }) => StatusCode::NOT_FOUND,
            NeedleError::Connection(_) | NeedleError::Query(_) => StatusCode::BAD_GATEWAY,
            NeedleError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            NeedleError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            NeedleError::MalformedReading(_)
            | NeedleError::Actuator(_)
            | NeedleError::Resolve(ResolveError::Unreachable { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error class, so remote callers can tell failures apart.
    fn kind(&self) -> &'static str {
        match &self.0 {
            NeedleError::Validation(_) => "validation",
            NeedleError::Secret(_) => "secret",
            NeedleError::Resolve(ResolveError::NotFound { .. }) => "not_found",
            NeedleError::Resolve(ResolveError::Unreachable { .. }) => "unreachable",
            NeedleError::Connection(_) => "connection",
            NeedleError::Query(QueryError::EmptyResult) => "empty_result",
            NeedleError::Query(QueryError::MissingCount) => "missing_count",
            NeedleError::Query(QueryError::Store(_)) => "query",
            NeedleError::MalformedReading(_) => "malformed_reading",
            NeedleError::Actuator(_) => "actuator",
            NeedleError::Closed => "closed",
            NeedleError::Unsupported(_) => "unsupported",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!(error = %self.0, %status, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
                kind: self.kind(),
            }),
        )
            .into_response()
    }
}
