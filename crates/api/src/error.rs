use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use common::Error;

/// Maps engine and provider failures onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidParameters(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::DataProvider(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Json(_) | Error::Csv(_) | Error::Config(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match &self.0 {
            Error::InsufficientData { .. } => "insufficient_data",
            Error::InvalidParameters(_) => "invalid_parameters",
            Error::InvalidRequest(_) => "invalid_request",
            Error::DataProvider(_) | Error::Http(_) => "data_provider",
            Error::Json(_) | Error::Csv(_) | Error::Config(_) | Error::Io(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Scan request failed");
        } else {
            warn!(error = %self.0, "Scan request rejected");
        }
        (
            status,
            Json(json!({ "error": self.kind(), "message": self.0.to_string() })),
        )
            .into_response()
    }
}
