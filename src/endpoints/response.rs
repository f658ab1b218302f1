//! Shapes pipeline results into HTTP responses.

use crate::error::{ApiError, Stage};
use crate::models::ImageryResult;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn status_for(stage: Stage) -> StatusCode {
    match stage {
        Stage::Validation => StatusCode::BAD_REQUEST,
        Stage::ProviderAuth | Stage::ProviderQuery | Stage::ProviderRender => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ImageryResult {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.stage());
        if status.is_client_error() {
            warn!(error = %self, "rejected request");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
