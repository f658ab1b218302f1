use crate::endpoints::server::AppState;
use crate::error::{ApiError, ValidationError};
use crate::models::{
    BoundingBox, ImageProductRequest, ImageryResult, OutputFormat, RequestOverrides,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const WELCOME: &str = "Welcome to the NDVI imagery service. POST a bbox to /getNDVI or /getLandCover.";

pub async fn welcome_handler() -> &'static str {
    WELCOME
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn get_ndvi(State(state): State<Arc<AppState>>, body: Bytes) -> Result<ImageryResult, ApiError> {
    serve(&state, "ndvi", OutputFormat::Png, &body).await
}

pub async fn view_ndvi(State(state): State<Arc<AppState>>, body: Bytes) -> Result<ImageryResult, ApiError> {
    serve(&state, "ndvi", OutputFormat::TileReference, &body).await
}

pub async fn get_land_cover(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ImageryResult, ApiError> {
    serve(&state, "land_cover", OutputFormat::Png, &body).await
}

pub async fn view_land_cover(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ImageryResult, ApiError> {
    serve(&state, "land_cover", OutputFormat::TileReference, &body).await
}

pub async fn product_handler(
    Path(product): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ImageryResult, ApiError> {
    serve(&state, &product, OutputFormat::Png, &body).await
}

/// validate -> build -> one gateway call
async fn serve(
    state: &AppState,
    selector: &str,
    default_format: OutputFormat,
    body: &[u8],
) -> Result<ImageryResult, ApiError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    let bbox = BoundingBox::from_payload(&payload)?;
    let overrides = RequestOverrides::from_payload(&payload)?;
    let request = ImageProductRequest::build(bbox, selector, default_format, overrides)?;

    info!(
        product = %request.product,
        format = ?request.output_format,
        bbox = ?request.bounding_box.coordinates(),
        scale = request.scale_meters,
        "imagery request"
    );

    Ok(state.gateway.fetch(&request).await?)
}
