use crate::error::GatewayError;
use crate::models::{ImageProductRequest, ImageryResult};
use async_trait::async_trait;

/// Turns a built request into a provider answer. One remote call per request,
/// no retries.
#[async_trait]
pub trait ImageryGateway: Send + Sync {
    async fn fetch(&self, request: &ImageProductRequest) -> Result<ImageryResult, GatewayError>;
}
