//! Error types shared by the request pipeline.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Client input that could not be turned into a bounding box or request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid request body")]
    MalformedBody,

    #[error("Invalid bounding box provided")]
    MissingBoundingBox,

    #[error("Invalid bounding box provided")]
    MissingEdge(&'static str),

    #[error("Invalid bounding box provided")]
    NonNumericEdge(&'static str),

    #[error("Invalid bounding box provided: {edge} ({value}) is outside [{min}, {max}]")]
    EdgeOutOfRange {
        edge: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid bounding box provided: {low_name} ({low}) must be less than {high_name} ({high})")]
    Degenerate {
        low_name: &'static str,
        low: f64,
        high_name: &'static str,
        high: f64,
    },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("startDate ({start}) must not be after endDate ({end})")]
    InvertedDateRange { start: String, end: String },

    #[error("Invalid scale, expected a positive integer number of metres")]
    InvalidScale,

    #[error("Invalid outputFormat '{0}', expected 'png' or 'tile'")]
    InvalidOutputFormat(String),
}

/// A product selector that names no known product.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unsupported product '{0}'")]
pub struct UnsupportedProductError(pub String);

/// Where in the pipeline a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Validation,
    ProviderAuth,
    ProviderQuery,
    ProviderRender,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::ProviderAuth => "provider auth",
            Stage::ProviderQuery => "provider query",
            Stage::ProviderRender => "provider render",
        };
        f.write_str(name)
    }
}

/// A stage-tagged failure reported by the imagery gateway.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub stage: Stage,
    pub message: String,
}

impl GatewayError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::new(Stage::ProviderQuery, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(Stage::ProviderRender, message)
    }
}

/// Failures while loading credentials or obtaining an access token.
///
/// Fatal at startup. A failed refresh later on is reported as a provider
/// query failure for the request that triggered it.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("service account key is neither JSON nor base64-encoded JSON")]
    UndecodableKey,

    #[error("service account key is malformed: {0}")]
    MalformedKey(#[from] serde_json::Error),

    #[error("service account key is missing '{0}'")]
    MissingField(&'static str),

    #[error("failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint rejected credentials ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl From<AuthError> for GatewayError {
    fn from(err: AuthError) -> Self {
        Self::new(Stage::ProviderAuth, err.to_string())
    }
}

/// Anything a request handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnsupportedProduct(#[from] UnsupportedProductError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    pub fn stage(&self) -> Stage {
        match self {
            ApiError::Validation(_) | ApiError::UnsupportedProduct(_) => Stage::Validation,
            ApiError::Gateway(e) => e.stage,
        }
    }
}
