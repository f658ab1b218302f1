use super::auth::{self, AccessToken, ServiceAccountKey};
use super::expression;
use crate::error::{AuthError, GatewayError};
use crate::models::{ImageProductRequest, ImageryResult, OutputFormat};
use crate::traits::ImageryGateway;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};

pub const DEFAULT_API_URL: &str = "https://earthengine.googleapis.com";

/// Tokens this close to expiry are exchanged again before use.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_url: String,
    /// Falls back to the key's `project_id`.
    pub project: Option<String>,
    pub timeout: Duration,
}

/// Earth Engine REST adapter.
///
/// The key is loaded and verified once in [`EarthEngineGateway::connect`].
/// Requests share the resulting token under a read lock; the first request to
/// find it near expiry takes the write lock and exchanges the key again.
pub struct EarthEngineGateway {
    client: reqwest::Client,
    api_url: String,
    project: String,
    key: ServiceAccountKey,
    token: RwLock<AccessToken>,
}

#[derive(Deserialize)]
struct CreatedResource {
    name: Option<String>,
}

impl EarthEngineGateway {
    pub async fn connect(
        key: ServiceAccountKey,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        let project = config
            .project
            .or_else(|| key.project_id.clone())
            .ok_or(AuthError::MissingField("project_id"))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AuthError::from)?;

        let token = auth::authenticate(&client, &key).await?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            project,
            key,
            token: RwLock::new(token),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    async fn bearer(&self) -> Result<String, Failure> {
        {
            let token = self.token.read().await;
            if !token.expires_within(REFRESH_MARGIN) {
                return Ok(token.as_str().to_string());
            }
        }

        let mut token = self.token.write().await;
        // Another request may have refreshed while we waited.
        if token.expires_within(REFRESH_MARGIN) {
            *token = auth::authenticate(&self.client, &self.key)
                .await
                .map_err(|e| Failure::Query(format!("token refresh failed: {}", e)))?;
        }
        Ok(token.as_str().to_string())
    }

    fn resource_url(&self, format: OutputFormat) -> String {
        let kind = match format {
            OutputFormat::Png => "thumbnails",
            OutputFormat::TileReference => "maps",
        };
        format!("{}/v1/projects/{}/{}", self.api_url, self.project, kind)
    }

    async fn create(&self, format: OutputFormat, body: Value) -> Result<String, Failure> {
        let bearer = self.bearer().await?;
        let response = self
            .client
            .post(self.resource_url(format))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Failure::Query("provider did not answer in time".to_string())
                } else {
                    Failure::Query(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Failure::Query(e.to_string()))?;
        if !status.is_success() {
            return Err(Failure::Query(provider_message(status, &text)));
        }

        let created: CreatedResource = serde_json::from_str(&text)
            .map_err(|e| Failure::Render(format!("unreadable provider response: {}", e)))?;
        created
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Failure::Render("provider returned no resource name".to_string()))
    }
}

/// Transport, timeout and rejected queries are query failures; a 2xx reply
/// that yields nothing usable is a render failure.
enum Failure {
    Query(String),
    Render(String),
}

/// Pull `error.message` out of a provider error body, else echo the status.
fn provider_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("provider returned {}", status))
}

#[async_trait]
impl ImageryGateway for EarthEngineGateway {
    async fn fetch(&self, request: &ImageProductRequest) -> Result<ImageryResult, GatewayError> {
        let expression = expression::build(request);
        let verb = match request.output_format {
            OutputFormat::Png => "generate",
            OutputFormat::TileReference => "visualize",
        };
        let body = match request.output_format {
            OutputFormat::Png => json!({ "expression": expression, "fileFormat": "PNG" }),
            OutputFormat::TileReference => json!({ "expression": expression }),
        };

        let name = match self.create(request.output_format, body).await {
            Ok(name) => name,
            Err(failure) => {
                let prefix = format!("Failed to {} {}", verb, request.product);
                let err = match failure {
                    Failure::Query(reason) => GatewayError::query(format!("{}: {}", prefix, reason)),
                    Failure::Render(reason) => {
                        GatewayError::render(format!("{}: {}", prefix, reason))
                    }
                };
                error!(product = %request.product, stage = %err.stage, message = %err.message, "provider call failed");
                return Err(err);
            }
        };

        info!(product = %request.product, resource = %name, "provider resource created");
        Ok(match request.output_format {
            OutputFormat::Png => ImageryResult::Download {
                url: format!("{}/v1/{}:getPixels", self.api_url, name),
            },
            OutputFormat::TileReference => ImageryResult::TileReference {
                map_id: name,
                token: String::new(),
            },
        })
    }
}
