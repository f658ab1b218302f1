use crate::gateway::GatewayConfig;
use crate::gateway::earth_engine::DEFAULT_API_URL;
use clap::Parser;
use std::time::Duration;

/// Command line and environment configuration.
#[derive(Clone, Parser)]
#[command(name = "ndvi-proxy", version, about = "NDVI and land-cover imagery proxy")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Service-account key, raw JSON or base64-encoded JSON
    #[arg(long, env = "GEE_SERVICE_ACCOUNT_KEY", hide_env_values = true)]
    pub service_account_key: String,

    /// Allowed CORS origin; any origin when unset
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Provider project, defaults to the key's project_id
    #[arg(long, env = "GEE_PROJECT")]
    pub project: Option<String>,

    /// Provider REST endpoint
    #[arg(long, env = "EE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Timeout for each provider call, in seconds
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = 30)]
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            api_url: self.api_url.clone(),
            project: self.project.clone(),
            timeout: Duration::from_secs(self.provider_timeout_secs),
        }
    }
}
