use crate::config::Config;
use crate::endpoints::handlers::{
    get_land_cover, get_ndvi, health_handler, product_handler, view_land_cover, view_ndvi,
    welcome_handler,
};
use crate::gateway::{EarthEngineGateway, ServiceAccountKey};
use crate::models::Product;
use crate::traits::ImageryGateway;
use crate::utils::status::print_product_summary;
use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct AppState {
    pub gateway: Arc<dyn ImageryGateway>,
}

pub struct ImageryServer {
    config: Config,
    state: AppState,
}

impl ImageryServer {
    /// Decode credentials and authenticate with the provider. Any failure
    /// here aborts startup.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let key = ServiceAccountKey::decode(&config.service_account_key)
            .context("GEE_SERVICE_ACCOUNT_KEY is not a usable service-account key")?;
        let gateway = EarthEngineGateway::connect(key, config.gateway())
            .await
            .context("provider authentication failed")?;
        info!(project = gateway.project(), "provider gateway ready");

        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    pub fn with_gateway(config: Config, gateway: Arc<dyn ImageryGateway>) -> Self {
        Self {
            config,
            state: AppState { gateway },
        }
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let cors = cors_layer(self.config.cors_origin.as_deref())?;
        let app = build_router(Arc::new(self.state), cors);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        print_product_summary(&Product::ALL);
        println!(
            r#"
    🚀 ndvi-proxy serving on {}

    🌿 NDVI download URL / tile reference
       → POST http://{}/getNDVI   |   POST http://{}/viewNDVI

    🗺️ Land cover download URL / tile reference
       → POST http://{}/getLandCover   |   POST http://{}/viewLandCover

    🩺 Health check
       → GET http://{}/health
            "#,
            addr, addr, addr, addr, addr, addr
        );

        axum::serve(listener, app).await.context("server error")?;

        Ok(())
    }
}

pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(welcome_handler))
        .route("/health", get(health_handler))
        .route("/getNDVI", post(get_ndvi))
        .route("/get_ndvi", post(get_ndvi))
        .route("/ndvi", post(get_ndvi))
        .route("/viewNDVI", post(view_ndvi))
        .route("/view_ndvi", post(view_ndvi))
        .route("/getLandCover", post(get_land_cover))
        .route("/get_land_cover", post(get_land_cover))
        .route("/viewLandCover", post(view_land_cover))
        .route("/view_land_cover", post(view_land_cover))
        .route("/products/{product}", post(product_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// A single allowed origin, or any origin when none (or `*`) is configured.
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    match origin.map(str::trim).filter(|o| !o.is_empty() && *o != "*") {
        None => Ok(CorsLayer::permissive()),
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin '{}'", origin))?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any))
        }
    }
}
