pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod models;
pub mod traits;
pub mod utils;

pub use config::Config;
pub use endpoints::server::{AppState, ImageryServer, build_router};
pub use error::{ApiError, GatewayError, Stage};
pub use traits::ImageryGateway;
