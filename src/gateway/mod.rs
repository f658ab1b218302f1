pub mod auth;
pub mod earth_engine;
pub mod expression;

pub use auth::ServiceAccountKey;
pub use earth_engine::{EarthEngineGateway, GatewayConfig};
