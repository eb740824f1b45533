pub mod client;
pub mod discovery;

pub use client::{ApiGateway, GatewayBuilder, GatewayError};
