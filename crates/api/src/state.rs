use anyhow::{Context, Result};
use engines::Engines;
use gateway::GatewayClient;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::Metrics;

pub struct AppState {
    pub engines: Engines,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Arc<Self>> {
        let structured =
            GatewayClient::new(&config.gateway).context("Failed to create gateway client")?;
        let chat =
            GatewayClient::new(&config.chat).context("Failed to create chat gateway client")?;

        if config.gateway.api_key.is_none() {
            tracing::warn!("GATEWAY_API_KEY is not set; engine requests will fail");
        }

        Ok(Arc::new(Self {
            engines: Engines::new(structured, chat),
            metrics: Metrics::new(),
        }))
    }
}
