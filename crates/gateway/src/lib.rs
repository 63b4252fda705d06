pub mod client;
pub mod error;

pub use client::{GatewayClient, GatewayConfig, Message, Role};
pub use error::GatewayError;

impl GatewayConfig {
    /// Read `{PREFIX}_URL`, `{PREFIX}_API_KEY`, `{PREFIX}_MODEL` and
    /// `GATEWAY_TIMEOUT_SECS`, falling back to `fallback` for anything unset.
    pub fn from_env(prefix: &str, fallback: &GatewayConfig) -> Self {
        let var = |suffix: &str| {
            dotenv::var(format!("{prefix}_{suffix}"))
                .ok()
                .filter(|v| !v.trim().is_empty())
        };

        let timeout_secs = dotenv::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| {
                v.trim()
                    .parse()
                    .map_err(|e| tracing::warn!("Invalid GATEWAY_TIMEOUT_SECS value: {e}"))
                    .ok()
            })
            .unwrap_or(fallback.timeout_secs);

        Self {
            base_url: var("URL").unwrap_or_else(|| fallback.base_url.clone()),
            api_key: var("API_KEY").or_else(|| fallback.api_key.clone()),
            model: var("MODEL").unwrap_or_else(|| fallback.model.clone()),
            timeout_secs,
        }
    }
}
