use gateway::GatewayConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Gateway behind recommend, channel-finder and funding-scout.
    pub gateway: GatewayConfig,
    /// Gateway behind `/chat`.
    pub chat: GatewayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            gateway: GatewayConfig::default(),
            chat: GatewayConfig {
                model: DEFAULT_CHAT_MODEL.to_string(),
                ..GatewayConfig::default()
            },
        }
    }
}

impl AppConfig {
    /// Environment (and `.env`) over defaults. Chat settings fall back to the
    /// structured gateway's URL, key and timeout, but keep their own model.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let gateway = GatewayConfig::from_env("GATEWAY", &defaults.gateway);
        let chat_fallback = GatewayConfig {
            model: defaults.chat.model.clone(),
            ..gateway.clone()
        };
        let chat = GatewayConfig::from_env("CHAT", &chat_fallback);

        Self {
            bind_addr: dotenv::var("MATERNA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            gateway,
            chat,
        }
    }
}
