//! Prompt templates and the single-attempt pipeline behind each server
//! function: build the exchange, call the gateway once, extract JSON.

pub mod channel_finder;
pub mod chat;
pub mod funding_scout;
pub mod prompt;
pub mod recommend;

pub use channel_finder::ChannelFinder;
pub use chat::{ChatReply, ChatRequest, ChatTurn, TurnRole};
pub use funding_scout::FundingScout;
pub use prompt::{UseCase, build_exchange};
pub use recommend::{Recommend, RecommendRequest};

use extract::Extracted;
use gateway::{GatewayClient, GatewayError};

/// Gateway clients for the structured engines and for chat. They usually
/// differ in model and may differ in provider.
#[derive(Clone)]
pub struct Engines {
    structured: GatewayClient,
    chat: GatewayClient,
}

impl Engines {
    pub fn new(structured: GatewayClient, chat: GatewayClient) -> Self {
        Self { structured, chat }
    }

    /// Run one use-case. Malformed model output is not an error: it comes
    /// back as [`Extracted::Degraded`].
    pub async fn run<U: UseCase>(&self, request: &U::Request) -> Result<Extracted, GatewayError> {
        let messages = build_exchange::<U>(request);
        let completion = self.structured.complete(&messages).await?;

        let extracted = extract::extract(&completion);
        tracing::info!(
            engine = U::NAME,
            model = self.structured.model(),
            degraded = extracted.is_degraded(),
            "engine completed"
        );
        Ok(extracted)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, GatewayError> {
        let messages = chat::build_chat_exchange(request);
        let reply = self.chat.complete(&messages).await?;
        tracing::info!(turns = request.messages.len(), model = self.chat.model(), "chat replied");
        Ok(ChatReply { reply })
    }
}
