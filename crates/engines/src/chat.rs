use gateway::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Roles a client may send. System turns are ours alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Body of a chat request: the whole conversation so far plus what the user
/// is looking at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub current_page: String,
    #[serde(default)]
    pub recommendation_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

pub fn build_chat_prompt(current_page: &str, context: &Value) -> String {
    let context = serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
    format!(
        "You are Materna AI.\n\nCurrent page: {}\n\nRecommendation Data:\n{}\n\nExplain clearly and give structured advice.",
        current_page, context
    )
}

/// System prompt followed by the conversation in order.
pub fn build_chat_exchange(request: &ChatRequest) -> Vec<Message> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(Message::system(build_chat_prompt(
        &request.current_page,
        &request.recommendation_data,
    )));

    messages.extend(request.messages.iter().map(|turn| match turn.role {
        TurnRole::User => Message::user(turn.content.as_str()),
        TurnRole::Assistant => Message::assistant(turn.content.as_str()),
    }));

    messages
}
