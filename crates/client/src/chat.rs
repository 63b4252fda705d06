use anyhow::{Context, Result};
use async_trait::async_trait;
use engines::{ChatReply, ChatRequest, ChatTurn, TurnRole};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use store::{Capability, ChatHistoryStore, ChatRole};
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};

use crate::context::ResultContext;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            text: text.into(),
        }
    }

    fn to_turn(&self) -> ChatTurn {
        ChatTurn {
            role: match self.role {
                ChatRole::User => TurnRole::User,
                ChatRole::Ai => TurnRole::Assistant,
            },
            content: self.text.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a message is already being sent")]
    Busy,

    #[error("chat request failed: {0}")]
    Transport(String),
}

/// What to do with a send while another is still waiting for its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendPolicy {
    /// Wait for the earlier send to finish.
    #[default]
    Queue,
    /// Fail immediately with [`ChatError::Busy`].
    Reject,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<String>;
}

/// Posts to the server's `/chat` endpoint.
pub struct HttpChatTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpChatTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}/chat", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .context("Failed to reach chat endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body.get("error").and_then(Value::as_str).unwrap_or("Server error");
            anyhow::bail!("chat failed ({}): {}", status, message);
        }

        let reply: ChatReply = response.json().await.context("Failed to parse chat reply")?;
        Ok(reply.reply)
    }
}

/// An ordered, append-only conversation.
///
/// Sends go through a single slot: the user turn, the request and the
/// assistant turn happen as one unit, so replies always follow the message
/// they answer.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    history: Mutex<Vec<ChatMessage>>,
    slot: Semaphore,
    policy: SendPolicy,
    store: Capability<dyn ChatHistoryStore>,
    user_id: Option<String>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>, policy: SendPolicy) -> Self {
        Self {
            transport,
            history: Mutex::new(Vec::new()),
            slot: Semaphore::new(1),
            policy,
            store: Capability::absent(),
            user_id: None,
        }
    }

    /// Mirror every turn to `store` under `user_id`.
    pub fn with_history_store(
        mut self,
        store: Capability<dyn ChatHistoryStore>,
        user_id: impl Into<String>,
    ) -> Self {
        self.store = store;
        self.user_id = Some(user_id.into());
        self
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }

    /// Load earlier turns from the store, if there is one. Returns how many
    /// were restored.
    pub async fn restore(&self) -> usize {
        let (Some(store), Some(user_id)) = (self.store.get(), self.user_id.as_deref()) else {
            return 0;
        };

        let Some(records) = self.store.settle(store.load_history(user_id).await) else {
            return 0;
        };

        let restored = records.len();
        let mut history = self.history.lock().await;
        history.extend(records.into_iter().map(|r| ChatMessage {
            role: r.role,
            text: r.content,
        }));
        restored
    }

    pub async fn send(
        &self,
        text: &str,
        current_page: &str,
        context: &ResultContext,
    ) -> Result<ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let _permit = match self.policy {
            SendPolicy::Queue => self.slot.acquire().await.map_err(|_| ChatError::Busy)?,
            SendPolicy::Reject => self.slot.try_acquire().map_err(|_| ChatError::Busy)?,
        };

        let request = {
            let mut history = self.history.lock().await;
            history.push(ChatMessage::user(text));
            ChatRequest {
                messages: history.iter().map(ChatMessage::to_turn).collect(),
                current_page: current_page.to_string(),
                recommendation_data: context.to_value(),
            }
        };
        self.mirror(ChatRole::User, text).await;

        let reply = self.transport.send(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "chat send failed");
            ChatError::Transport(e.to_string())
        })?;

        let message = ChatMessage::ai(reply);
        self.history.lock().await.push(message.clone());
        self.mirror(ChatRole::Ai, &message.text).await;

        Ok(message)
    }

    async fn mirror(&self, role: ChatRole, content: &str) {
        if let (Some(store), Some(user_id)) = (self.store.get(), self.user_id.as_deref()) {
            self.store.settle(store.append_message(user_id, role, content).await);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use store::InMemoryStore;

    /// Echoes the last user turn; messages containing "slow" take longer.
    struct EchoTransport {
        seen: StdMutex<Vec<ChatRequest>>,
    }

    impl EchoTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: StdMutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatTransport for EchoTransport {
        async fn send(&self, request: &ChatRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            let last = request.messages.last().map(|t| t.content.clone()).unwrap_or_default();
            if last.contains("slow") {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            if last.contains("fail") {
                anyhow::bail!("boom");
            }
            Ok(format!("echo: {}", last))
        }
    }

    fn texts(history: &[ChatMessage]) -> Vec<String> {
        history.iter().map(|m| m.text.clone()).collect()
    }

    #[tokio::test]
    async fn test_send_appends_both_turns() {
        let transport = EchoTransport::new();
        let session = ChatSession::new(transport.clone(), SendPolicy::Queue);

        let reply = session.send("  Which hospital?  ", "/recommend", &ResultContext::Absent).await.unwrap();
        assert_eq!(reply, ChatMessage::ai("echo: Which hospital?"));

        let history = session.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].current_page, "/recommend");
        assert_eq!(seen[0].recommendation_data, Value::Null);
    }

    #[tokio::test]
    async fn test_full_history_is_resent_with_assistant_role() {
        let transport = EchoTransport::new();
        let session = ChatSession::new(transport.clone(), SendPolicy::Queue);
        session.send("one", "/", &ResultContext::Absent).await.unwrap();
        session.send("two", "/", &ResultContext::Absent).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        let roles: Vec<TurnRole> = seen[1].messages.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![TurnRole::User, TurnRole::Assistant, TurnRole::User]);
    }

    #[tokio::test]
    async fn test_empty_message_ignored() {
        let session = ChatSession::new(EchoTransport::new(), SendPolicy::Queue);
        assert!(matches!(session.send("   ", "/", &ResultContext::Absent).await, Err(ChatError::EmptyMessage)));
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_queued_sends_keep_reply_order() {
        let session = ChatSession::new(EchoTransport::new(), SendPolicy::Queue);
        let ctx = ResultContext::Absent;

        let (a, b) = tokio::join!(
            session.send("slow question", "/", &ctx),
            session.send("quick question", "/", &ctx),
        );
        assert!(a.is_ok() && b.is_ok());

        assert_eq!(
            texts(&session.history().await),
            vec![
                "slow question",
                "echo: slow question",
                "quick question",
                "echo: quick question",
            ]
        );
    }

    #[tokio::test]
    async fn test_reject_policy_refuses_overlap() {
        let session = ChatSession::new(EchoTransport::new(), SendPolicy::Reject);
        let ctx = ResultContext::Absent;

        let (a, b) = tokio::join!(session.send("slow question", "/", &ctx), session.send("second", "/", &ctx));
        assert!(a.is_ok());
        assert!(matches!(b, Err(ChatError::Busy)));
        assert_eq!(session.history().await.len(), 2);

        // The slot is free again afterwards.
        assert!(session.send("third", "/", &ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_turn_only() {
        let session = ChatSession::new(EchoTransport::new(), SendPolicy::Queue);
        let err = session.send("please fail", "/", &ResultContext::Absent).await.unwrap_err();
        assert!(matches!(err, ChatError::Transport(_)));
        assert_eq!(texts(&session.history().await), vec!["please fail"]);
    }

    #[tokio::test]
    async fn test_turns_are_mirrored_and_restored() {
        let store: Arc<dyn ChatHistoryStore> = Arc::new(InMemoryStore::new());

        let first = ChatSession::new(EchoTransport::new(), SendPolicy::Queue)
            .with_history_store(Capability::new(store.clone()), "mother-1");
        first.send("hello", "/", &ResultContext::Absent).await.unwrap();

        let second = ChatSession::new(EchoTransport::new(), SendPolicy::Queue)
            .with_history_store(Capability::new(store), "mother-1");
        assert_eq!(second.restore().await, 2);
        assert_eq!(texts(&second.history().await), vec!["hello", "echo: hello"]);
    }

    #[tokio::test]
    async fn test_missing_table_does_not_block_chat() {
        let store: Arc<dyn ChatHistoryStore> = Arc::new(InMemoryStore::without_tables());
        let session = ChatSession::new(EchoTransport::new(), SendPolicy::Queue)
            .with_history_store(Capability::new(store), "mother-1");

        assert_eq!(session.restore().await, 0);
        assert!(session.send("hello", "/", &ResultContext::Absent).await.is_ok());
        assert_eq!(session.history().await.len(), 2);
    }
}
