//! Optional persistence for user profiles and chat history.
//!
//! Both tables are best-effort: a deployment may not have them. Instead of
//! swallowing errors, stores report [`StoreError::Unavailable`] and callers
//! hold each store in a [`Capability`] that remembers the table is gone.

pub mod memory;
pub mod supabase;

pub use memory::InMemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

pub const PROFILES_TABLE: &str = "user_profiles";
pub const CHAT_HISTORY_TABLE: &str = "chat_history";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{table} table is not available")]
    Unavailable { table: &'static str },

    #[error("store request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfileRecord {
    /// Identity-provider user id.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfileRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            avatar_url: None,
            phone: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryRecord {
    #[serde(default)]
    pub user_id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or update by `id`.
    async fn upsert_profile(&self, record: &UserProfileRecord) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    async fn append_message(
        &self,
        user_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<(), StoreError>;

    /// Oldest first.
    async fn load_history(&self, user_id: &str) -> Result<Vec<ChatHistoryRecord>, StoreError>;
}

/// A store that may be absent, either because none was configured or
/// because its table turned out to be missing.
pub struct Capability<S: ?Sized> {
    store: Option<Arc<S>>,
    missing: AtomicBool,
}

impl<S: ?Sized> Capability<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store: Some(store),
            missing: AtomicBool::new(false),
        }
    }

    pub fn absent() -> Self {
        Self {
            store: None,
            missing: AtomicBool::new(false),
        }
    }

    pub fn get(&self) -> Option<&Arc<S>> {
        if self.missing.load(Ordering::Relaxed) {
            return None;
        }
        self.store.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.get().is_some()
    }

    /// Look at a store result: an `Unavailable` error switches the capability
    /// off for the rest of the session, other errors are logged. Returns the
    /// value on success.
    pub fn settle<T>(&self, result: Result<T, StoreError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(StoreError::Unavailable { table }) => {
                tracing::debug!(table, "table unavailable, disabling store");
                self.missing.store(true, Ordering::Relaxed);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "store call failed");
                None
            }
        }
    }
}

impl<S: ?Sized> Default for Capability<S> {
    fn default() -> Self {
        Self::absent()
    }
}

/// The optional collaborators a client session may be given.
#[derive(Default)]
pub struct Stores {
    pub profiles: Capability<dyn ProfileStore>,
    pub chat_history: Capability<dyn ChatHistoryStore>,
}

impl Stores {
    pub fn none() -> Self {
        Self::default()
    }

    /// Supabase when `SUPABASE_URL` and `SUPABASE_KEY` are set, otherwise
    /// nothing.
    pub fn from_env() -> Self {
        match SupabaseStore::from_env() {
            Some(store) => {
                let store = Arc::new(store);
                Self {
                    profiles: Capability::new(store.clone() as Arc<dyn ProfileStore>),
                    chat_history: Capability::new(store as Arc<dyn ChatHistoryStore>),
                }
            }
            None => {
                tracing::info!("SUPABASE_URL/SUPABASE_KEY not set, persistence disabled");
                Self::none()
            }
        }
    }
}
