use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    CHAT_HISTORY_TABLE, ChatHistoryRecord, ChatHistoryStore, ChatRole, PROFILES_TABLE,
    ProfileStore, StoreError, UserProfileRecord,
};

/// Process-local store. Also stands in for a deployment whose tables were
/// never created, via [`InMemoryStore::without_tables`].
pub struct InMemoryStore {
    profiles: RwLock<HashMap<String, UserProfileRecord>>,
    history: RwLock<Vec<ChatHistoryRecord>>,
    tables_exist: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            history: RwLock::new(Vec::new()),
            tables_exist: true,
        }
    }

    pub fn without_tables() -> Self {
        Self {
            tables_exist: false,
            ..Self::new()
        }
    }

    pub async fn profile(&self, id: &str) -> Option<UserProfileRecord> {
        self.profiles.read().await.get(id).cloned()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn upsert_profile(&self, record: &UserProfileRecord) -> Result<(), StoreError> {
        if !self.tables_exist {
            return Err(StoreError::Unavailable {
                table: PROFILES_TABLE,
            });
        }
        self.profiles.write().await.insert(record.id.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl ChatHistoryStore for InMemoryStore {
    async fn append_message(
        &self,
        user_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<(), StoreError> {
        if !self.tables_exist {
            return Err(StoreError::Unavailable {
                table: CHAT_HISTORY_TABLE,
            });
        }
        self.history.write().await.push(ChatHistoryRecord {
            user_id: user_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn load_history(&self, user_id: &str) -> Result<Vec<ChatHistoryRecord>, StoreError> {
        if !self.tables_exist {
            return Err(StoreError::Unavailable {
                table: CHAT_HISTORY_TABLE,
            });
        }
        Ok(self
            .history
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
