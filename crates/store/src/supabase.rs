use async_trait::async_trait;
use postgrest::Postgrest;
use serde_json::json;

use crate::{
    CHAT_HISTORY_TABLE, ChatHistoryRecord, ChatHistoryStore, ChatRole, PROFILES_TABLE,
    ProfileStore, StoreError, UserProfileRecord,
};

/// PostgREST error codes meaning the table does not exist.
const MISSING_TABLE_CODES: &[&str] = &["42P01", "PGRST205"];

/// Both optional tables on a Supabase project, through its REST endpoint.
pub struct SupabaseStore {
    client: Postgrest,
}

impl SupabaseStore {
    pub fn new(url: &str, key: &str) -> Self {
        let rest_url = format!("{}/rest/v1", url.trim_end_matches('/'));
        let client = Postgrest::new(rest_url)
            .insert_header("apikey", key)
            .insert_header("Authorization", format!("Bearer {}", key));
        Self { client }
    }

    pub fn from_env() -> Option<Self> {
        let url = dotenv::var("SUPABASE_URL").ok().filter(|v| !v.trim().is_empty())?;
        let key = dotenv::var("SUPABASE_KEY").ok().filter(|v| !v.trim().is_empty())?;
        Some(Self::new(&url, &key))
    }
}

/// Classify a PostgREST reply: the body on success, `Unavailable` when the
/// table is missing, `Request` for anything else.
fn classify(table: &'static str, status: u16, body: String) -> Result<String, StoreError> {
    if (200..300).contains(&status) {
        return Ok(body);
    }
    if status == 404 || MISSING_TABLE_CODES.iter().any(|code| body.contains(code)) {
        return Err(StoreError::Unavailable { table });
    }
    Err(StoreError::Request(format!("{} returned {}: {}", table, status, body)))
}

fn request_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Request(e.to_string())
}

#[async_trait]
impl ProfileStore for SupabaseStore {
    async fn upsert_profile(&self, record: &UserProfileRecord) -> Result<(), StoreError> {
        let body = serde_json::to_string(record).map_err(request_error)?;
        let response = self
            .client
            .from(PROFILES_TABLE)
            .upsert(body)
            .on_conflict("id")
            .execute()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(request_error)?;
        classify(PROFILES_TABLE, status, text).map(|_| ())
    }
}

#[async_trait]
impl ChatHistoryStore for SupabaseStore {
    async fn append_message(
        &self,
        user_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<(), StoreError> {
        let body = json!({ "user_id": user_id, "role": role, "content": content }).to_string();
        let response = self
            .client
            .from(CHAT_HISTORY_TABLE)
            .insert(body)
            .execute()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(request_error)?;
        classify(CHAT_HISTORY_TABLE, status, text).map(|_| ())
    }

    async fn load_history(&self, user_id: &str) -> Result<Vec<ChatHistoryRecord>, StoreError> {
        let response = self
            .client
            .from(CHAT_HISTORY_TABLE)
            .select("role,content,created_at")
            .eq("user_id", user_id)
            .order("created_at.asc")
            .execute()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(request_error)?;
        let body = classify(CHAT_HISTORY_TABLE, status, text)?;

        let mut records: Vec<ChatHistoryRecord> =
            serde_json::from_str(&body).map_err(request_error)?;
        for record in &mut records {
            record.user_id = user_id.to_string();
        }
        Ok(records)
    }
}
