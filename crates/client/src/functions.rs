use anyhow::{Context, Result};
use extract::{ChannelResult, FailureKind, FundingResult, Outcome, RecommendationResult};
use forms::{ChannelSearch, FundingSearch, Profile};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;

pub const RECOMMEND: &str = "recommend";
pub const CHANNEL_FINDER: &str = "channel-finder";
pub const FUNDING_SCOUT: &str = "funding-scout";

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeError {
    /// `None` when no HTTP response was received at all.
    pub status: Option<u16>,
    pub message: String,
}

/// What invoking a server function yields: data or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub data: Option<Value>,
    pub error: Option<InvokeError>,
}

impl Invocation {
    fn data(value: Value) -> Self {
        Self {
            data: Some(value),
            error: None,
        }
    }

    fn error(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(InvokeError {
                status,
                message: message.into(),
            }),
        }
    }

    pub fn into_outcome<T: serde::de::DeserializeOwned>(self) -> Outcome<T> {
        match (self.error, self.data) {
            (Some(err), _) => {
                let kind = err
                    .status
                    .map(FailureKind::from_status)
                    .unwrap_or(FailureKind::Unreachable);
                Outcome::failed(kind, err.message)
            }
            (None, Some(data)) => Outcome::from_body(data),
            (None, None) => Outcome::failed(FailureKind::Unreachable, "empty response"),
        }
    }
}

/// Calls the named server functions over HTTP.
#[derive(Clone)]
pub struct FunctionsClient {
    client: reqwest::Client,
    base_url: String,
}

impl FunctionsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let base_url = dotenv::var("MATERNA_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `/{name}`. Never fails: transport problems come back
    /// in [`Invocation::error`].
    pub async fn invoke<B: Serialize + ?Sized>(&self, name: &str, body: &B) -> Invocation {
        let url = format!("{}/{}", self.base_url, name);

        let response = match self.client.post(&url).json(body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(function = name, error = %e, "function unreachable");
                return Invocation::error(None, format!("Could not reach {}: {}", name, e));
            }
        };

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                return Invocation::error(
                    Some(status.as_u16()),
                    format!("Unreadable response: {}", e),
                );
            }
        };

        if status.is_success() {
            return Invocation::data(body);
        }

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} failed with status {}", name, status));
        Invocation::error(Some(status.as_u16()), message)
    }

    pub async fn recommend(&self, profile: &Profile) -> Outcome<RecommendationResult> {
        let outcome = self.invoke(RECOMMEND, &json!({ "profile": profile })).await.into_outcome();
        notify(RECOMMEND, &outcome);
        outcome
    }

    pub async fn find_channels(&self, search: &ChannelSearch) -> Outcome<ChannelResult> {
        let outcome = self.invoke(CHANNEL_FINDER, search).await.into_outcome();
        notify(CHANNEL_FINDER, &outcome);
        outcome
    }

    pub async fn scout_funding(&self, search: &FundingSearch) -> Outcome<FundingResult> {
        let outcome = self.invoke(FUNDING_SCOUT, search).await.into_outcome();
        notify(FUNDING_SCOUT, &outcome);
        outcome
    }
}

fn notify<T>(function: &str, outcome: &Outcome<T>) {
    if let Outcome::Failed(failure) = outcome {
        tracing::warn!(function, kind = ?failure.kind, "{}", failure.message);
    }
}
