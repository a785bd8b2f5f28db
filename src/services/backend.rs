use crate::models::{MenuEntry, UserProfile};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when reading from the backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Table names in the backend
#[derive(Debug, Clone)]
pub struct BackendTables {
    pub menus: String,
    pub stalls: String,
    pub profiles: String,
}

/// Read-only client for the backend's REST data interface
///
/// Only ever issues `GET`s:
/// - the menu catalog with each row's stall embedded
/// - single user profiles
/// - the full profile roster for peer ranking
///
/// Saved-id columns are normalized while decoding, see [`crate::models::SavedIds`].
pub struct BackendClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: BackendTables,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(
        base_url: String,
        api_key: String,
        timeout_secs: u64,
        tables: BackendTables,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Issue a GET and return the JSON array of rows
    async fn get_rows(&self, url: &str) -> Result<Vec<Value>, BackendError> {
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Backend request to {} failed: {} - {}", url, status, body);
            return Err(BackendError::ApiError(format!("Request failed: {}", status)));
        }

        let json: Value = response.json().await?;

        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(BackendError::InvalidResponse("Expected an array of rows".into())),
        }
    }

    /// Decode rows, skipping those that do not fit the model
    fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, kind: &str) -> Vec<T> {
        let total = rows.len();
        let decoded: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::debug!("Skipping malformed {} row: {}", kind, e);
                    None
                }
            })
            .collect();

        if decoded.len() < total {
            tracing::warn!("Skipped {} of {} {} rows", total - decoded.len(), total, kind);
        }

        decoded
    }

    /// Fetch the whole menu catalog with stall attributes embedded
    pub async fn fetch_catalog(&self) -> Result<Vec<MenuEntry>, BackendError> {
        let select = format!("*,stall:{}(*)", self.tables.stalls);
        let url = format!(
            "{}?select={}",
            self.table_url(&self.tables.menus),
            urlencoding::encode(&select)
        );

        tracing::debug!("Fetching catalog from: {}", url);

        let rows = self.get_rows(&url).await?;
        let entries: Vec<MenuEntry> = Self::decode_rows(rows, "menu");

        tracing::debug!("Fetched {} menu entries", entries.len());

        Ok(entries)
    }

    /// Get a single profile by user ID
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        let url = format!(
            "{}?select=*&id=eq.{}",
            self.table_url(&self.tables.profiles),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching profile for user: {}", user_id);

        let rows = self.get_rows(&url).await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("Profile not found for user {}", user_id)))?;

        serde_json::from_value(row)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }

    /// Fetch every profile, used as the peer roster
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>, BackendError> {
        let url = format!("{}?select=*", self.table_url(&self.tables.profiles));

        let rows = self.get_rows(&url).await?;
        let profiles: Vec<UserProfile> = Self::decode_rows(rows, "profile");

        tracing::debug!("Fetched {} profiles", profiles.len());

        Ok(profiles)
    }
}
