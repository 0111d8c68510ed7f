//! CATAAS photo source.
//!
//! The JSON endpoint has changed shape more than once, so URL resolution
//! tolerates objects, one-element lists, and missing fields before falling
//! back to the plain `/cat` endpoint.

use std::time::Duration;

use serde_json::Value;

use crate::error::{BotError, BotResult};

/// Production CATAAS base URL.
pub const DEFAULT_BASE: &str = "https://cataas.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the CATAAS random-cat API.
#[derive(Clone)]
pub struct CataasClient {
    client: reqwest::Client,
    base: String,
}

impl Default for CataasClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CataasClient {
    pub fn new() -> Self {
        Self::with_base(DEFAULT_BASE)
    }

    /// Point the client at a different base URL, e.g. a mock server.
    pub fn with_base(base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pawprint-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base: base.into(),
        }
    }

    /// Resolve the URL of a random cat photo via the JSON endpoint.
    pub async fn random_image_url(&self) -> BotResult<String> {
        let endpoint = format!("{}/cat?json=true", self.base);
        let resp = self.client.get(&endpoint).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::Api {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let data: Value = serde_json::from_str(&resp.text().await?)?;
        Ok(self.image_url_from(&data))
    }

    /// Map a JSON endpoint answer to a fetchable image URL.
    fn image_url_from(&self, data: &Value) -> String {
        let obj = match data {
            Value::Array(items) => items.first().unwrap_or(data),
            other => other,
        };

        if let Some(url) = obj.get("url").and_then(Value::as_str) {
            if url.starts_with("http") {
                return url.to_string();
            }
            return format!("{}{url}", self.base);
        }

        if let Some(id) = obj.get("id").and_then(Value::as_str) {
            return format!("{}/cat/{id}", self.base);
        }

        tracing::warn!("unrecognized cataas answer shape, using the generic endpoint");
        format!("{}/cat", self.base)
    }

    /// URL requesting a photo already sized to `size` square.
    ///
    /// Processing still crops and resizes locally; this only cuts the
    /// transfer down.
    pub fn sized_url(&self, size: u32) -> String {
        format!("{}/cat?width={size}&height={size}", self.base)
    }

    /// Download raw image bytes from `url`.
    pub async fn download(&self, url: &str) -> BotResult<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::Api {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
