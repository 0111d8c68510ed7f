//! Posting to a Facebook Page via the Graph API.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{BotError, BotResult};

/// Production Graph API base URL.
pub const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Page identity and its access token.
#[derive(Clone)]
pub struct PageCredentials {
    pub page_id: String,
    pub access_token: String,
}

impl PageCredentials {
    pub fn new(page_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Read credentials from `FB_PAGE_ID` and `FB_PAGE_ACCESS_TOKEN`.
    pub fn from_env() -> BotResult<Self> {
        let access_token = std::env::var("FB_PAGE_ACCESS_TOKEN")
            .map_err(|_| BotError::MissingCredential("FB_PAGE_ACCESS_TOKEN"))?;
        let page_id = std::env::var("FB_PAGE_ID")
            .map_err(|_| BotError::MissingCredential("FB_PAGE_ID"))?;
        Ok(Self {
            page_id,
            access_token,
        })
    }
}

/// What the Graph API returns for a published photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PostReceipt {
    /// ID of the created photo object.
    pub id: Option<String>,
    /// ID of the page post wrapping the photo.
    pub post_id: Option<String>,
}

/// Publishes photos to one page.
#[derive(Clone)]
pub struct PagePoster {
    client: reqwest::Client,
    base: String,
    credentials: PageCredentials,
}

impl PagePoster {
    pub fn new(credentials: PageCredentials) -> Self {
        Self::with_base(DEFAULT_GRAPH_BASE, credentials)
    }

    /// Point the poster at a different Graph base URL, e.g. a mock server.
    pub fn with_base(base: impl Into<String>, credentials: PageCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pawprint-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base: base.into(),
            credentials,
        }
    }

    /// Publish the photo at `image_url` with `message` as its caption.
    ///
    /// The photo is posted by URL; Facebook fetches the bytes itself, so
    /// the image must be publicly reachable.
    pub async fn post_photo_url(&self, image_url: &str, message: &str) -> BotResult<PostReceipt> {
        let endpoint = format!("{}/{}/photos", self.base, self.credentials.page_id);
        tracing::info!("posting photo to page {}", self.credentials.page_id);

        let resp = self
            .client
            .post(&endpoint)
            .form(&[
                ("url", image_url),
                ("message", message),
                ("access_token", self.credentials.access_token.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::Api {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        Ok(serde_json::from_str(&resp.text().await?)?)
    }
}
