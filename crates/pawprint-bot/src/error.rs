//! Bot-level error types.
//!
//! Unlike the core library, the bot talks to the network and to a remote
//! API, so most of its operations are genuinely fallible.

use thiserror::Error;

/// Errors that can occur while fetching, processing, or posting.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("API rejected the request (HTTP {status}): {body}")]
    Api { status: u16, body: String },
}

/// Convenience result type.
pub type BotResult<T> = Result<T, BotError>;
