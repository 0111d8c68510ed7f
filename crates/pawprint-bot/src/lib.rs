//! Pawprint bot — fetches a cat photo, tags its dominant color, synthesizes
//! a fresh caption, and posts it to a Facebook Page.

pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod post;
pub mod process;

pub use config::{resolve_data_dir, BotPaths};
pub use error::{BotError, BotResult};
pub use fetch::CataasClient;
pub use pipeline::{run_post, run_preview, RunOptions, RunReport};
pub use post::{PageCredentials, PagePoster};
