//! The daily run: fetch a photo, tag it, caption it, post it.
//!
//! Clients are passed in rather than built here so the whole pipeline can
//! run against mock servers.

use chrono::Utc;

use pawprint::{dominant_color, CaptionEngine, ComponentsBank, HistoryStore, TemplateStore};

use crate::config::BotPaths;
use crate::error::BotResult;
use crate::fetch::CataasClient;
use crate::post::{PagePoster, PostReceipt};
use crate::process;

/// Knobs for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Tags supplied by the operator, appended after the detected color.
    pub extra_tags: Vec<String>,
    /// Side length of the processed artifact.
    pub size: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            extra_tags: Vec::new(),
            size: process::TARGET_SIZE,
        }
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub caption: String,
    pub image_url: String,
    pub color: Option<&'static str>,
    /// Present when the photo was actually published.
    pub receipt: Option<PostReceipt>,
}

/// Build the caption engine from the files in the data directory.
pub fn load_engine(paths: &BotPaths) -> CaptionEngine {
    let templates = TemplateStore::load_dir(paths.templates_dir());
    let components = ComponentsBank::load(&paths.components());
    CaptionEngine::new(templates, components)
}

/// Detected color first, operator tags after, preserving their order.
fn assemble_tags(color: Option<&str>, extras: &[String]) -> Vec<String> {
    let mut tags = Vec::with_capacity(extras.len() + 1);
    if let Some(c) = color {
        tags.push(c.to_string());
    }
    tags.extend(extras.iter().cloned());
    tags
}

/// Fetch a random photo, write the square artifact, and classify it.
///
/// A photo that cannot be decoded is not fatal: the post falls back to the
/// original URL with no color tag and no local artifact.
async fn fetch_photo(
    cataas: &CataasClient,
    paths: &BotPaths,
    size: u32,
) -> BotResult<(String, Option<&'static str>)> {
    let image_url = cataas.random_image_url().await?;
    tracing::info!("fetched image URL: {image_url}");

    let bytes = cataas.download(&image_url).await?;
    let color = match process::make_square_jpeg(&bytes, &paths.photo(), size) {
        Ok(squared) => dominant_color(&squared),
        Err(e) => {
            tracing::warn!("could not process the photo ({e}); posting it untagged");
            None
        }
    };
    if let Some(c) = color {
        tracing::info!("dominant color: {c}");
    }

    Ok((image_url, color))
}

/// The full daily run: fetch, classify, caption, record, publish.
pub async fn run_post(
    cataas: &CataasClient,
    poster: &PagePoster,
    paths: &BotPaths,
    opts: &RunOptions,
) -> BotResult<RunReport> {
    let (image_url, color) = fetch_photo(cataas, paths, opts.size).await?;
    let tags = assemble_tags(color, &opts.extra_tags);

    let engine = load_engine(paths);
    let mut history = HistoryStore::load(paths.history());
    let caption = engine.generate(&tags, &mut history);
    tracing::info!("selected caption: {caption}");

    let receipt = poster.post_photo_url(&image_url, &caption).await?;
    if let Some(id) = receipt.id.as_deref() {
        tracing::info!("posted photo {id}");
    }

    Ok(RunReport {
        caption,
        image_url,
        color,
        receipt: Some(receipt),
    })
}

/// Like [`run_post`] but stops short of publishing and leaves the posting
/// history untouched.
pub async fn run_preview(
    cataas: &CataasClient,
    paths: &BotPaths,
    opts: &RunOptions,
) -> BotResult<RunReport> {
    let (image_url, color) = fetch_photo(cataas, paths, opts.size).await?;
    let tags = assemble_tags(color, &opts.extra_tags);

    let engine = load_engine(paths);
    let history = HistoryStore::load(paths.history());
    let outcome = engine.compose(&tags, &history, Utc::now(), &mut rand::thread_rng());

    Ok(RunReport {
        caption: outcome.into_caption(),
        image_url,
        color,
        receipt: None,
    })
}

/// Synthesize a caption from operator tags alone, no network involved.
/// Records to the history only when `record` is set.
pub fn caption_only(paths: &BotPaths, tags: &[String], record: bool) -> String {
    let engine = load_engine(paths);
    let mut history = HistoryStore::load(paths.history());
    if record {
        engine.generate(tags, &mut history)
    } else {
        engine
            .compose(tags, &history, Utc::now(), &mut rand::thread_rng())
            .into_caption()
    }
}

/// Classify an image file on disk.
pub fn classify_file(path: &std::path::Path) -> BotResult<Option<&'static str>> {
    let img = image::open(path)?;
    Ok(dominant_color(&img))
}
