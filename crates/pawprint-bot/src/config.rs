//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

/// File name of the posting history inside the data directory.
pub const HISTORY_FILE: &str = "posted_history.json";

/// File name of the components bank inside the data directory.
pub const COMPONENTS_FILE: &str = "components.json";

/// File name of the processed photo artifact inside the data directory.
pub const PHOTO_FILE: &str = "photo.jpg";

/// Resolve the data directory.
///
/// Precedence: explicit flag, then the `PAWPRINT_DIR` env var, then a
/// `data/` directory in the working directory if one exists, then
/// `~/.pawprint`.
pub fn resolve_data_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }

    if let Ok(env_dir) = std::env::var("PAWPRINT_DIR") {
        return PathBuf::from(env_dir);
    }

    let cwd_data = PathBuf::from("data");
    if cwd_data.is_dir() {
        return cwd_data;
    }

    resolve_default_data_dir()
}

fn resolve_default_data_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(".pawprint")
}

/// The well-known file locations inside a resolved data directory.
#[derive(Debug, Clone)]
pub struct BotPaths {
    pub data_dir: PathBuf,
}

impl BotPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Directory holding the `captions_*.txt` pool files.
    pub fn templates_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn components(&self) -> PathBuf {
        self.data_dir.join(COMPONENTS_FILE)
    }

    pub fn history(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn photo(&self) -> PathBuf {
        self.data_dir.join(PHOTO_FILE)
    }
}
