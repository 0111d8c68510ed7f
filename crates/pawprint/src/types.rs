//! Core data types for caption synthesis and posting history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A previously emitted caption with its UTC timestamp.
///
/// Serialized as `{"time": "<RFC 3339>", "caption": "..."}` inside the
/// posting history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: DateTime<Utc>,
    pub caption: String,
}

/// Which caption pool to draw from, derived from the tag set.
///
/// The four keys are fixed because the caption copy is authored against
/// them. Note the asymmetry: a color-only tag set maps to `Basic`, not to
/// a color-specific pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    Basic,
    NoColor,
    Attr,
    ColorAttr,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 4] = [
        TemplateKey::Basic,
        TemplateKey::NoColor,
        TemplateKey::Attr,
        TemplateKey::ColorAttr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::Basic => "basic",
            TemplateKey::NoColor => "no_color",
            TemplateKey::Attr => "attr",
            TemplateKey::ColorAttr => "color_attr",
        }
    }

    /// Name of the pool file for this key, e.g. `captions_basic.txt`.
    pub fn file_name(&self) -> String {
        format!("captions_{}.txt", self.as_str())
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the bounded candidate search.
///
/// `Fresh` means the caption passed the recency check; `Exhausted` carries
/// the last candidate drawn after the retry budget ran out. The caller
/// decides whether to decorate an exhausted candidate before accepting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionOutcome {
    Fresh(String),
    Exhausted(String),
}

impl CaptionOutcome {
    /// The caption text regardless of freshness.
    pub fn into_caption(self) -> String {
        match self {
            CaptionOutcome::Fresh(c) | CaptionOutcome::Exhausted(c) => c,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CaptionOutcome::Fresh(_))
    }
}

/// How far back a caption counts as "recently used": the last `last_n`
/// entries, and any entry younger than `days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    pub last_n: usize,
    pub days: i64,
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self {
            last_n: 30,
            days: 30,
        }
    }
}

/// Errors from the core library.
///
/// Only history persistence is genuinely fallible; every other condition
/// (missing config, corrupt history, indeterminate classification) degrades
/// to a built-in default instead of erroring.
#[derive(thiserror::Error, Debug)]
pub enum PawprintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type PawprintResult<T> = Result<T, PawprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_key_names() {
        assert_eq!(TemplateKey::Basic.as_str(), "basic");
        assert_eq!(TemplateKey::NoColor.as_str(), "no_color");
        assert_eq!(TemplateKey::Attr.as_str(), "attr");
        assert_eq!(TemplateKey::ColorAttr.as_str(), "color_attr");
    }

    #[test]
    fn test_template_key_file_names() {
        assert_eq!(TemplateKey::ColorAttr.file_name(), "captions_color_attr.txt");
    }

    #[test]
    fn test_outcome_into_caption() {
        assert_eq!(
            CaptionOutcome::Fresh("a".to_string()).into_caption(),
            "a"
        );
        assert_eq!(
            CaptionOutcome::Exhausted("b".to_string()).into_caption(),
            "b"
        );
        assert!(CaptionOutcome::Fresh(String::new()).is_fresh());
        assert!(!CaptionOutcome::Exhausted(String::new()).is_fresh());
    }

    #[test]
    fn test_history_entry_roundtrip() {
        let entry = HistoryEntry {
            time: Utc::now(),
            caption: "Cute cat alert! 🐾".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
