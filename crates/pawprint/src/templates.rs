//! Caption template pools and the components bank.
//!
//! Both are loaded once per run from the data directory. Missing or
//! unreadable files never fail the run; every category degrades to a
//! built-in single-element default so synthesis always has something to
//! draw from.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::types::TemplateKey;

/// Last-resort caption used when the selected pool and the basic pool are
/// both empty.
pub const FALLBACK_CAPTION: &str = "Cute cat alert! 🐾";

/// Emoji used when no configured mapping covers the tags.
pub const FALLBACK_EMOJI: &str = "🐾";

const DEFAULT_INTRO: &str = "Meet today's cat";
const DEFAULT_CTA: &str = "Follow for a new cat every day!";
const DEFAULT_DESCRIPTOR: &str = "adorable";

/// The four immutable caption pools, keyed by [`TemplateKey`].
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    pools: HashMap<TemplateKey, Vec<String>>,
}

impl TemplateStore {
    /// Empty store; pools are filled with [`TemplateStore::set_pool`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all four pools from `captions_<key>.txt` files in `dir`.
    ///
    /// Absent or unreadable files leave that pool empty; the engine's
    /// fallback chain covers it at draw time.
    pub fn load_dir(dir: &Path) -> Self {
        let mut store = Self::new();
        for key in TemplateKey::ALL {
            let path = dir.join(key.file_name());
            let lines = load_lines(&path);
            tracing::debug!("pool {key}: {} templates from {}", lines.len(), path.display());
            store.pools.insert(key, lines);
        }
        store
    }

    pub fn set_pool(&mut self, key: TemplateKey, templates: Vec<String>) {
        self.pools.insert(key, templates);
    }

    pub fn pool(&self, key: TemplateKey) -> &[String] {
        self.pools.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Draw a random template for `key`, honoring the fallback chain:
    /// the selected pool, then the basic pool, then [`FALLBACK_CAPTION`].
    pub fn draw<'a, R: Rng>(&'a self, key: TemplateKey, rng: &mut R) -> &'a str {
        let mut pool = self.pool(key);
        if pool.is_empty() {
            pool = self.pool(TemplateKey::Basic);
        }
        pool.choose(rng).map(String::as_str).unwrap_or(FALLBACK_CAPTION)
    }
}

/// Read non-blank trimmed lines from a pool file; absent files yield an
/// empty list.
fn load_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            tracing::warn!("could not read pool file {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Phrase fragments and emoji mappings used to fill template placeholders.
///
/// Deserialized from `components.json`; every field defaults to empty so a
/// partial file is fine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComponentsBank {
    pub intros: Vec<String>,
    pub ctas: Vec<String>,
    pub descriptors: Vec<String>,
    pub emojis: HashMap<String, String>,
}

impl ComponentsBank {
    /// Load from `components.json`. Absent files yield the empty bank;
    /// unparsable files are treated the same way with a warning.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(bank) => bank,
            Err(e) => {
                tracing::warn!("ignoring unparsable components file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn intro<R: Rng>(&self, rng: &mut R) -> &str {
        pick(&self.intros, DEFAULT_INTRO, rng)
    }

    pub fn cta<R: Rng>(&self, rng: &mut R) -> &str {
        pick(&self.ctas, DEFAULT_CTA, rng)
    }

    pub fn descriptor<R: Rng>(&self, rng: &mut R) -> &str {
        pick(&self.descriptors, DEFAULT_DESCRIPTOR, rng)
    }

    /// Resolve the emoji for a tag pair: attribute tag first, then color
    /// tag, then the map's `default` entry, then [`FALLBACK_EMOJI`].
    pub fn emoji(&self, attr: &str, color: &str) -> &str {
        self.lookup(attr)
            .or_else(|| self.lookup(color))
            .or_else(|| self.emojis.get("default").map(String::as_str))
            .unwrap_or(FALLBACK_EMOJI)
    }

    fn lookup(&self, tag: &str) -> Option<&str> {
        if tag.is_empty() {
            return None;
        }
        self.emojis.get(tag).map(String::as_str)
    }
}

/// Uniform random pick with a built-in default for empty categories.
fn pick<'a, R: Rng>(pool: &'a [String], default: &'a str, rng: &mut R) -> &'a str {
    pool.choose(rng).map(String::as_str).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_load_dir_missing_files_yield_empty_pools() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::load_dir(dir.path());
        for key in TemplateKey::ALL {
            assert!(store.pool(key).is_empty());
        }
    }

    #[test]
    fn test_load_dir_trims_and_drops_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captions_basic.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "  First template  ").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "Second {{emoji}}").unwrap();
        writeln!(f, "   ").unwrap();

        let store = TemplateStore::load_dir(dir.path());
        assert_eq!(
            store.pool(TemplateKey::Basic),
            &["First template".to_string(), "Second {emoji}".to_string()]
        );
        assert!(store.pool(TemplateKey::Attr).is_empty());
    }

    #[test]
    fn test_draw_falls_back_to_basic_pool() {
        let mut store = TemplateStore::new();
        store.set_pool(TemplateKey::Basic, vec!["only basic".to_string()]);
        let drawn = store.draw(TemplateKey::ColorAttr, &mut rng());
        assert_eq!(drawn, "only basic");
    }

    #[test]
    fn test_draw_falls_back_to_literal_when_all_empty() {
        let store = TemplateStore::new();
        assert_eq!(store.draw(TemplateKey::Attr, &mut rng()), FALLBACK_CAPTION);
        assert_eq!(store.draw(TemplateKey::Basic, &mut rng()), FALLBACK_CAPTION);
    }

    #[test]
    fn test_draw_uses_selected_pool_when_present() {
        let mut store = TemplateStore::new();
        store.set_pool(TemplateKey::Attr, vec!["attr pool".to_string()]);
        store.set_pool(TemplateKey::Basic, vec!["basic pool".to_string()]);
        assert_eq!(store.draw(TemplateKey::Attr, &mut rng()), "attr pool");
    }

    #[test]
    fn test_components_load_absent_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let bank = ComponentsBank::load(&dir.path().join("components.json"));
        assert!(bank.intros.is_empty());
        assert!(bank.emojis.is_empty());
    }

    #[test]
    fn test_components_load_corrupt_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("components.json");
        std::fs::write(&path, "{not json").unwrap();
        let bank = ComponentsBank::load(&path);
        assert!(bank.ctas.is_empty());
    }

    #[test]
    fn test_components_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("components.json");
        std::fs::write(&path, r#"{"intros": ["Hello"]}"#).unwrap();
        let bank = ComponentsBank::load(&path);
        assert_eq!(bank.intros, vec!["Hello".to_string()]);
        assert!(bank.descriptors.is_empty());
    }

    #[test]
    fn test_empty_categories_use_defaults() {
        let bank = ComponentsBank::default();
        let mut r = rng();
        assert_eq!(bank.intro(&mut r), DEFAULT_INTRO);
        assert_eq!(bank.cta(&mut r), DEFAULT_CTA);
        assert_eq!(bank.descriptor(&mut r), DEFAULT_DESCRIPTOR);
    }

    #[test]
    fn test_emoji_precedence_attr_then_color_then_default() {
        let mut bank = ComponentsBank::default();
        bank.emojis.insert("sleepy".to_string(), "😴".to_string());
        bank.emojis.insert("orange".to_string(), "🧡".to_string());
        bank.emojis.insert("default".to_string(), "🐱".to_string());

        assert_eq!(bank.emoji("sleepy", "orange"), "😴");
        assert_eq!(bank.emoji("grumpy", "orange"), "🧡");
        assert_eq!(bank.emoji("grumpy", "white"), "🐱");
    }

    #[test]
    fn test_emoji_hardcoded_fallback_when_unconfigured() {
        let bank = ComponentsBank::default();
        assert_eq!(bank.emoji("", ""), FALLBACK_EMOJI);
        assert_eq!(bank.emoji("sleepy", "orange"), FALLBACK_EMOJI);
    }

    #[test]
    fn test_emoji_empty_tags_skip_lookup() {
        let mut bank = ComponentsBank::default();
        bank.emojis.insert("".to_string(), "🚫".to_string());
        bank.emojis.insert("default".to_string(), "🐱".to_string());
        // An empty tag must not match an (odd) empty-string key.
        assert_eq!(bank.emoji("", ""), "🐱");
    }
}
