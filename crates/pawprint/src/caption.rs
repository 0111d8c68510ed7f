//! Caption synthesis: template-key selection, placeholder resolution, and
//! the recency-aware generation loop.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::history::HistoryStore;
use crate::templates::{ComponentsBank, TemplateStore};
use crate::types::{CaptionOutcome, RecencyWindow, TemplateKey};

/// Tags recognized as cat colors. Everything else is an attribute tag.
pub const COLOR_TERMS: [&str; 7] = [
    "orange", "white", "black", "gray", "brown", "ginger", "tabby",
];

/// Attempts the engine makes to find a caption not used recently before it
/// settles for a decorated repeat.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Decorative suffixes appended to a repeat accepted on budget exhaustion.
const EXHAUSTED_SUFFIXES: [&str; 4] = ["✨", "🐾", "😺", "💕"];

/// True when `tag` is in the color vocabulary (case-insensitive).
pub fn is_color_term(tag: &str) -> bool {
    COLOR_TERMS.iter().any(|c| tag.eq_ignore_ascii_case(c))
}

/// Pick the template pool for a tag set.
///
/// Color-only tag sets map to `Basic`, not to a color-specific pool; the
/// caption copy is authored against exactly these four keys, so the
/// asymmetry is intentional.
pub fn select_template_key(tags: &[String]) -> TemplateKey {
    let has_color = tags.iter().any(|t| is_color_term(t));
    let has_attr = tags.iter().any(|t| !is_color_term(t));
    match (has_color, has_attr) {
        (true, true) => TemplateKey::ColorAttr,
        (false, true) => TemplateKey::Attr,
        (false, false) => TemplateKey::NoColor,
        (true, false) => TemplateKey::Basic,
    }
}

/// First tag in caller order that is a color term, else empty.
fn color_value(tags: &[String]) -> &str {
    tags.iter()
        .find(|t| is_color_term(t))
        .map(String::as_str)
        .unwrap_or("")
}

/// First tag in caller order not equal to the chosen color value, else
/// empty. Deliberately compares against the color *value*, not the color
/// vocabulary: a second color tag still fills the attribute slots.
fn attr_value<'a>(tags: &'a [String], color: &str) -> &'a str {
    tags.iter()
        .find(|t| t.as_str() != color)
        .map(String::as_str)
        .unwrap_or("")
}

/// Synthesizes captions from template pools while avoiding near-term
/// repeats recorded in the history store.
pub struct CaptionEngine {
    templates: TemplateStore,
    components: ComponentsBank,
    recency: RecencyWindow,
    max_attempts: u32,
}

impl CaptionEngine {
    pub fn new(templates: TemplateStore, components: ComponentsBank) -> Self {
        Self {
            templates,
            components,
            recency: RecencyWindow::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the recency window and retry budget.
    pub fn with_policy(mut self, recency: RecencyWindow, max_attempts: u32) -> Self {
        self.recency = recency;
        self.max_attempts = max_attempts;
        self
    }

    /// Fill every placeholder token in `template`.
    ///
    /// All eight tokens are replaced independently; they do not nest or
    /// alias, so replacement order is irrelevant. Unknown `{...}` tokens are
    /// left verbatim.
    fn resolve<R: Rng>(&self, template: &str, color: &str, attr: &str, rng: &mut R) -> String {
        let intro = self.components.intro(rng);
        let cta = self.components.cta(rng);
        let descriptor = self.components.descriptor(rng);
        let emoji = self.components.emoji(attr, color);

        template
            .replace("{intro}", intro)
            .replace("{cta}", cta)
            .replace("{descriptor}", descriptor)
            .replace("{emoji}", emoji)
            .replace("{color_word}", color)
            .replace("{color_adj}", color)
            .replace("{attr_word}", attr)
            .replace("{attr_desc}", attr)
    }

    /// The bounded candidate search. Draws templates and resolves
    /// placeholders until a candidate passes the recency check or the
    /// budget runs out. Pure over the history store: no entry is recorded.
    pub fn compose<R: Rng>(
        &self,
        tags: &[String],
        history: &HistoryStore,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> CaptionOutcome {
        let key = select_template_key(tags);
        let color = color_value(tags);
        let attr = attr_value(tags, color);
        tracing::debug!("composing from pool {key} (color={color:?}, attr={attr:?})");

        let mut candidate = String::new();
        for attempt in 0..self.max_attempts.max(1) {
            let template = self.templates.draw(key, rng);
            candidate = self.resolve(template, color, attr, rng);
            if !history.used_recently(&candidate, now, self.recency) {
                tracing::debug!("fresh caption on attempt {}", attempt + 1);
                return CaptionOutcome::Fresh(candidate);
            }
        }
        CaptionOutcome::Exhausted(candidate)
    }

    /// Generate a caption for `tags`, record it in `history`, and persist
    /// the store. Always returns a usable caption: on budget exhaustion the
    /// last candidate is accepted with a random decorative suffix, and a
    /// failed history write is logged rather than propagated.
    pub fn generate(&self, tags: &[String], history: &mut HistoryStore) -> String {
        self.generate_with(tags, history, Utc::now(), &mut rand::thread_rng())
    }

    /// [`CaptionEngine::generate`] with an explicit clock and RNG, for
    /// deterministic replay and tests.
    pub fn generate_with<R: Rng>(
        &self,
        tags: &[String],
        history: &mut HistoryStore,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> String {
        let caption = match self.compose(tags, history, now, rng) {
            CaptionOutcome::Fresh(caption) => caption,
            CaptionOutcome::Exhausted(mut caption) => {
                tracing::warn!(
                    "no fresh caption within {} attempts; accepting a decorated repeat",
                    self.max_attempts
                );
                let suffix = EXHAUSTED_SUFFIXES.choose(rng).copied().unwrap_or("🐾");
                caption.push(' ');
                caption.push_str(suffix);
                caption
            }
        };

        if let Err(e) = history.record(caption.clone(), now) {
            // Worst case is a repeat risk on the next run; the caption
            // itself is still good to post.
            tracing::warn!("failed to persist posting history: {e}");
        }
        caption
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn empty_history(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::load(dir.path().join("posted_history.json"))
    }

    fn engine_with_basic(templates: Vec<&str>) -> CaptionEngine {
        let mut store = TemplateStore::new();
        store.set_pool(
            TemplateKey::Basic,
            templates.into_iter().map(String::from).collect(),
        );
        CaptionEngine::new(store, ComponentsBank::default())
    }

    #[test]
    fn test_select_key_color_and_attr() {
        assert_eq!(
            select_template_key(&tags(&["orange", "sleepy"])),
            TemplateKey::ColorAttr
        );
    }

    #[test]
    fn test_select_key_attr_only() {
        assert_eq!(select_template_key(&tags(&["sleepy"])), TemplateKey::Attr);
    }

    #[test]
    fn test_select_key_empty() {
        assert_eq!(select_template_key(&[]), TemplateKey::NoColor);
    }

    #[test]
    fn test_select_key_color_only_maps_to_basic() {
        assert_eq!(select_template_key(&tags(&["tabby"])), TemplateKey::Basic);
        assert_eq!(
            select_template_key(&tags(&["ginger", "white"])),
            TemplateKey::Basic
        );
    }

    #[test]
    fn test_select_key_is_case_insensitive() {
        assert_eq!(select_template_key(&tags(&["Orange"])), TemplateKey::Basic);
    }

    #[test]
    fn test_color_and_attr_values_preserve_caller_order() {
        let t = tags(&["sleepy", "orange", "gray"]);
        let color = color_value(&t);
        assert_eq!(color, "orange");
        assert_eq!(attr_value(&t, color), "sleepy");
    }

    #[test]
    fn test_attr_value_may_be_second_color() {
        let t = tags(&["orange", "ginger"]);
        let color = color_value(&t);
        assert_eq!(color, "orange");
        assert_eq!(attr_value(&t, color), "ginger");
    }

    #[test]
    fn test_attr_value_empty_for_lone_color() {
        let t = tags(&["orange"]);
        assert_eq!(attr_value(&t, "orange"), "");
    }

    #[test]
    fn test_resolve_replaces_all_known_tokens() {
        let mut bank = ComponentsBank::default();
        bank.intros = vec!["Look".to_string()];
        bank.ctas = vec!["Share!".to_string()];
        bank.descriptors = vec!["soft".to_string()];
        bank.emojis.insert("orange".to_string(), "🧡".to_string());

        let engine = CaptionEngine::new(TemplateStore::new(), bank);
        let out = engine.resolve(
            "{intro}: a {color_adj}, {descriptor} cat ({attr_word}) {emoji} {cta}",
            "orange",
            "sleepy",
            &mut rng(),
        );
        assert_eq!(out, "Look: a orange, soft cat (sleepy) 🧡 Share!");
        assert!(!out.contains('{'));
    }

    #[test]
    fn test_resolve_is_idempotent_per_token() {
        let engine = CaptionEngine::new(TemplateStore::new(), ComponentsBank::default());
        let once = engine.resolve("{color_word} cat {emoji}", "gray", "", &mut rng());
        let twice = engine.resolve(&once, "gray", "", &mut rng());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resolve_absent_tags_substitute_empty() {
        let engine = CaptionEngine::new(TemplateStore::new(), ComponentsBank::default());
        let out = engine.resolve("[{color_word}|{attr_desc}]", "", "", &mut rng());
        assert_eq!(out, "[|]");
    }

    #[test]
    fn test_resolve_leaves_unknown_tokens_verbatim() {
        let engine = CaptionEngine::new(TemplateStore::new(), ComponentsBank::default());
        let out = engine.resolve("stay {mystery} stay", "", "", &mut rng());
        assert_eq!(out, "stay {mystery} stay");
    }

    #[test]
    fn test_compose_fresh_on_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = empty_history(&dir);
        let engine = engine_with_basic(vec!["Hello cat"]);
        let outcome = engine.compose(&[], &history, Utc::now(), &mut rng());
        assert_eq!(outcome, CaptionOutcome::Fresh("Hello cat".to_string()));
    }

    #[test]
    fn test_compose_has_no_history_side_effect() {
        let dir = tempfile::tempdir().unwrap();
        let history = empty_history(&dir);
        let engine = engine_with_basic(vec!["Hello cat"]);
        let _ = engine.compose(&[], &history, Utc::now(), &mut rng());
        assert!(history.is_empty());
        assert!(!dir.path().join("posted_history.json").exists());
    }

    #[test]
    fn test_compose_exhausted_when_everything_recent() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = empty_history(&dir);
        history.append("Hello cat", Utc::now());
        let engine = engine_with_basic(vec!["Hello cat"]);
        let outcome = engine.compose(&[], &history, Utc::now(), &mut rng());
        assert_eq!(outcome, CaptionOutcome::Exhausted("Hello cat".to_string()));
    }

    #[test]
    fn test_generate_avoids_recent_repeat() {
        // History holds 30 copies of "A"; pool renders "A" or "B". The
        // engine must emit "B" whenever the budget can reach it.
        let dir = tempfile::tempdir().unwrap();
        let mut history = empty_history(&dir);
        for _ in 0..30 {
            history.append("A", Utc::now());
        }
        let engine = engine_with_basic(vec!["A", "B"]);
        let caption = engine.generate_with(&[], &mut history, Utc::now(), &mut rng());
        assert_eq!(caption, "B");
    }

    #[test]
    fn test_generate_default_scenario_produces_paw_print() {
        // Empty tags, absent bank, only the basic pool configured.
        let dir = tempfile::tempdir().unwrap();
        let mut history = empty_history(&dir);
        let engine = engine_with_basic(vec!["Cute! {emoji}"]);

        let before = Utc::now();
        let caption = engine.generate_with(&[], &mut history, before, &mut rng());
        assert_eq!(caption, "Cute! 🐾");

        assert_eq!(history.len(), 1);
        let entry = history.entries().next().unwrap();
        assert_eq!(entry.caption, "Cute! 🐾");
        assert_eq!(entry.time, before);
    }

    #[test]
    fn test_generate_records_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted_history.json");
        let mut history = HistoryStore::load(&path);
        let engine = engine_with_basic(vec!["Hello cat"]);

        let caption = engine.generate_with(&[], &mut history, Utc::now(), &mut rng());
        assert_eq!(caption, "Hello cat");
        assert!(path.exists());

        let reloaded = HistoryStore::load(&path);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_generate_exhausted_decorates_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = empty_history(&dir);
        history.append("Hello cat", Utc::now());
        let engine = engine_with_basic(vec!["Hello cat"]);

        let caption = engine.generate_with(&[], &mut history, Utc::now(), &mut rng());
        assert!(caption.starts_with("Hello cat "));
        let suffix = caption.strip_prefix("Hello cat ").unwrap();
        assert!(EXHAUSTED_SUFFIXES.contains(&suffix));

        // The decorated repeat is recorded like any accepted caption.
        assert_eq!(history.len(), 2);
        assert_eq!(history.recent(1)[0].caption, caption);
    }

    #[test]
    fn test_generate_with_is_deterministic() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let engine = engine_with_basic(vec!["one", "two", "three"]);

        let now = Utc::now();
        let mut history_a = empty_history(&dir_a);
        let mut history_b = empty_history(&dir_b);
        let a = engine.generate_with(&[], &mut history_a, now, &mut StdRng::seed_from_u64(9));
        let b = engine.generate_with(&[], &mut history_b, now, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_from_fully_empty_configuration() {
        // No pools, no bank: the hardcoded literal caption comes through.
        let dir = tempfile::tempdir().unwrap();
        let mut history = empty_history(&dir);
        let engine = CaptionEngine::new(TemplateStore::new(), ComponentsBank::default());
        let caption = engine.generate_with(&[], &mut history, Utc::now(), &mut rng());
        assert_eq!(caption, crate::templates::FALLBACK_CAPTION);
    }
}
