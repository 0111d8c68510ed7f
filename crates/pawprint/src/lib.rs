//! Pawprint — core caption library: dominant-color tagging, template-based
//! caption synthesis, and the posting history that keeps captions fresh.

pub mod caption;
pub mod classifier;
pub mod history;
pub mod templates;
pub mod types;

pub use caption::{is_color_term, select_template_key, CaptionEngine, COLOR_TERMS};
pub use classifier::dominant_color;
pub use history::{HistoryStore, DEFAULT_MAX_ENTRIES};
pub use templates::{ComponentsBank, TemplateStore, FALLBACK_CAPTION};
pub use types::*;
