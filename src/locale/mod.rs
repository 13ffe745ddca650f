//! Display strings by stable key
//!
//! The editor never embeds user-facing text; labels, step-type names and
//! error messages are looked up here. Catalogs are embedded JSON files, one per
//! language, with English as the fallback for missing keys. Placeholders such
//! as `{{number}}` are filled with handlebars.

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

type Strings = HashMap<String, String>;

static CATALOGS: Lazy<HashMap<Language, Strings>> = Lazy::new(|| {
    Language::all()
        .iter()
        .map(|lang| (*lang, parse_catalog(*lang)))
        .collect()
});

fn parse_catalog(language: Language) -> Strings {
    match serde_json::from_str(language.catalog_json()) {
        Ok(strings) => strings,
        Err(e) => {
            warn!("Failed to parse {} catalog: {}", language.code(), e);
            Strings::new()
        }
    }
}

/// Supported interface languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

/// Text direction for a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[Language::En, Language::Ar]
    }

    /// Language code (e.g., "en", "ar")
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// Parse a language code, ignoring case and region suffixes ("ar-EG")
    pub fn from_code(code: &str) -> Option<Language> {
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Language::En => Direction::Ltr,
            Language::Ar => Direction::Rtl,
        }
    }

    /// The next language in the switcher cycle
    pub fn next(self) -> Language {
        let all = Language::all();
        let idx = all.iter().position(|l| *l == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    fn catalog_json(self) -> &'static str {
        match self {
            Language::En => include_str!("catalogs/en.json"),
            Language::Ar => include_str!("catalogs/ar.json"),
        }
    }
}

/// String lookup for the active language
pub struct Catalog {
    language: Language,
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    pub fn new(language: Language) -> Self {
        let mut handlebars = Handlebars::new();
        // Catalog text is displayed in a terminal, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        Self {
            language,
            handlebars,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn direction(&self) -> Direction {
        self.language.direction()
    }

    /// Text for `key`: active language, then English, then the key itself
    pub fn text<'a>(&self, key: &'a str) -> &'a str {
        lookup(self.language, key)
            .or_else(|| lookup(Language::En, key))
            .unwrap_or(key)
    }

    /// Text for `key` with `{{placeholders}}` filled from `values`
    pub fn format(&self, key: &str, values: &HashMap<&str, String>) -> String {
        let template = self.text(key);
        match self.handlebars.render_template(template, values) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("Failed to render locale key {}: {}", key, e);
                template.to_string()
            }
        }
    }

    /// "Step N" heading for a zero-based position
    pub fn step_heading(&self, position: usize) -> String {
        let values = HashMap::from([("number", (position + 1).to_string())]);
        self.format("step_number", &values)
    }

    /// User-facing message for an editor error
    pub fn error_message(&self, error: &crate::editor::EditorError) -> String {
        let mut values = HashMap::new();
        if let Some(position) = error.position() {
            values.insert("number", (position + 1).to_string());
        }
        self.format(error.locale_key(), &values)
    }
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    CATALOGS
        .get(&language)
        .and_then(|strings| strings.get(key))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorError;

    #[test]
    fn test_catalogs_parse() {
        for lang in Language::all() {
            assert!(
                lookup(*lang, "step_number").is_some(),
                "{} catalog missing step_number",
                lang.code()
            );
        }
    }

    #[test]
    fn test_text_active_language() {
        let catalog = Catalog::new(Language::Ar);
        assert_eq!(catalog.text("email_subject_label"), "الموضوع");
    }

    #[test]
    fn test_text_falls_back_to_english_then_key() {
        let catalog = Catalog::new(Language::Ar);
        assert_eq!(catalog.text("internal_error"), "Something went wrong in the editor.");
        assert_eq!(catalog.text("no_such_key"), "no_such_key");
    }

    #[test]
    fn test_step_heading_is_one_based() {
        let catalog = Catalog::new(Language::En);
        assert_eq!(catalog.step_heading(0), "Step 1");
        assert_eq!(catalog.step_heading(4), "Step 5");
    }

    #[test]
    fn test_error_message_includes_step_number() {
        let catalog = Catalog::new(Language::En);
        let message = catalog.error_message(&EditorError::IncompleteStep { position: 1 });
        assert_eq!(message, "Step 2 has no step type selected.");
    }

    #[test]
    fn test_format_does_not_escape() {
        let catalog = Catalog::new(Language::En);
        let text = catalog.format("automation_steps_placeholder", &HashMap::new());
        assert!(text.contains("\"action\""));
    }

    #[test]
    fn test_language_codes_and_direction() {
        assert_eq!(Language::from_code("AR-eg"), Some(Language::Ar));
        assert_eq!(Language::from_code("en_US"), Some(Language::En));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::Ar.direction(), Direction::Rtl);
        assert_eq!(Language::En.direction(), Direction::Ltr);
        assert_eq!(Language::En.next(), Language::Ar);
        assert_eq!(Language::Ar.next(), Language::En);
    }

    #[test]
    fn test_set_language() {
        let mut catalog = Catalog::new(Language::En);
        catalog.set_language(Language::Ar);
        assert_eq!(catalog.language(), Language::Ar);
        assert_eq!(catalog.direction(), Direction::Rtl);
    }
}
