//! Heading anchors in the GitHub style
//!
//! Lowercase, punctuation stripped, spaces turned into `-`. Repeated slugs
//! within one document get `-1`, `-2`, ... appended.

use std::collections::HashMap;

/// Slug of `text` without duplicate tracking
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// Per-document slug generator
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique slug for `text` within this document
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();

        while self.seen.contains_key(&slug) {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            slug = format!("{}-{}", base, count);
        }

        self.seen.insert(slug.clone(), 0);
        slug
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("use_dialog() & friends"), "use_dialog--friends");
        assert_eq!(slugify("Ünïcode Títle"), "ünïcode-títle");
    }

    #[test]
    fn test_duplicates_get_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Props"), "props");
        assert_eq!(slugger.slug("Props"), "props-1");
        assert_eq!(slugger.slug("Props"), "props-2");
        assert_eq!(slugger.slug("Props 1"), "props-1-1");
    }

    #[test]
    fn test_reset() {
        let mut slugger = Slugger::new();
        slugger.slug("Intro");
        slugger.reset();
        assert_eq!(slugger.slug("Intro"), "intro");
    }
}
