//! Part-number canonicalization shared by both sides of the join.
//!
//! `(REV2) ABC-123_X` → `ABC`: trim, drop a leading `(...)` prefix, keep the
//! segment before the first `-` or `_`, remove anything that is not a word
//! character, upper-case (ASCII only, no locale rules).

use regex::Regex;

/// Compiled patterns for key normalization. Build one per run and reuse it.
#[derive(Debug, Clone)]
pub struct KeyNormalizer {
    prefix: Regex,
    non_word: Regex,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyNormalizer {
    pub fn new() -> Self {
        Self {
            prefix: Regex::new(r"^\(.*?\)").unwrap(),
            non_word: Regex::new(r"[^\w]").unwrap(),
        }
    }

    /// Null input yields the empty key. Never fails.
    pub fn normalize(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw else {
            return String::new();
        };
        let trimmed = raw.trim();
        let unprefixed = self.prefix.replace(trimmed, "");
        let head = unprefixed
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default();
        self.non_word.replace_all(head, "").to_ascii_uppercase()
    }
}

/// One-off normalization. Prefer a shared [`KeyNormalizer`] in loops.
pub fn normalize_key(raw: Option<&str>) -> String {
    KeyNormalizer::new().normalize(raw)
}
