//! # Emoji Names
//!
//! Discord custom emoji names must be 2-32 characters of ASCII letters, digits
//! and underscores. Names the user types are validated; names derived from a
//! prompt or a file name are sanitized into shape instead.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_LEN: usize = 2;
pub const MAX_LEN: usize = 32;
pub const FALLBACK_NAME: &str = "custom_emoji";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmojiNameError {
    #[error("emoji names need at least {MIN_LEN} characters")]
    TooShort,
    #[error("emoji names can be at most {MAX_LEN} characters")]
    TooLong,
    #[error("emoji names can only use letters, numbers and underscores (found '{0}')")]
    InvalidCharacter(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmojiName(String);

fn disallowed() -> &'static Regex {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9_]").expect("static regex"))
}

impl EmojiName {
    /// Strict check for a name typed by the user.
    pub fn parse(raw: &str) -> Result<Self, EmojiNameError> {
        let name = raw.trim();

        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(EmojiNameError::InvalidCharacter(bad));
        }
        if name.len() < MIN_LEN {
            return Err(EmojiNameError::TooShort);
        }
        if name.len() > MAX_LEN {
            return Err(EmojiNameError::TooLong);
        }

        Ok(EmojiName(name.to_string()))
    }

    /// Coerces arbitrary text into a valid name, falling back to `custom_emoji`.
    pub fn sanitize(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let cleaned = disallowed().replace_all(&lowered, "");
        let mut name = cleaned.trim_matches('_').to_string();

        if name.len() < MIN_LEN {
            return EmojiName(FALLBACK_NAME.to_string());
        }
        if name.len() > MAX_LEN {
            // Only ASCII survives the regex, so byte truncation is safe.
            name.truncate(MAX_LEN);
            name = name.trim_end_matches('_').to_string();
        }

        EmojiName(name)
    }

    /// Derives a name from the first word of a prompt.
    pub fn from_prompt(prompt: &str) -> Self {
        let first_word = prompt.split_whitespace().next().unwrap_or("emoji");
        Self::sanitize(first_word)
    }

    /// Appends `_1`, `_2`, ... until the name no longer collides, keeping it within 32 characters.
    pub fn unique_among(&self, existing: &HashSet<String>) -> Self {
        if !existing.contains(&self.0) {
            return self.clone();
        }

        let mut counter: u32 = 1;
        loop {
            let suffix = format!("_{}", counter);
            let mut stem = self.0.clone();
            stem.truncate(MAX_LEN - suffix.len());
            let candidate = format!("{}{}", stem.trim_end_matches('_'), suffix);

            if !existing.contains(&candidate) {
                return EmojiName(candidate);
            }
            counter += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmojiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(name: &EmojiName) {
        let s = name.as_str();
        assert!(s.len() >= MIN_LEN && s.len() <= MAX_LEN, "bad length: {}", s);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(EmojiName::parse(s).is_ok());
    }

    #[test]
    fn test_sanitize_cases() {
        let cases = [
            ("hello world", "helloworld"),
            ("test@emoji#name!", "testemojiname"),
            ("_underscore_", "underscore"),
            ("123numbers", "123numbers"),
            ("", "custom_emoji"),
            ("x", "custom_emoji"),
            ("special-chars!@#", "specialchars"),
            ("CamelCase", "camelcase"),
            ("héllo", "hllo"),
        ];

        for (input, expected) in cases {
            let name = EmojiName::sanitize(input);
            assert_eq!(name.as_str(), expected, "input: {:?}", input);
            assert_valid(&name);
        }
    }

    #[test]
    fn test_sanitize_truncates_long_names() {
        let name = EmojiName::sanitize(&"a".repeat(50));
        assert_eq!(name.as_str(), "a".repeat(32));

        // Truncation landing on an underscore trims it.
        let long = format!("{}_{}", "b".repeat(31), "c".repeat(10));
        let name = EmojiName::sanitize(&long);
        assert_eq!(name.as_str(), "b".repeat(31));
        assert_valid(&name);
    }

    #[test]
    fn test_from_prompt_uses_first_word() {
        assert_eq!(EmojiName::from_prompt("Cat wearing a hat").as_str(), "cat");
        assert_eq!(EmojiName::from_prompt("   ").as_str(), "emoji");
        assert_eq!(EmojiName::from_prompt("!! dancing").as_str(), "custom_emoji");
    }

    #[test]
    fn test_parse_rejects_invalid_names() {
        assert_eq!(EmojiName::parse("a"), Err(EmojiNameError::TooShort));
        assert_eq!(EmojiName::parse(&"a".repeat(33)), Err(EmojiNameError::TooLong));
        assert_eq!(
            EmojiName::parse("party-cat"),
            Err(EmojiNameError::InvalidCharacter('-'))
        );
        assert_eq!(
            EmojiName::parse("party cat"),
            Err(EmojiNameError::InvalidCharacter(' '))
        );
        assert!(EmojiName::parse("émoji").is_err());
    }

    #[test]
    fn test_parse_accepts_valid_names() {
        assert_eq!(EmojiName::parse(" Party_Cat2 ").unwrap().as_str(), "Party_Cat2");
        assert!(EmojiName::parse("ok").is_ok());
        assert!(EmojiName::parse(&"z".repeat(32)).is_ok());
    }

    #[test]
    fn test_unique_among_appends_counter() {
        let existing: HashSet<String> = ["cat", "cat_1"].iter().map(|s| s.to_string()).collect();

        let name = EmojiName::sanitize("cat").unique_among(&existing);
        assert_eq!(name.as_str(), "cat_2");

        let free = EmojiName::sanitize("dog").unique_among(&existing);
        assert_eq!(free.as_str(), "dog");
    }

    #[test]
    fn test_unique_among_stays_within_limit() {
        let base = "a".repeat(32);
        let existing: HashSet<String> = [base.clone(), format!("{}_1", "a".repeat(30))]
            .into_iter()
            .collect();

        let name = EmojiName::sanitize(&base).unique_among(&existing);
        assert_eq!(name.as_str(), format!("{}_2", "a".repeat(30)));
        assert_valid(&name);
    }
}
