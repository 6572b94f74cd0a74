//! Key-name classification.
//!
//! Each category holds an optional list of regular expressions. An unset
//! `secret_keys` list matches every key (unconfigured means redact
//! everything); every other unset category matches nothing.

use regex::Regex;

use crate::error::{ConfigurationError, PatternCategory};

/// A key pattern as supplied in configuration: either regex source or an
/// already compiled expression.
#[derive(Clone, Debug)]
pub enum KeyPattern {
    Source(String),
    Compiled(Regex),
}

impl KeyPattern {
    fn compile(self, category: PatternCategory) -> Result<Regex, ConfigurationError> {
        match self {
            KeyPattern::Compiled(regex) => Ok(regex),
            KeyPattern::Source(source) => {
                Regex::new(&source).map_err(|source_err| ConfigurationError::InvalidPattern {
                    category,
                    pattern: source,
                    source: source_err,
                })
            }
        }
    }
}

impl From<&str> for KeyPattern {
    fn from(source: &str) -> Self {
        Self::Source(source.to_string())
    }
}

impl From<String> for KeyPattern {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<Regex> for KeyPattern {
    fn from(regex: Regex) -> Self {
        Self::Compiled(regex)
    }
}

/// Compiled regex list for one category. `None` means "never configured".
#[derive(Clone, Debug, Default)]
struct PatternList(Option<Vec<Regex>>);

impl PatternList {
    fn compile(
        patterns: Option<Vec<KeyPattern>>,
        category: PatternCategory,
    ) -> Result<Self, ConfigurationError> {
        patterns
            .map(|patterns| {
                patterns
                    .into_iter()
                    .map(|pattern| pattern.compile(category))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map(Self)
    }

    fn any_match(&self, key: &str) -> Option<bool> {
        self.0
            .as_ref()
            .map(|patterns| patterns.iter().any(|pattern| pattern.is_match(key)))
    }

    fn len(&self) -> usize {
        self.0.as_ref().map_or(0, Vec::len)
    }
}

/// Uncompiled pattern lists, one per category.
#[derive(Clone, Debug, Default)]
pub struct KeyRules {
    pub secret_keys: Option<Vec<KeyPattern>>,
    pub deep_secret_keys: Option<Vec<KeyPattern>>,
    pub full_secret_keys: Option<Vec<KeyPattern>>,
    pub ignored_keys: Option<Vec<KeyPattern>>,
    pub delete_secret_keys: Option<Vec<KeyPattern>>,
}

/// Classifies key names. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct PatternMatcher {
    secret: PatternList,
    deep_secret: PatternList,
    full_secret: PatternList,
    ignored: PatternList,
    delete: PatternList,
}

impl PatternMatcher {
    pub fn new(rules: KeyRules) -> Result<Self, ConfigurationError> {
        Ok(Self {
            secret: PatternList::compile(rules.secret_keys, PatternCategory::Secret)?,
            deep_secret: PatternList::compile(rules.deep_secret_keys, PatternCategory::DeepSecret)?,
            full_secret: PatternList::compile(rules.full_secret_keys, PatternCategory::FullSecret)?,
            ignored: PatternList::compile(rules.ignored_keys, PatternCategory::Ignored)?,
            delete: PatternList::compile(rules.delete_secret_keys, PatternCategory::Delete)?,
        })
    }

    /// Whether the direct value under `key` is secret.
    ///
    /// `None` is the document root. It only counts as secret while the list
    /// is unconfigured.
    pub fn is_secret_key(&self, key: Option<&str>) -> bool {
        match key {
            Some(key) => self.secret.any_match(key).unwrap_or(true),
            None => self.secret.0.is_none(),
        }
    }

    pub fn is_deep_secret_key(&self, key: &str) -> bool {
        self.deep_secret.any_match(key).unwrap_or(false)
    }

    pub fn is_full_redaction_key(&self, key: &str) -> bool {
        self.full_secret.any_match(key).unwrap_or(false)
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored.any_match(key).unwrap_or(false)
    }

    pub fn is_delete_key(&self, key: &str) -> bool {
        self.delete.any_match(key).unwrap_or(false)
    }

    /// Final leaf decision: ignored keys win over ancestor secrecy and over
    /// secret patterns.
    pub fn should_redact(&self, key: Option<&str>, secret: bool) -> bool {
        if key.is_some_and(|key| self.is_ignored(key)) {
            return false;
        }
        secret || self.is_secret_key(key)
    }

    pub(crate) fn pattern_count(&self) -> usize {
        self.secret.len()
            + self.deep_secret.len()
            + self.full_secret.len()
            + self.ignored.len()
            + self.delete.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(sources: &[&str]) -> Option<Vec<KeyPattern>> {
        Some(sources.iter().map(|&source| KeyPattern::from(source)).collect())
    }

    #[test]
    fn unconfigured_secret_keys_match_everything() {
        let matcher = PatternMatcher::default();
        assert!(matcher.is_secret_key(Some("anything")));
        assert!(matcher.is_secret_key(None));
        assert!(!matcher.is_deep_secret_key("anything"));
        assert!(!matcher.is_full_redaction_key("anything"));
        assert!(!matcher.is_ignored("anything"));
        assert!(!matcher.is_delete_key("anything"));
    }

    #[test]
    fn configured_secret_keys_use_any_match() {
        let matcher = PatternMatcher::new(KeyRules {
            secret_keys: patterns(&["password", "^token$"]),
            ..KeyRules::default()
        })
        .unwrap();
        assert!(matcher.is_secret_key(Some("db_password")));
        assert!(matcher.is_secret_key(Some("token")));
        assert!(!matcher.is_secret_key(Some("tokens")));
        assert!(!matcher.is_secret_key(None));
    }

    #[test]
    fn empty_list_matches_nothing() {
        let matcher = PatternMatcher::new(KeyRules {
            secret_keys: Some(Vec::new()),
            ..KeyRules::default()
        })
        .unwrap();
        assert!(!matcher.is_secret_key(Some("password")));
    }

    #[test]
    fn ignore_wins_over_secret_and_ancestor() {
        let matcher = PatternMatcher::new(KeyRules {
            secret_keys: patterns(&["id"]),
            ignored_keys: patterns(&["^request_id$"]),
            ..KeyRules::default()
        })
        .unwrap();
        assert!(matcher.should_redact(Some("user_id"), false));
        assert!(!matcher.should_redact(Some("request_id"), false));
        assert!(!matcher.should_redact(Some("request_id"), true));
        assert!(matcher.should_redact(Some("name"), true));
    }

    #[test]
    fn precompiled_patterns_are_accepted() {
        let matcher = PatternMatcher::new(KeyRules {
            deep_secret_keys: Some(vec![Regex::new("(?i)^credentials$").unwrap().into()]),
            ..KeyRules::default()
        })
        .unwrap();
        assert!(matcher.is_deep_secret_key("Credentials"));
    }

    #[test]
    fn invalid_pattern_names_its_category() {
        let err = PatternMatcher::new(KeyRules {
            full_secret_keys: patterns(&["(unclosed"]),
            ..KeyRules::default()
        })
        .unwrap_err();
        match err {
            ConfigurationError::InvalidPattern {
                category, pattern, ..
            } => {
                assert_eq!(category, PatternCategory::FullSecret);
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
