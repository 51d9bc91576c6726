//! Keyword-based security classifier for pull request text.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::Result;

/// Case-insensitive literal-substring matcher over a keyword vocabulary.
///
/// Keywords are escaped before being joined into one alternation, so regex
/// metacharacters in the vocabulary match themselves. There is no word
/// boundary: `"race"` fires inside `"trace"`.
#[derive(Debug, Clone)]
pub struct SecurityMatcher {
    pattern: Option<Regex>,
    keyword_count: usize,
}

impl SecurityMatcher {
    /// Compile `keywords` into a single matcher. An empty vocabulary never fires.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let escaped: Vec<String> = keywords
            .into_iter()
            .map(|k| regex::escape(k.as_ref()))
            .collect();
        let keyword_count = escaped.len();

        let pattern = if escaped.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&escaped.join("|"))
                    .case_insensitive(true)
                    .build()?,
            )
        };
        debug!(keywords = keyword_count, "Built security keyword matcher");

        Ok(Self {
            pattern,
            keyword_count,
        })
    }

    pub fn keyword_count(&self) -> usize {
        self.keyword_count
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// 1 if any keyword occurs in `title + " " + body`, else 0. Missing
    /// values count as empty strings.
    pub fn classify(&self, title: Option<&str>, body: Option<&str>) -> u8 {
        let combined = format!("{} {}", title.unwrap_or(""), body.unwrap_or(""));
        u8::from(self.is_match(&combined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_SECURITY_KEYWORDS;

    fn default_matcher() -> SecurityMatcher {
        SecurityMatcher::new(DEFAULT_SECURITY_KEYWORDS).unwrap()
    }

    #[test]
    fn test_classify_examples() {
        let m = default_matcher();
        assert_eq!(m.classify(Some("SQL Injection bug"), Some("")), 1);
        assert_eq!(m.classify(Some("fix typo"), Some("")), 0);
        assert_eq!(m.classify(Some("Fixes a RACE condition"), None), 1);
    }

    #[test]
    fn test_body_only_and_both_missing() {
        let m = default_matcher();
        assert_eq!(m.classify(None, Some("prevents a Buffer Overflow")), 1);
        assert_eq!(m.classify(None, None), 0);
    }

    #[test]
    fn test_substring_without_word_boundary() {
        let m = default_matcher();
        // "css" inside a stylesheet name, "race" inside "trace"
        assert_eq!(m.classify(Some("tweak main.css"), None), 1);
        assert_eq!(m.classify(Some("add Trace spans"), None), 1);
    }

    #[test]
    fn test_phrase_can_span_title_and_body() {
        let m = SecurityMatcher::new(["gain access"]).unwrap();
        assert_eq!(m.classify(Some("gain"), Some("access")), 1);
        assert_eq!(m.classify(Some("gain"), None), 0);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let m = SecurityMatcher::new(["c++", "a.b", "(x)"]).unwrap();
        assert_eq!(m.classify(Some("bump C++ toolchain"), None), 1);
        assert_eq!(m.classify(Some("axb"), None), 0);
        assert_eq!(m.classify(Some("a.b"), None), 1);
        assert_eq!(m.classify(Some("call (X) now"), None), 1);
        assert_eq!(m.classify(Some("x"), None), 0);
    }

    #[test]
    fn test_empty_vocabulary_never_fires() {
        let m = SecurityMatcher::new(Vec::<String>::new()).unwrap();
        assert_eq!(m.keyword_count(), 0);
        assert_eq!(m.classify(Some("security exploit"), Some("xss")), 0);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let m = default_matcher();
        let first = m.classify(Some("Harden auth"), Some("closes a backdoor"));
        for _ in 0..5 {
            assert_eq!(m.classify(Some("Harden auth"), Some("closes a backdoor")), first);
        }
        assert_eq!(first, 1);
    }
}
