//! Keyword-tagged expression groups used to recognise log events.

use regex::{Regex, RegexBuilder};

/// Compile a pattern case-insensitively, with `.` matching line terminators.
pub(crate) fn build_regex(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

/// Parse a keyword bitmask written as decimal or `0x`-prefixed hex.
pub fn parse_keywords(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// A single pattern that a log line must match.
#[derive(Debug, Clone)]
pub struct ExpressionToBlock {
    regex: String,
    xpath: Option<String>,
    matcher: Regex,
}

impl ExpressionToBlock {
    /// Compile `regex`. The matcher depends on nothing but this text.
    pub fn new(regex: &str) -> Result<Self, regex::Error> {
        let regex = regex.trim().to_string();
        let matcher = build_regex(&regex)?;
        Ok(Self {
            regex,
            xpath: None,
            matcher,
        })
    }

    /// Attach the selector naming which part of a structured event this applies to.
    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = Some(xpath.into());
        self
    }

    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub fn xpath(&self) -> Option<&str> {
        self.xpath.as_deref()
    }

    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// A named bundle of expressions selected by keyword bitmask.
#[derive(Debug, Clone)]
pub struct ExpressionGroup {
    name: String,
    keywords: u64,
    source: Option<String>,
    path: Option<String>,
    expressions: Vec<ExpressionToBlock>,
}

impl ExpressionGroup {
    pub fn new(name: impl Into<String>, keywords: u64, expressions: Vec<ExpressionToBlock>) -> Self {
        Self {
            name: name.into(),
            keywords,
            source: None,
            path: None,
            expressions,
        }
    }

    /// Set the event source label (e.g. "SSH", "RDP").
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the log name or file the group applies to.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> u64 {
        self.keywords
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn expressions(&self) -> &[ExpressionToBlock] {
        &self.expressions
    }

    /// True when the group has expressions and every one of them matches `text`.
    pub fn is_match(&self, text: &str) -> bool {
        !self.expressions.is_empty() && self.expressions.iter().all(|e| e.is_match(text))
    }
}

/// Groups whose bitmask equals `keywords` exactly, in declaration order.
///
/// The iterator is lazy and `Clone`, so it can be restarted.
pub fn groups_matching_keywords(
    groups: &[ExpressionGroup],
    keywords: u64,
) -> impl Iterator<Item = &ExpressionGroup> + Clone {
    groups.iter().filter(move |g| g.keywords == keywords)
}
