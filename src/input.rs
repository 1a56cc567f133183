//! Input parsing for policy queries read from stdin.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::KeywordsValue;

/// Errors that can occur when parsing a query.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid keywords: {0}")]
    InvalidKeywords(String),
}

/// Which question is being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    IsWhitelisted,
    IsBlacklisted,
    ShouldBanUserName,
    Evaluate,
    Groups,
    Classify,
    Lists,
}

/// A single query, e.g. `{"query":"evaluate","value":"1.2.3.4","user_name":"root"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Query {
    /// The question to answer.
    pub query: QueryKind,

    /// Address, host or user name under test.
    #[serde(default)]
    pub value: Option<String>,

    /// User name from the failed login (for `evaluate`).
    #[serde(default)]
    pub user_name: Option<String>,

    /// Keyword bitmask (for `groups` and `classify`).
    #[serde(default)]
    pub keywords: Option<KeywordsValue>,

    /// Log text (for `classify`).
    #[serde(default)]
    pub text: Option<String>,

    /// Directory to look for a project config in.
    #[serde(default)]
    pub cwd: Option<String>,
}

impl Query {
    /// Parse from JSON string.
    pub fn parse(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The value, treating a missing one as empty.
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn value(&self) -> Result<&str, InputError> {
        self.value.as_deref().ok_or(InputError::MissingField("value"))
    }

    pub fn text(&self) -> Result<&str, InputError> {
        self.text.as_deref().ok_or(InputError::MissingField("text"))
    }

    pub fn keywords(&self) -> Result<u64, InputError> {
        let keywords = self
            .keywords
            .as_ref()
            .ok_or(InputError::MissingField("keywords"))?;
        keywords.to_bits().ok_or_else(|| {
            InputError::InvalidKeywords(match keywords {
                KeywordsValue::Number(n) => n.to_string(),
                KeywordsValue::Text(s) => s.clone(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate() {
        let q = Query::parse(r#"{"query":"evaluate","value":"1.2.3.4","user_name":"root"}"#)
            .unwrap();
        assert_eq!(q.query, QueryKind::Evaluate);
        assert_eq!(q.value().unwrap(), "1.2.3.4");
        assert_eq!(q.user_name.as_deref(), Some("root"));
    }

    #[test]
    fn test_parse_keywords() {
        let q = Query::parse(r#"{"query":"groups","keywords":"0x2a"}"#).unwrap();
        assert_eq!(q.keywords().unwrap(), 42);
        let q = Query::parse(r#"{"query":"groups","keywords":42}"#).unwrap();
        assert_eq!(q.keywords().unwrap(), 42);
    }

    #[test]
    fn test_bad_keywords() {
        let q = Query::parse(r#"{"query":"groups","keywords":"forty-two"}"#).unwrap();
        assert!(matches!(q.keywords(), Err(InputError::InvalidKeywords(_))));
    }

    #[test]
    fn test_missing_fields() {
        let q = Query::parse(r#"{"query":"classify"}"#).unwrap();
        assert!(matches!(q.text(), Err(InputError::MissingField("text"))));
        assert!(matches!(q.keywords(), Err(InputError::MissingField("keywords"))));
        assert_eq!(q.value_or_empty(), "");
    }

    #[test]
    fn test_unknown_query() {
        assert!(Query::parse(r#"{"query":"unban","value":"1.2.3.4"}"#).is_err());
    }
}
