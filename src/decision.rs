//! Verdict types for access decisions.

use serde::Serialize;

/// The outcome of evaluating an identifier against the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// No policy applies; the ban state machine decides.
    Allow,
    /// Explicitly trusted, never ban.
    Whitelisted,
    /// Ban immediately.
    Ban(BanInfo),
}

/// Information about why an identifier should be banned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BanInfo {
    /// The rule that triggered the ban.
    pub rule: String,
    /// Human-readable reason.
    pub reason: String,
    /// Optional details (e.g., matched value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl BanInfo {
    pub fn new(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            reason: reason.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Verdict {
    pub fn allow() -> Self {
        Verdict::Allow
    }

    pub fn ban(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Verdict::Ban(BanInfo::new(rule, reason))
    }

    pub fn is_banned(&self) -> bool {
        matches!(self, Verdict::Ban(_))
    }

    pub fn is_whitelisted(&self) -> bool {
        matches!(self, Verdict::Whitelisted)
    }

    /// Get the ban info if banned.
    pub fn ban_info(&self) -> Option<&BanInfo> {
        match self {
            Verdict::Ban(info) => Some(info),
            Verdict::Allow | Verdict::Whitelisted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow() {
        let v = Verdict::allow();
        assert!(!v.is_banned());
        assert!(v.ban_info().is_none());
    }

    #[test]
    fn test_ban() {
        let v = Verdict::ban("blacklist.literal", "listed");
        assert!(v.is_banned());
        let info = v.ban_info().unwrap();
        assert_eq!(info.rule, "blacklist.literal");
        assert_eq!(info.reason, "listed");
    }

    #[test]
    fn test_serialize() {
        let v = Verdict::Ban(BanInfo::new("rule", "reason").with_details("1.2.3.4"));
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"verdict\":\"ban\""));
        assert!(json.contains("\"details\":\"1.2.3.4\""));

        let json = serde_json::to_string(&Verdict::Whitelisted).unwrap();
        assert_eq!(json, r#"{"verdict":"whitelisted"}"#);
    }
}
