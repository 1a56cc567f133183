//! Immutable policy built once from configuration.

use tracing::info;

use crate::config::{Config, ConfigError};
use crate::expression::{self, ExpressionGroup};
use crate::sets::{IdentifierSet, Resolver, UserNameAllowSet};

/// Whitelist, blacklist, allowed user names and expression groups.
///
/// Read-only once built; a reload builds a new store rather than mutating this one.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    whitelist: IdentifierSet,
    blacklist: IdentifierSet,
    allowed_user_names: UserNameAllowSet,
    groups: Vec<ExpressionGroup>,
}

impl PolicyStore {
    pub fn new(
        whitelist: IdentifierSet,
        blacklist: IdentifierSet,
        allowed_user_names: UserNameAllowSet,
        groups: Vec<ExpressionGroup>,
    ) -> Self {
        Self {
            whitelist,
            blacklist,
            allowed_user_names,
            groups,
        }
    }

    /// Build every set and compile every expression.
    ///
    /// Address data never fails the load; a bad expression or keyword does.
    pub fn from_config(config: &Config, resolver: &dyn Resolver) -> Result<Self, ConfigError> {
        let groups = config
            .expression_groups
            .iter()
            .map(|g| g.compile())
            .collect::<Result<Vec<_>, _>>()?;

        let whitelist = IdentifierSet::build(&config.whitelist, &config.whitelist_regex, resolver);
        let blacklist = IdentifierSet::build(&config.blacklist, &config.blacklist_regex, resolver);
        let allowed_user_names = UserNameAllowSet::build(&config.allowed_user_names);

        info!(
            whitelist = whitelist.len(),
            blacklist = blacklist.len(),
            allowed_user_names = allowed_user_names.len(),
            groups = groups.len(),
            "policy loaded"
        );

        Ok(Self::new(whitelist, blacklist, allowed_user_names, groups))
    }

    pub fn whitelist(&self) -> &IdentifierSet {
        &self.whitelist
    }

    pub fn blacklist(&self) -> &IdentifierSet {
        &self.blacklist
    }

    pub fn allowed_user_names(&self) -> &UserNameAllowSet {
        &self.allowed_user_names
    }

    pub fn groups(&self) -> &[ExpressionGroup] {
        &self.groups
    }

    /// Groups whose keyword bitmask equals `keywords`, in configuration order.
    pub fn groups_matching_keywords(
        &self,
        keywords: u64,
    ) -> impl Iterator<Item = &ExpressionGroup> + Clone {
        expression::groups_matching_keywords(&self.groups, keywords)
    }

    /// First group selected by `keywords` whose expressions all match `text`.
    pub fn classify(&self, keywords: u64, text: &str) -> Option<&ExpressionGroup> {
        self.groups_matching_keywords(keywords)
            .find(|g| g.is_match(text))
    }

    /// Resolved whitelist joined with `,`.
    pub fn whitelist_joined(&self) -> String {
        self.whitelist.joined()
    }

    /// Resolved blacklist joined with `,`.
    pub fn blacklist_joined(&self) -> String {
        self.blacklist.joined()
    }

    /// Allowed user names joined with `,`.
    pub fn allowed_user_names_joined(&self) -> String {
        self.allowed_user_names.joined()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExpressionConfig, ExpressionGroupConfig, KeywordsValue};
    use crate::sets::NoopResolver;

    fn group_config(name: &str, keywords: u64, regex: &[&str]) -> ExpressionGroupConfig {
        ExpressionGroupConfig {
            name: name.to_string(),
            source: None,
            path: None,
            keywords: KeywordsValue::Number(keywords),
            expressions: regex
                .iter()
                .map(|r| ExpressionConfig {
                    regex: r.to_string(),
                    xpath: None,
                })
                .collect(),
        }
    }

    fn test_store() -> PolicyStore {
        let config = Config {
            whitelist: "127.0.0.1, 10.0.0.1".to_string(),
            blacklist: "203.0.113.9".to_string(),
            allowed_user_names: "bob,alice".to_string(),
            expression_groups: vec![
                group_config("ssh", 42, &["failed password", r"from \S+"]),
                group_config("rdp", 7, &["logon failure"]),
                group_config("ssh-invalid", 42, &["invalid user"]),
            ],
            ..Default::default()
        };
        PolicyStore::from_config(&config, &NoopResolver).unwrap()
    }

    #[test]
    fn test_diagnostic_accessors() {
        let store = test_store();
        assert_eq!(store.whitelist_joined(), "10.0.0.1,127.0.0.1");
        assert_eq!(store.blacklist_joined(), "203.0.113.9");
        assert_eq!(store.allowed_user_names_joined(), "alice,bob");
    }

    #[test]
    fn test_groups_matching_keywords() {
        let store = test_store();
        let names: Vec<_> = store.groups_matching_keywords(42).map(|g| g.name()).collect();
        assert_eq!(names, vec!["ssh", "ssh-invalid"]);
        assert_eq!(store.groups_matching_keywords(99).count(), 0);
    }

    #[test]
    fn test_classify() {
        let store = test_store();
        let hit = store.classify(42, "Failed password for root from 10.1.1.1");
        assert_eq!(hit.map(|g| g.name()), Some("ssh"));
        let hit = store.classify(42, "Invalid user admin");
        assert_eq!(hit.map(|g| g.name()), Some("ssh-invalid"));
        assert!(store.classify(7, "Failed password for root from 10.1.1.1").is_none());
    }

    #[test]
    fn test_fatal_expression_names_group() {
        let config = Config {
            expression_groups: vec![group_config("ok", 1, &["x"]), group_config("bad", 1, &["("])],
            ..Default::default()
        };
        let err = PolicyStore::from_config(&config, &NoopResolver).unwrap_err();
        assert!(err.to_string().contains("'bad'"));
    }
}
