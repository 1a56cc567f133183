//! Configuration loading and merging.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::expression::{ExpressionGroup, ExpressionToBlock, parse_keywords};
use crate::policy::PolicyStore;
use crate::sets::{NoopResolver, Resolver, SystemResolver};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid regex in expression group '{group}' ('{pattern}'): {source}")]
    Expression {
        group: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid keywords '{value}' in expression group '{group}'")]
    Keywords { group: String, value: String },
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comma-separated IPs or host names that are never banned.
    pub whitelist: String,

    /// Wildcard pattern for the whitelist; `*` matches hex digits.
    pub whitelist_regex: String,

    /// Comma-separated IPs, host names or user names that are always banned.
    pub blacklist: String,

    /// Wildcard pattern for the blacklist.
    pub blacklist_regex: String,

    /// Comma-separated user names allowed to fail a login. Empty disables the check.
    pub allowed_user_names: String,

    /// Expand IP entries through name resolution at load time.
    pub resolve_dns: bool,

    /// Log classification groups, in priority order.
    pub expression_groups: Vec<ExpressionGroupConfig>,

    /// Audit logging settings.
    pub audit: AuditConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            whitelist: String::new(),
            whitelist_regex: String::new(),
            blacklist: String::new(),
            blacklist_regex: String::new(),
            allowed_user_names: String::new(),
            resolve_dns: true,
            expression_groups: vec![],
            audit: AuditConfig::default(),
        }
    }
}

/// A keyword bitmask as written in TOML: an integer or a decimal/hex string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeywordsValue {
    Number(u64),
    Text(String),
}

impl Default for KeywordsValue {
    fn default() -> Self {
        KeywordsValue::Number(0)
    }
}

impl KeywordsValue {
    pub fn to_bits(&self) -> Option<u64> {
        match self {
            KeywordsValue::Number(n) => Some(*n),
            KeywordsValue::Text(s) => parse_keywords(s),
        }
    }
}

/// One expression group as configured.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionGroupConfig {
    /// Group name for logging and diagnostics.
    pub name: String,
    /// Event source label (e.g. "SSH").
    #[serde(default)]
    pub source: Option<String>,
    /// Log name or file the group applies to.
    #[serde(default)]
    pub path: Option<String>,
    /// Keyword bitmask used to select this group.
    #[serde(default)]
    pub keywords: KeywordsValue,
    /// Patterns that must all match.
    #[serde(default)]
    pub expressions: Vec<ExpressionConfig>,
}

/// One expression as configured.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionConfig {
    /// Regex applied to the log text.
    pub regex: String,
    /// Optional selector into structured events.
    #[serde(default)]
    pub xpath: Option<String>,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Enable audit logging.
    pub enabled: bool,
    /// Path to audit log file.
    pub path: Option<String>,
}

impl ExpressionGroupConfig {
    /// Compile every expression. Any bad pattern fails the whole load.
    pub fn compile(&self) -> Result<ExpressionGroup, ConfigError> {
        let keywords = self.keywords.to_bits().ok_or_else(|| ConfigError::Keywords {
            group: self.name.clone(),
            value: match &self.keywords {
                KeywordsValue::Number(n) => n.to_string(),
                KeywordsValue::Text(s) => s.clone(),
            },
        })?;

        let expressions = self
            .expressions
            .iter()
            .map(|e| {
                let expr = ExpressionToBlock::new(&e.regex).map_err(|source| {
                    ConfigError::Expression {
                        group: self.name.clone(),
                        pattern: e.regex.clone(),
                        source,
                    }
                })?;
                Ok(match &e.xpath {
                    Some(xpath) => expr.with_xpath(xpath),
                    None => expr,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut group = ExpressionGroup::new(&self.name, keywords, expressions);
        if let Some(source) = &self.source {
            group = group.with_source(source);
        }
        if let Some(path) = &self.path {
            group = group.with_path(path);
        }
        Ok(group)
    }
}

impl Config {
    /// Load configuration, merging user and project configs.
    pub fn load(cwd: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config()? {
            config = user_config;
        }

        if let Some(cwd) = cwd {
            if let Some(project_config) = Self::load_project_config(cwd)? {
                config.merge(project_config);
            }
        }

        Ok(config)
    }

    /// Parse a TOML document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn load_user_config() -> Result<Option<Self>, ConfigError> {
        let path = Self::user_config_path();
        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                return Ok(Some(Self::parse(&content)?));
            }
        }
        Ok(None)
    }

    /// Load project-level config from ipban-policy.toml
    fn load_project_config(cwd: &Path) -> Result<Option<Self>, ConfigError> {
        let path = cwd.join("ipban-policy.toml");
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            return Ok(Some(Self::parse(&content)?));
        }
        Ok(None)
    }

    /// Get user config path.
    /// Respects IPBAN_POLICY_CONFIG env var for testing.
    fn user_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("IPBAN_POLICY_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("ipban/policy.toml"))
    }

    /// Merge another config into this one (other takes precedence for scalars).
    fn merge(&mut self, other: Config) {
        // Extend lists
        join_list(&mut self.whitelist, &other.whitelist);
        join_list(&mut self.blacklist, &other.blacklist);
        join_list(&mut self.allowed_user_names, &other.allowed_user_names);
        self.expression_groups.extend(other.expression_groups);

        // Override patterns and scalars if set in project config
        if !other.whitelist_regex.trim().is_empty() {
            self.whitelist_regex = other.whitelist_regex;
        }
        if !other.blacklist_regex.trim().is_empty() {
            self.blacklist_regex = other.blacklist_regex;
        }
        if !other.resolve_dns {
            self.resolve_dns = false;
        }
        if other.audit.enabled {
            self.audit.enabled = true;
            if other.audit.path.is_some() {
                self.audit.path = other.audit.path;
            }
        }
    }

    /// Build the policy store, resolving addresses unless `resolve_dns` is off.
    pub fn compile(&self) -> Result<PolicyStore, ConfigError> {
        if self.resolve_dns {
            self.compile_with(&SystemResolver)
        } else {
            self.compile_with(&NoopResolver)
        }
    }

    /// Build the policy store with an explicit resolver.
    pub fn compile_with(&self, resolver: &dyn Resolver) -> Result<PolicyStore, ConfigError> {
        PolicyStore::from_config(self, resolver)
    }
}

fn join_list(list: &mut String, extra: &str) {
    let extra = extra.trim();
    if extra.is_empty() {
        return;
    }
    if list.trim().is_empty() {
        *list = extra.to_string();
    } else {
        list.push(',');
        list.push_str(extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.whitelist.is_empty());
        assert!(config.resolve_dns);
        assert!(config.expression_groups.is_empty());
        assert!(!config.audit.enabled);
    }

    #[test]
    fn test_parse_config() {
        let config = Config::parse(
            r#"
whitelist = "127.0.0.1, 10.0.0.1"
whitelist_regex = "192.168.*.*"
blacklist = "203.0.113.9"
allowed_user_names = "alice"
resolve_dns = false

[[expression_groups]]
name = "ssh"
source = "SSH"
keywords = "0x8010000000000000"
path = "/var/log/auth.log"

[[expression_groups.expressions]]
regex = 'Failed password'

[[expression_groups]]
name = "numeric"
keywords = 42
"#,
        )
        .unwrap();
        assert_eq!(config.whitelist, "127.0.0.1, 10.0.0.1");
        assert!(!config.resolve_dns);
        assert_eq!(config.expression_groups.len(), 2);
        assert_eq!(
            config.expression_groups[0].keywords.to_bits(),
            Some(0x8010_0000_0000_0000)
        );
        assert_eq!(config.expression_groups[1].keywords.to_bits(), Some(42));
    }

    #[test]
    fn test_compile_config() {
        let config = Config {
            whitelist: "10.0.0.1".to_string(),
            resolve_dns: false,
            expression_groups: vec![ExpressionGroupConfig {
                name: "ssh".to_string(),
                source: Some("SSH".to_string()),
                path: None,
                keywords: KeywordsValue::Number(1),
                expressions: vec![ExpressionConfig {
                    regex: "failed password".to_string(),
                    xpath: None,
                }],
            }],
            ..Default::default()
        };
        let store = config.compile().unwrap();
        assert!(store.whitelist().contains("10.0.0.1"));
        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].source(), Some("SSH"));
    }

    #[test]
    fn test_invalid_expression_is_fatal() {
        let config = Config {
            resolve_dns: false,
            expression_groups: vec![ExpressionGroupConfig {
                name: "broken".to_string(),
                source: None,
                path: None,
                keywords: KeywordsValue::Number(1),
                expressions: vec![ExpressionConfig {
                    regex: "[invalid".to_string(),
                    xpath: None,
                }],
            }],
            ..Default::default()
        };
        let err = config.compile().unwrap_err();
        assert!(matches!(err, ConfigError::Expression { ref group, .. } if group == "broken"));
        assert!(err.to_string().contains("[invalid"));
    }

    #[test]
    fn test_invalid_keywords_is_fatal() {
        let config = Config {
            resolve_dns: false,
            expression_groups: vec![ExpressionGroupConfig {
                name: "odd".to_string(),
                source: None,
                path: None,
                keywords: KeywordsValue::Text("0xnope".to_string()),
                expressions: vec![],
            }],
            ..Default::default()
        };
        assert!(matches!(
            config.compile(),
            Err(ConfigError::Keywords { .. })
        ));
    }

    #[test]
    fn test_invalid_wildcard_is_not_fatal() {
        let config = Config {
            whitelist: "10.0.0.1".to_string(),
            whitelist_regex: "(".to_string(),
            resolve_dns: false,
            ..Default::default()
        };
        let store = config.compile().unwrap();
        assert!(store.whitelist().matcher().is_none());
        assert!(store.whitelist().contains("10.0.0.1"));
    }

    #[test]
    fn test_merge() {
        let mut base = Config {
            whitelist: "10.0.0.1".to_string(),
            whitelist_regex: "10.*".to_string(),
            ..Default::default()
        };
        base.merge(Config {
            whitelist: "10.0.0.2".to_string(),
            blacklist: "1.2.3.4".to_string(),
            blacklist_regex: "5.6.*".to_string(),
            resolve_dns: false,
            ..Default::default()
        });
        assert_eq!(base.whitelist, "10.0.0.1,10.0.0.2");
        assert_eq!(base.whitelist_regex, "10.*");
        assert_eq!(base.blacklist, "1.2.3.4");
        assert_eq!(base.blacklist_regex, "5.6.*");
        assert!(!base.resolve_dns);
    }
}
