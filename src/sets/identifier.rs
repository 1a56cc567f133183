//! Case-insensitive address/host sets with an optional wildcard matcher.

use regex::Regex;
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::{debug, warn};

use super::resolver::Resolver;
use super::split_list;
use crate::expression::build_regex;

/// Regex fragment substituted for every `*` in a wildcard pattern.
///
/// Matches one or more hex digits, so the same wildcard works for IPv4
/// octets and IPv6 groups.
pub const WILDCARD_HEX_FRAGMENT: &str = "[0-9A-Fa-f]+?";

/// Turn an operator-supplied wildcard pattern into regex source.
pub fn wildcard_regex_source(pattern: &str) -> String {
    pattern.trim().replace('*', WILDCARD_HEX_FRAGMENT)
}

/// A set of IP literals, host names and resolved addresses.
#[derive(Debug, Clone, Default)]
pub struct IdentifierSet {
    /// Lowercased entry -> spelling it was first inserted with.
    entries: BTreeMap<String, String>,
    matcher: Option<Regex>,
}

impl IdentifierSet {
    /// Build a set from a comma-separated list and a wildcard pattern.
    ///
    /// Never fails: tokens that are not IP addresses are kept literally,
    /// lookup failures leave only the literal, and a wildcard that does not
    /// compile leaves the matcher absent. A blank list yields an empty set
    /// with no matcher, whatever the wildcard says.
    pub fn build(literal_list: &str, wildcard_pattern: &str, resolver: &dyn Resolver) -> Self {
        let mut set = Self::default();
        if literal_list.trim().is_empty() {
            return set;
        }

        for token in split_list(literal_list) {
            set.insert(token);

            let Ok(ip) = token.parse::<IpAddr>() else {
                continue;
            };
            if ip.is_unspecified() {
                continue;
            }

            match resolver.resolve(token) {
                Ok(addrs) => {
                    for addr in addrs {
                        set.insert(&addr.to_string());
                    }
                }
                Err(e) => debug!(token, error = %e, "lookup failed, keeping literal only"),
            }
        }

        set.matcher = compile_wildcard(wildcard_pattern);
        set
    }

    fn insert(&mut self, value: &str) {
        self.entries
            .entry(value.to_lowercase())
            .or_insert_with(|| value.to_string());
    }

    /// Case-insensitive membership test against the literal/resolved entries.
    pub fn contains(&self, value: &str) -> bool {
        self.entries.contains_key(&value.to_lowercase())
    }

    /// Whether the wildcard matcher (if any) matches `value`.
    pub fn matches_pattern(&self, value: &str) -> bool {
        self.matcher
            .as_ref()
            .map(|re| re.is_match(value))
            .unwrap_or(false)
    }

    /// Membership or wildcard match.
    pub fn is_match(&self, value: &str) -> bool {
        self.contains(value) || self.matches_pattern(value)
    }

    /// The compiled wildcard, if one was configured.
    pub fn matcher(&self) -> Option<&Regex> {
        self.matcher.as_ref()
    }

    /// Number of distinct entries, ignoring case.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no literal or resolved entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as first spelled, in case-insensitive order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Entries joined with `,`, for diagnostics.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

fn compile_wildcard(pattern: &str) -> Option<Regex> {
    let source = wildcard_regex_source(pattern);
    if source.is_empty() {
        return None;
    }
    match build_regex(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern = %source, error = %e, "ignoring wildcard pattern that does not compile");
            None
        }
    }
}
