//! Whitelist, blacklist and user-name decisions over a [`PolicyStore`].

use std::net::IpAddr;

use crate::decision::{BanInfo, Verdict};
use crate::policy::PolicyStore;

/// Answers per-event access questions against a loaded policy.
///
/// Both list checks lean towards not banning: an unparseable address is
/// whitelisted, a blank string is never blacklisted.
#[derive(Debug, Clone, Copy)]
pub struct AccessClassifier<'a> {
    policy: &'a PolicyStore,
}

impl<'a> AccessClassifier<'a> {
    pub fn new(policy: &'a PolicyStore) -> Self {
        Self { policy }
    }

    /// Listed, not an IP address at all, or matched by the whitelist pattern.
    pub fn is_whitelisted(&self, ip: &str) -> bool {
        let whitelist = self.policy.whitelist();
        whitelist.contains(ip) || ip.parse::<IpAddr>().is_err() || whitelist.matches_pattern(ip)
    }

    /// Listed, matched by the blacklist pattern, or a user name outside the allowed set.
    pub fn is_blacklisted(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.blacklist_rule(text).is_some()
            || self.should_ban_user_name_after_failed_login_attempt(text)
    }

    /// True only when allowed user names are configured and `user_name` is not one of them.
    pub fn should_ban_user_name_after_failed_login_attempt(&self, user_name: &str) -> bool {
        let allowed = self.policy.allowed_user_names();
        !allowed.is_empty() && !allowed.contains(user_name)
    }

    /// Combine the checks for a failed-login event into one verdict.
    ///
    /// The whitelist wins. Otherwise the address and the user name are
    /// checked against the blacklist, then the user name against the
    /// allowed set.
    pub fn evaluate(&self, ip: &str, user_name: Option<&str>) -> Verdict {
        if self.is_whitelisted(ip) {
            return Verdict::Whitelisted;
        }

        let user_name = user_name.filter(|u| !u.trim().is_empty());

        for value in std::iter::once(ip).chain(user_name) {
            if let Some((rule, reason)) = self.blacklist_rule(value) {
                return Verdict::Ban(BanInfo::new(rule, reason).with_details(value));
            }
        }

        if let Some(user_name) = user_name {
            if self.should_ban_user_name_after_failed_login_attempt(user_name) {
                return Verdict::Ban(
                    BanInfo::new("user_name.not_allowed", "user name is not in the allowed list")
                        .with_details(user_name),
                );
            }
        }

        Verdict::allow()
    }

    fn blacklist_rule(&self, value: &str) -> Option<(&'static str, &'static str)> {
        if value.trim().is_empty() {
            return None;
        }
        let blacklist = self.policy.blacklist();
        if blacklist.contains(value) {
            Some(("blacklist.literal", "listed in the blacklist"))
        } else if blacklist.matches_pattern(value) {
            Some(("blacklist.pattern", "matches the blacklist pattern"))
        } else {
            None
        }
    }
}
