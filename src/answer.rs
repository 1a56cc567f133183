//! Answering a [`Query`] against a loaded policy.

use serde::Serialize;

use crate::classifier::AccessClassifier;
use crate::decision::Verdict;
use crate::expression::ExpressionGroup;
use crate::input::{InputError, Query, QueryKind};
use crate::policy::PolicyStore;

/// Summary of an expression group for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    /// Bitmask formatted as `0x`-prefixed hex.
    pub keywords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub expressions: Vec<String>,
}

impl From<&ExpressionGroup> for GroupSummary {
    fn from(group: &ExpressionGroup) -> Self {
        Self {
            name: group.name().to_string(),
            keywords: format!("0x{:X}", group.keywords()),
            source: group.source().map(String::from),
            path: group.path().map(String::from),
            expressions: group
                .expressions()
                .iter()
                .map(|e| e.regex().to_string())
                .collect(),
        }
    }
}

/// The result of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Flag {
        result: bool,
    },
    Verdict(Verdict),
    Groups {
        groups: Vec<GroupSummary>,
    },
    Classified {
        group: Option<GroupSummary>,
    },
    Lists {
        whitelist: String,
        blacklist: String,
        allowed_user_names: String,
    },
}

impl Answer {
    /// Whether the answer calls for a ban.
    pub fn is_ban(&self) -> bool {
        match self {
            Answer::Verdict(v) => v.is_banned(),
            _ => false,
        }
    }
}

/// Answer `query` using `policy`.
pub fn answer(query: &Query, policy: &PolicyStore) -> Result<Answer, InputError> {
    let classifier = AccessClassifier::new(policy);

    let answer = match query.query {
        QueryKind::IsWhitelisted => Answer::Flag {
            result: classifier.is_whitelisted(query.value_or_empty()),
        },
        QueryKind::IsBlacklisted => Answer::Flag {
            result: classifier.is_blacklisted(query.value_or_empty()),
        },
        QueryKind::ShouldBanUserName => Answer::Flag {
            result: classifier.should_ban_user_name_after_failed_login_attempt(query.value()?),
        },
        QueryKind::Evaluate => {
            Answer::Verdict(classifier.evaluate(query.value()?, query.user_name.as_deref()))
        }
        QueryKind::Groups => Answer::Groups {
            groups: policy
                .groups_matching_keywords(query.keywords()?)
                .map(GroupSummary::from)
                .collect(),
        },
        QueryKind::Classify => Answer::Classified {
            group: policy
                .classify(query.keywords()?, query.text()?)
                .map(GroupSummary::from),
        },
        QueryKind::Lists => Answer::Lists {
            whitelist: policy.whitelist_joined(),
            blacklist: policy.blacklist_joined(),
            allowed_user_names: policy.allowed_user_names_joined(),
        },
    };

    Ok(answer)
}
