//! IPBan policy - access decisions for a host intrusion prevention service.
//!
//! Decides whether an address or user name seen in a log line is
//! whitelisted, blacklisted, or should be banned after a failed login, and
//! selects keyword-tagged expression groups used to recognise failed-login
//! events in raw log text.

pub mod answer;
pub mod audit;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod expression;
pub mod input;
pub mod output;
pub mod policy;
pub mod sets;

pub use answer::{Answer, answer};
pub use classifier::AccessClassifier;
pub use config::{Config, ConfigError};
pub use decision::Verdict;
pub use expression::{ExpressionGroup, ExpressionToBlock};
pub use input::Query;
pub use output::format_response;
pub use policy::{PolicyHandle, PolicyStore};
pub use sets::{IdentifierSet, Resolver, SystemResolver, UserNameAllowSet};
