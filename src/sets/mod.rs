//! Identifier sets built from comma-separated configuration lists.

mod identifier;
mod resolver;
mod user_names;

pub use identifier::{IdentifierSet, WILDCARD_HEX_FRAGMENT, wildcard_regex_source};
pub use resolver::{NoopResolver, Resolver, SystemResolver};
pub use user_names::UserNameAllowSet;

/// Split a comma-separated list into trimmed, non-empty tokens.
pub(crate) fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.trim()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
