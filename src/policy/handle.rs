//! Shared, swappable reference to the current policy.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use super::PolicyStore;
use crate::config::{Config, ConfigError};

/// Holds the active [`PolicyStore`] and replaces it as a unit on reload.
///
/// Readers take a snapshot and query it without holding any lock, so a
/// swap never exposes a half-built store.
#[derive(Debug)]
pub struct PolicyHandle {
    current: RwLock<Arc<PolicyStore>>,
}

impl PolicyHandle {
    pub fn new(store: PolicyStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// The store in effect right now.
    pub fn snapshot(&self) -> Arc<PolicyStore> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Install `store`, returning the one it replaced.
    pub fn swap(&self, store: PolicyStore) -> Arc<PolicyStore> {
        let next = Arc::new(store);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Build a new store from `config` and swap it in.
    ///
    /// On error the current store stays in place.
    pub fn reload(&self, config: &Config) -> Result<(), ConfigError> {
        let store = config.compile()?;
        self.swap(store);
        info!("policy reloaded");
        Ok(())
    }
}
