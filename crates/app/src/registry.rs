//! In-memory automation registry keyed by name.

use std::sync::{Arc, PoisonError, RwLock};

use crate::automation::Automation;

/// Name → [`Automation`] map with a stable listing order.
///
/// Entries are kept in registration order; re-registering a name replaces
/// the entry in place. Reads hand out `Arc` snapshots so callers never hold
/// the lock across an `.await`.
#[derive(Debug, Default)]
pub struct AutomationRegistry {
    entries: RwLock<Vec<Arc<Automation>>>,
}

impl AutomationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `automation`, replacing any entry with the same name.
    #[tracing::instrument(skip_all, fields(automation = %automation.name()))]
    pub fn register(&self, automation: Automation) {
        let automation = Arc::new(automation);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter_mut().find(|a| a.name() == automation.name()) {
            Some(slot) => {
                *slot = automation;
                tracing::info!("automation replaced");
            }
            None => {
                entries.push(automation);
                tracing::info!("automation registered");
            }
        }
    }

    /// Remove the automation called `name`. Returns whether one was removed.
    pub fn unregister(&self, name: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|a| a.name() != name);
        let removed = entries.len() != before;
        if removed {
            tracing::info!(automation = name, "automation removed");
        }
        removed
    }

    /// Look up an automation by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Automation>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|a| a.name() == name)
            .cloned()
    }

    /// Snapshot of every registered automation, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<Automation>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
