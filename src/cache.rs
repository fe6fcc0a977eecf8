//! In-memory passphrase cache
//!
//! Holds passphrases for the canonical roles only. Delegation keys are
//! considered distinct per use, so they are never remembered. Entries are
//! wiped from memory when replaced, cleared, or when the cache is dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;
use zeroize::Zeroizing;

use crate::role::CanonicalRole;

#[derive(Default)]
pub struct PassphraseCache {
    entries: Mutex<HashMap<CanonicalRole, Zeroizing<String>>>,
}

impl fmt::Debug for PassphraseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut roles: Vec<CanonicalRole> = self.lock().keys().copied().collect();
        roles.sort();
        f.debug_struct("PassphraseCache")
            .field("roles", &roles)
            .finish_non_exhaustive()
    }
}

impl PassphraseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached passphrase for `role`, if any.
    pub fn get(&self, role: &str) -> Option<Zeroizing<String>> {
        let role = CanonicalRole::from_name(role)?;
        self.lock().get(&role).cloned()
    }

    /// Stores `passphrase` for `role`. Does nothing unless `role` is canonical.
    pub fn set(&self, role: &str, passphrase: Zeroizing<String>) {
        let Some(role) = CanonicalRole::from_name(role) else {
            trace!(role, "not caching passphrase for non-canonical role");
            return;
        };
        self.lock().insert(role, passphrase);
    }

    pub fn contains(&self, role: &str) -> bool {
        CanonicalRole::from_name(role).is_some_and(|role| self.lock().contains_key(&role))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the map half-updated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<CanonicalRole, Zeroizing<String>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
