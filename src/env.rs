//! Passphrases supplied through environment variables
//!
//! Lets unattended signing (CI, scripts) unlock existing keys without a
//! terminal. Variables are named `{PREFIX}_{ROLE}_PASSPHRASE`, e.g.
//! `TRUSTPASS_ROOT_PASSPHRASE`; all delegations share
//! `{PREFIX}_DELEGATION_PASSPHRASE`.

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::Result;
use crate::retriever::{Retrieval, Retriever};
use crate::role::{RoleKind, classify};

pub const DEFAULT_ENV_PREFIX: &str = "TRUSTPASS";

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Name of the variable consulted for `role`, if that role has one.
pub fn variable_name(prefix: &str, role: &str) -> Option<String> {
    let suffix = match classify(role) {
        RoleKind::Canonical(role) => role.as_str().to_ascii_uppercase(),
        RoleKind::Delegation => "DELEGATION".to_string(),
        RoleKind::Unrecognized => return None,
    };
    Some(format!("{}_{}_PASSPHRASE", prefix, suffix))
}

/// Checks the environment before falling back to `inner`.
///
/// Only the first attempt at unlocking an existing key is answered from the
/// environment. New keys and retries always go to `inner`, so a wrong value
/// in the environment cannot cause an endless retry loop.
pub struct EnvRetriever<T> {
    inner: T,
    prefix: String,
    lookup: Lookup,
}

impl<T: Retriever> EnvRetriever<T> {
    pub fn new(inner: T) -> Self {
        Self::with_lookup(inner, DEFAULT_ENV_PREFIX, |name| std::env::var(name).ok())
    }

    pub fn with_lookup(
        inner: T,
        prefix: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
            lookup: Box::new(lookup),
        }
    }
}

impl<T: Retriever> Retriever for EnvRetriever<T> {
    fn retrieve(
        &mut self,
        key_path: &str,
        role: &str,
        create_new: bool,
        attempt: u32,
    ) -> Result<Retrieval> {
        if !create_new && attempt == 0 {
            if let Some(name) = variable_name(&self.prefix, role) {
                if let Some(value) = (self.lookup)(&name) {
                    debug!(role, variable = %name, "using passphrase from environment");
                    return Ok(Retrieval::new(Zeroizing::new(value)));
                }
            }
        }
        self.inner.retrieve(key_path, role, create_new, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::ConstantRetriever;
    use std::collections::HashMap;

    const KEY: &str = "repo/0123456789abcdef";

    fn env_retriever(vars: &[(&str, &str)]) -> EnvRetriever<ConstantRetriever> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvRetriever::with_lookup(ConstantRetriever::new("prompted"), "TEST", move |name| {
            vars.get(name).cloned()
        })
    }

    #[test]
    fn test_variable_names() {
        assert_eq!(
            variable_name("TRUSTPASS", "root").as_deref(),
            Some("TRUSTPASS_ROOT_PASSPHRASE")
        );
        assert_eq!(
            variable_name("TRUSTPASS", "timestamp").as_deref(),
            Some("TRUSTPASS_TIMESTAMP_PASSPHRASE")
        );
        assert_eq!(
            variable_name("X", "targets/releases").as_deref(),
            Some("X_DELEGATION_PASSPHRASE")
        );
        assert_eq!(variable_name("X", "releases"), None);
    }

    #[test]
    fn test_environment_answers_first_attempt() {
        let mut r = env_retriever(&[
            ("TEST_ROOT_PASSPHRASE", "fromenv"),
            ("TEST_DELEGATION_PASSPHRASE", "delegated"),
        ]);
        let got = r.retrieve(KEY, "root", false, 0).unwrap();
        assert_eq!(got.passphrase.as_str(), "fromenv");
        let got = r.retrieve(KEY, "targets/a", false, 0).unwrap();
        assert_eq!(got.passphrase.as_str(), "delegated");
    }

    #[test]
    fn test_falls_back_to_inner() {
        let mut r = env_retriever(&[("TEST_ROOT_PASSPHRASE", "fromenv")]);
        // Unset variable.
        let got = r.retrieve(KEY, "snapshot", false, 0).unwrap();
        assert_eq!(got.passphrase.as_str(), "prompted");
        // Retry after the environment value was rejected.
        let got = r.retrieve(KEY, "root", false, 1).unwrap();
        assert_eq!(got.passphrase.as_str(), "prompted");
        // New keys are always confirmed interactively.
        let got = r.retrieve(KEY, "root", true, 0).unwrap();
        assert_eq!(got.passphrase.as_str(), "prompted");
    }
}
