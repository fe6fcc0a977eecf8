//! Role classification
//!
//! Trust metadata has four top-level roles plus delegations nested under
//! `targets/`. Only the top-level roles are remembered between prompts.

use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorCategory, ErrorKind, PassphraseError};

const DELEGATION_PREFIX: &str = "targets/";

/// One of the four top-level trust roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalRole {
    Root,
    Targets,
    Snapshot,
    Timestamp,
}

impl CanonicalRole {
    pub const ALL: [CanonicalRole; 4] = [
        CanonicalRole::Root,
        CanonicalRole::Targets,
        CanonicalRole::Snapshot,
        CanonicalRole::Timestamp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalRole::Root => "root",
            CanonicalRole::Targets => "targets",
            CanonicalRole::Snapshot => "snapshot",
            CanonicalRole::Timestamp => "timestamp",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(role: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == role)
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalRole {
    type Err = PassphraseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            PassphraseError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidArgument,
                format!("{:?} is not a canonical role", s),
            )
        })
    }
}

/// How a role name is treated when caching passphrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Canonical(CanonicalRole),
    Delegation,
    Unrecognized,
}

/// Sorts a role name into canonical, delegation, or unrecognized.
pub fn classify(role: &str) -> RoleKind {
    if let Some(canonical) = CanonicalRole::from_name(role) {
        RoleKind::Canonical(canonical)
    } else if is_delegation(role) {
        RoleKind::Delegation
    } else {
        RoleKind::Unrecognized
    }
}

/// True for `root`, `targets`, `snapshot` and `timestamp`.
pub fn is_canonical(role: &str) -> bool {
    CanonicalRole::from_name(role).is_some()
}

/// True for roles nested under `targets/`.
pub fn is_delegation(role: &str) -> bool {
    role.starts_with(DELEGATION_PREFIX)
}
