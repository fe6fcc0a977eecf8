//! trustpass - interactive passphrase retrieval for content-trust signing keys
//!
//! Asks a human for the passphrase of a signing key, remembers the answers
//! for the top-level trust roles for the rest of the session, and asks twice
//! when a new key's passphrase is being chosen.

#![forbid(unsafe_code)]

pub mod attempt;
pub mod cache;
pub mod env;
pub mod error;
pub mod passphrase;
pub mod prompt;
pub mod retriever;
pub mod role;

pub use attempt::AttemptPolicy;
pub use cache::PassphraseCache;
pub use error::{ErrorCategory, ErrorKind, PassphraseError, Result};
pub use retriever::{ConstantRetriever, PromptRetriever, Retrieval, Retriever};
