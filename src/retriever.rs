//! Passphrase retrieval
//!
//! A [`Retriever`] is configured once with its collaborators and called for
//! every key the signing code needs to unlock. The caller owns the retry
//! loop: it passes how many times the same request has already failed, and
//! stops when the returned [`Retrieval`] says to give up.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use crate::attempt::AttemptPolicy;
use crate::cache::PassphraseCache;
use crate::error::{PassphraseError, Result};
use crate::passphrase::PassphraseReader;
use crate::prompt::{KeyName, PromptKind, format_prompt};
use crate::role::{RoleKind, classify};

/// Outcome of a successful retrieval.
///
/// When `give_up` is set the passphrase is empty and the caller should stop
/// retrying the request.
#[derive(Clone)]
pub struct Retrieval {
    pub passphrase: Zeroizing<String>,
    pub give_up: bool,
}

impl Retrieval {
    pub fn new(passphrase: Zeroizing<String>) -> Self {
        Self {
            passphrase,
            give_up: false,
        }
    }

    pub fn give_up() -> Self {
        Self {
            passphrase: Zeroizing::new(String::new()),
            give_up: true,
        }
    }
}

impl std::fmt::Debug for Retrieval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrieval")
            .field("passphrase", &"<redacted>")
            .field("give_up", &self.give_up)
            .finish()
    }
}

/// Source of signing key passphrases.
pub trait Retriever {
    /// Obtain the passphrase for the key at `key_path` (`alias/keyid`) acting
    /// in `role`.
    ///
    /// `create_new` asks for a passphrase for a key that is being generated,
    /// which must be entered twice. `attempt` is the number of earlier
    /// failures for this same request.
    fn retrieve(
        &mut self,
        key_path: &str,
        role: &str,
        create_new: bool,
        attempt: u32,
    ) -> Result<Retrieval>;
}

impl<T: Retriever + ?Sized> Retriever for Box<T> {
    fn retrieve(
        &mut self,
        key_path: &str,
        role: &str,
        create_new: bool,
        attempt: u32,
    ) -> Result<Retrieval> {
        (**self).retrieve(key_path, role, create_new, attempt)
    }
}

/// Prompts on `writer` and reads answers from `reader`, remembering the
/// passphrases of canonical roles in a shared [`PassphraseCache`].
pub struct PromptRetriever<R, W> {
    reader: R,
    writer: W,
    cache: Arc<PassphraseCache>,
    policy: AttemptPolicy,
}

impl<R: PassphraseReader, W: Write> PromptRetriever<R, W> {
    pub fn new(reader: R, writer: W, cache: Arc<PassphraseCache>) -> Self {
        Self {
            reader,
            writer,
            cache,
            policy: AttemptPolicy::default(),
        }
    }

    /// Replaces the default [`AttemptPolicy`].
    pub fn with_policy(mut self, policy: AttemptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(&self) -> &Arc<PassphraseCache> {
        &self.cache
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .map_err(|e| PassphraseError::io(format!("failed to write prompt: {}", e), e))?;
        self.writer
            .flush()
            .map_err(|e| PassphraseError::io(format!("failed to flush prompt: {}", e), e))
    }
}

impl<R: PassphraseReader, W: Write> Retriever for PromptRetriever<R, W> {
    fn retrieve(
        &mut self,
        key_path: &str,
        role: &str,
        create_new: bool,
        attempt: u32,
    ) -> Result<Retrieval> {
        if self.policy.should_give_up(attempt) {
            debug!(role, attempt, "giving up on passphrase request");
            return Ok(Retrieval::give_up());
        }

        let kind = classify(role);
        if kind == RoleKind::Unrecognized {
            warn!(role, "prompting for passphrase of unrecognized role");
        }

        if let Some(passphrase) = self.cache.get(role) {
            trace!(role, attempt, "using cached passphrase");
            return Ok(Retrieval::new(passphrase));
        }

        let key = KeyName::parse(key_path);
        debug!(
            role,
            key_id = key.short_id(),
            create_new,
            attempt,
            "prompting for passphrase"
        );

        let first = if create_new {
            PromptKind::New
        } else {
            PromptKind::Existing
        };
        self.prompt(&format_prompt(&key, role, first))?;
        let passphrase = self.reader.read_passphrase()?;

        if create_new {
            let repeat = format!("\n{}", format_prompt(&key, role, PromptKind::Repeat));
            self.prompt(&repeat)?;
            let confirmation = self.reader.read_passphrase()?;
            if *confirmation != *passphrase {
                debug!(role, "passphrase confirmation mismatch");
                return Err(PassphraseError::confirmation_mismatch());
            }
        }

        if let RoleKind::Canonical(canonical) = kind {
            trace!(role = canonical.as_str(), "caching passphrase");
            self.cache.set(canonical.as_str(), passphrase.clone());
        }
        Ok(Retrieval::new(passphrase))
    }
}

/// Always answers with the same passphrase, without any interaction.
pub struct ConstantRetriever {
    passphrase: Zeroizing<String>,
}

impl ConstantRetriever {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }
}

impl Retriever for ConstantRetriever {
    fn retrieve(&mut self, _: &str, _: &str, _: bool, _: u32) -> Result<Retrieval> {
        Ok(Retrieval::new(self.passphrase.clone()))
    }
}
