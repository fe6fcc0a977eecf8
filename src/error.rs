use std::error::Error as StdError;
use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to the user.
    ///
    /// Use of Internal is never a guarantee the error is not, for example,
    /// caused by the user closing the terminal - merely that it cannot be
    /// confidently determined by the code.
    Internal,

    /// The user provided input that cannot be accepted, such as two
    /// different entries while confirming a new passphrase.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Reading from the input or writing to the output failed, or the input
    /// ended before a line was available.
    Io,
    /// The passphrase and its confirmation differ.
    ConfirmationMismatch,
    /// No source to read a passphrase from (e.g. stdin is not a terminal).
    PassphraseUnavailable,
    /// A caller-supplied argument (role, key path, flag) is not usable.
    InvalidArgument,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct PassphraseError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Any code consuming errors MUST
    /// handle the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl PassphraseError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// Wraps an I/O failure from the input or output collaborator.
    pub fn io(msg: impl Into<String>, source: io::Error) -> Self {
        Self::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, source)
    }

    /// The two entries made while creating a new passphrase differ.
    pub fn confirmation_mismatch() -> Self {
        Self::with_kind(
            ErrorCategory::User,
            ErrorKind::ConfirmationMismatch,
            "passphrases do not match",
        )
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// True for failures of the input or output collaborator.
    pub fn is_io(&self) -> bool {
        self.kind == Some(ErrorKind::Io)
    }

    /// True when the two entries for a new passphrase differed.
    pub fn is_confirmation_mismatch(&self) -> bool {
        self.kind == Some(ErrorKind::ConfirmationMismatch)
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PassphraseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_source() {
        let err = PassphraseError::io(
            "error reading passphrase",
            io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"),
        );
        assert!(err.is_io());
        assert!(!err.is_confirmation_mismatch());
        assert_eq!(err.category, ErrorCategory::Internal);
        let source = err.source_error().unwrap();
        assert_eq!(source.to_string(), "end of input");
    }

    #[test]
    fn test_mismatch_is_user_error() {
        let err = PassphraseError::confirmation_mismatch();
        assert!(err.is_confirmation_mismatch());
        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.to_string(), "passphrases do not match");
    }

    #[test]
    fn test_with_context_preserves_kind() {
        let err = PassphraseError::confirmation_mismatch().with_context("retrieving root key");
        assert_eq!(err.kind, Some(ErrorKind::ConfirmationMismatch));
        assert_eq!(err.message(), "retrieving root key");
        assert!(err.source_error().is_some());
    }
}
