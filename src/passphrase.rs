//! Passphrase input sources
//!
//! Each call to [`PassphraseReader::read_passphrase`] consumes exactly one
//! line of input. Prompting is the caller's job; readers never write.

use crate::error::{ErrorCategory, ErrorKind, PassphraseError, Result};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

/// Trait for reading one passphrase line from some source
pub trait PassphraseReader {
    /// Read a single passphrase, without its line terminator.
    ///
    /// Returns the passphrase wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>>;
}

impl<T: PassphraseReader + ?Sized> PassphraseReader for Box<T> {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        (**self).read_passphrase()
    }
}

/// Reads passphrases line by line from any buffered source
pub struct LineReader<R> {
    reader: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> PassphraseReader for LineReader<R> {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        let mut line = Zeroizing::new(String::new());
        let read = self
            .reader
            .read_line(&mut *line)
            .map_err(|e| PassphraseError::io(format!("error reading passphrase: {}", e), e))?;
        if read == 0 {
            return Err(PassphraseError::io(
                "error reading passphrase: end of input",
                io::Error::from(io::ErrorKind::UnexpectedEof),
            ));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// Reads passphrase from terminal with no echo
pub struct TerminalPassphraseReader;

impl TerminalPassphraseReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPassphraseReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(PassphraseError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "cannot read passphrase from terminal - stdin is not a terminal",
            ));
        }

        // Read password *without echo*
        let passphrase = rpassword::read_password()
            .map_err(|e| PassphraseError::io(format!("failure reading passphrase: {}", e), e))?;

        Ok(Zeroizing::new(passphrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Read};

    #[test]
    fn test_reads_one_line_per_call() {
        let mut reader = LineReader::new(&b"first\nsecond\r\nthird"[..]);
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "first");
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "second");
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "third");
    }

    #[test]
    fn test_strips_only_the_line_terminator() {
        let mut reader = LineReader::new(&b"pw\r\r\nend\r\r"[..]);
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "pw\r");
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "end\r\r");
    }

    #[test]
    fn test_empty_line_is_a_passphrase() {
        let mut reader = LineReader::new(&b"\n"[..]);
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "");
    }

    #[test]
    fn test_end_of_input_is_io_error() {
        let mut reader = LineReader::new(&b"only\n"[..]);
        reader.read_passphrase().unwrap();

        let err = reader.read_passphrase().unwrap_err();
        assert!(err.is_io());
        let source = err.source_error().unwrap();
        let io_err = source.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_failure_is_io_error() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            }
        }

        let mut reader = LineReader::new(BufReader::new(Broken));
        let err = reader.read_passphrase().unwrap_err();
        assert!(err.is_io());
        assert!(err.message().contains("pipe closed"));
    }

    #[test]
    fn test_boxed_reader() {
        let mut reader: Box<dyn PassphraseReader> = Box::new(LineReader::new(&b"boxed\n"[..]));
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "boxed");
    }

    /// Tests the terminal reader. This is ignored by default and must be run
    /// explicitly and with human input:
    ///
    /// cargo test test_terminal_reader_interactive -- --ignored --nocapture
    #[test]
    #[ignore]
    fn test_terminal_reader_interactive() {
        let mut reader = TerminalPassphraseReader::new();
        println!("\nPlease enter a test passphrase:");
        let passphrase = reader.read_passphrase().unwrap();
        println!("You entered: {}", passphrase.as_str());
        assert!(!passphrase.is_empty(), "Expected non-empty passphrase");
    }
}
