//! trustpass CLI - ask for signing key passphrases
//!
//! Prompts on stderr and prints each passphrase on its own line on stdout,
//! so it can be used as an askpass helper by signing tooling.

use clap::Parser;
use std::error::Error as StdError;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use trustpass::attempt::DEFAULT_MAX_ATTEMPTS;
use trustpass::env::EnvRetriever;
use trustpass::passphrase::{LineReader, PassphraseReader, TerminalPassphraseReader};
use trustpass::role::{RoleKind, classify};
use trustpass::{
    AttemptPolicy, ErrorCategory, ErrorKind, PassphraseCache, PassphraseError, PromptRetriever,
    Result, Retriever,
};

#[derive(Parser)]
#[command(name = "trustpass")]
#[command(version)]
#[command(about = "Ask for the passphrase of a content-trust signing key.", long_about = None)]
struct Cli {
    /// Key path in the form ALIAS/KEYID (the alias is optional)
    #[arg(short, long, value_name = "PATH")]
    key: String,

    /// Role the key signs for; repeat to ask for several roles in one session
    #[arg(short, long, value_name = "ROLE", required = true)]
    role: Vec<String>,

    /// The key is being created: ask for the passphrase twice
    #[arg(long)]
    new: bool,

    /// Read passphrases line by line from stdin instead of from the terminal
    #[arg(long)]
    passphrase_stdin: bool,

    /// Number of attempts before giving up
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Ignore TRUSTPASS_<ROLE>_PASSPHRASE environment variables
    #[arg(long)]
    no_env: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("TRUSTPASS_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("trustpass=debug")
        } else {
            EnvFilter::new("trustpass=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

/// Renders `err` followed by each of its sources, separated by `: `.
fn error_chain(err: &PassphraseError) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

/// Stderr writer that records whether a prompt was written to it.
struct PromptWriter {
    prompted: Arc<AtomicBool>,
}

impl Write for PromptWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.prompted.store(true, Ordering::Relaxed);
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(role) = cli
        .role
        .iter()
        .find(|role| classify(role) == RoleKind::Unrecognized)
    {
        return Err(PassphraseError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidArgument,
            format!("unknown role {:?}", role),
        ));
    }

    let prompted = Arc::new(AtomicBool::new(false));
    let writer = PromptWriter {
        prompted: Arc::clone(&prompted),
    };
    let prompter = PromptRetriever::new(
        get_passphrase_reader(cli.passphrase_stdin),
        writer,
        Arc::new(PassphraseCache::new()),
    )
    .with_policy(AttemptPolicy::new(cli.max_attempts));
    let mut retriever: Box<dyn Retriever> = if cli.no_env {
        Box::new(prompter)
    } else {
        Box::new(EnvRetriever::new(prompter))
    };

    let mut stdout = io::stdout().lock();
    for role in &cli.role {
        let mut attempt = 0;
        let passphrase = loop {
            prompted.store(false, Ordering::Relaxed);
            let result = retriever.retrieve(&cli.key, role, cli.new, attempt);
            if !cli.passphrase_stdin && prompted.load(Ordering::Relaxed) {
                // The terminal does not echo the newline typed by the user.
                eprintln!();
            }
            match result {
                Ok(retrieval) if retrieval.give_up => {
                    return Err(PassphraseError::new(
                        ErrorCategory::User,
                        format!("too many attempts for {} key", role),
                    ));
                }
                Ok(retrieval) => break retrieval.passphrase,
                Err(e) if e.is_confirmation_mismatch() => {
                    eprintln!("Passphrases do not match. Please retry.");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.with_context(format!(
                        "failed to get passphrase for {} key",
                        role
                    )));
                }
            }
        };
        writeln!(stdout, "{}", passphrase.as_str())
            .map_err(|e| PassphraseError::io(format!("failed to write passphrase: {}", e), e))?;
    }
    stdout
        .flush()
        .map_err(|e| PassphraseError::io(format!("failed to flush output: {}", e), e))
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(LineReader::new(io::stdin().lock()))
    } else {
        Box::new(TerminalPassphraseReader::new())
    }
}
