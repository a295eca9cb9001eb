// error.rs - Error taxonomy for pdorchestra
// Purpose: One variant per failure class (environment, installation,
//          precondition, execution, input). Nothing is recovered locally.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // ── environment ──
    #[error("unsupported OS for auto-install: {0}")]
    UnsupportedPlatform(String),

    #[error("'go' still not found after installation. Please restart your shell or add Go to PATH.")]
    RuntimeUnavailable,

    // ── precondition ──
    #[error("missing tools: {}. Run with --install-tools first.", .0.join(", "))]
    MissingTools(Vec<String>),

    // ── installation / execution ──
    #[error("command `{command}` exited with {}", describe_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // ── input ──
    #[error("failed to read domains file {}: {source}", .path.display())]
    DomainsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid domain {0:?}: must be a bare host name")]
    InvalidDomain(String),

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit status for this failure. Every class maps to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (terminated by signal)".to_string(),
    }
}
