//! Error taxonomy for the registration engine.
//!
//! Every failure surfaces at the command boundary with a user-facing message
//! and maps to an exit code. Nothing here is retried.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// Missing server name, missing URL for a network transport, bad flag values.
    #[error("{0}")]
    Usage(String),

    /// Empty secret or an interrupt while prompting.
    #[error("{0}")]
    SecretInput(String),

    /// The collaborator CLI could not be located or launched.
    #[error("failed to launch '{program}': {reason}. Is Claude Code installed?")]
    ExternalTool { program: String, reason: String },

    /// The collaborator ran but exited non-zero.
    #[error("'{program}' exited with status {code}")]
    ExternalExit { program: String, code: i32 },

    /// The project manifest exists but could not be read or parsed.
    #[error("manifest error: {0}")]
    Manifest(String),
}

impl RegisterError {
    pub fn usage(msg: impl Into<String>) -> Self {
        RegisterError::Usage(msg.into())
    }

    pub fn secret_input(msg: impl Into<String>) -> Self {
        RegisterError::SecretInput(msg.into())
    }

    /// Process exit code for this failure.
    ///
    /// Usage, missing collaborator and propagated collaborator failures all
    /// report `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            RegisterError::Usage(_)
            | RegisterError::SecretInput(_)
            | RegisterError::ExternalTool { .. }
            | RegisterError::ExternalExit { .. }
            | RegisterError::Manifest(_) => 1,
        }
    }

    /// Short label used in the error box title.
    pub fn kind(&self) -> &'static str {
        match self {
            RegisterError::Usage(_) => "Usage Error",
            RegisterError::SecretInput(_) => "Secret Input Error",
            RegisterError::ExternalTool { .. } => "External Tool Error",
            RegisterError::ExternalExit { .. } => "External Exit Error",
            RegisterError::Manifest(_) => "Manifest Error",
        }
    }
}

pub type RegisterResult<T> = std::result::Result<T, RegisterError>;
