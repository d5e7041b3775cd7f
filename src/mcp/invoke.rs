//! Collaborator process launch.
//!
//! The child shares our terminal (stdin/stdout/stderr inherited) so browser
//! handoffs and the collaborator's own prompts work unchanged. We always wait
//! for it to exit.

use std::io::ErrorKind;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::builder::ArgumentVector;
use super::redact::redact;
use crate::error::{RegisterError, RegisterResult};

/// Default collaborator binary.
pub const DEFAULT_CLI: &str = "claude";

/// Runs a built vector against the collaborator.
pub trait Invoker {
    /// Ok when the collaborator exits 0.
    fn invoke(&mut self, program: &str, args: &ArgumentVector) -> RegisterResult<()>;
}

/// Spawns the real collaborator binary.
#[derive(Debug, Default)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn invoke(&mut self, program: &str, args: &ArgumentVector) -> RegisterResult<()> {
        debug!(program, argc = args.as_slice().len(), args = %redact(args), "spawning collaborator");

        let status = Command::new(program)
            .args(args.iter())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| launch_error(program, &e))?;

        if status.success() {
            info!(program, "collaborator finished");
            return Ok(());
        }
        // Killed by a signal: no code to propagate.
        let code = status.code().unwrap_or(1);
        Err(RegisterError::ExternalExit {
            program: program.to_string(),
            code,
        })
    }
}

fn launch_error(program: &str, err: &std::io::Error) -> RegisterError {
    let reason = match err.kind() {
        ErrorKind::NotFound => "not found on PATH".to_string(),
        ErrorKind::PermissionDenied => "not executable".to_string(),
        _ => err.to_string(),
    };
    RegisterError::ExternalTool {
        program: program.to_string(),
        reason,
    }
}
