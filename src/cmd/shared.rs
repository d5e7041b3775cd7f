/*!
shared.rs - the registration pipeline used by `add` and `remote`.

  Parsed -> SecretsResolved -> Built -> Invoked -> {Succeeded | Failed}

Any failure ends the run. Secrets are resolved before anything is built, so
an aborted prompt never yields a vector and never spawns the collaborator.
*/

use std::io::Write;

use tracing::{debug, info};

use crate::cmd::format::{Role, StyleOptions, box_header, color, command_preview, emoji};
use crate::error::{RegisterError, RegisterResult};
use crate::mcp::{
    ArgumentVector, AuthMode, Invoker, Secret, ServerSpec, build_add, build_remote, redact,
};
use crate::utils::input::SecretSource;

/// Settings shared by every registering command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Collaborator binary.
    pub cli: String,
    /// Collaborator subcommand (`mcp`).
    pub subcommand: String,
    /// Print the redacted command and stop.
    pub dry_run: bool,
}

/// Which vector layout to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Add,
    Remote,
}

/// What happened, for the success report.
#[derive(Debug)]
pub struct Outcome {
    pub name: String,
    pub transport: String,
    pub scope: String,
    /// Display-safe copy of what was (or would have been) run.
    pub preview: ArgumentVector,
    pub invoked: bool,
    /// Bare `--oauth`: the user still has to authenticate from the client.
    pub needs_oauth_login: bool,
}

/// Prompt once per slot the auth mode requires and fold the values into the
/// spec. An empty answer fails instead of silently disabling auth.
pub fn resolve_secrets(spec: &mut ServerSpec, source: &mut dyn SecretSource) -> RegisterResult<()> {
    for slot in spec.required_secrets() {
        let value = source.read_secret(&slot.prompt_label())?;
        let value = value.trim();
        if value.is_empty() {
            return Err(RegisterError::secret_input(format!(
                "no {} provided",
                slot.noun()
            )));
        }
        debug!(slot = ?slot, "secret captured");
        spec.resolved_secrets.push((slot, Secret::new(value)));
    }
    spec.apply_secrets();
    Ok(())
}

/// Stand-in used by `--dry-run`: nothing is prompted, the mask is used as value.
struct DryRunSecrets;

impl SecretSource for DryRunSecrets {
    fn read_secret(&mut self, _label: &str) -> RegisterResult<String> {
        Ok(crate::mcp::redact::MASK.to_string())
    }
}

/// Run one registration end to end.
///
/// The redacted preview is written to `echo` before the collaborator starts.
pub fn register(
    kind: Registration,
    mut spec: ServerSpec,
    source: &mut dyn SecretSource,
    invoker: &mut dyn Invoker,
    opts: &RunOptions,
    echo: &mut dyn Write,
) -> RegisterResult<Outcome> {
    let needs_oauth_login = matches!(
        spec.auth,
        AuthMode::OAuthClientCredentials {
            client_secret: false
        }
    ) && spec.client_id.is_none();

    if opts.dry_run {
        resolve_secrets(&mut spec, &mut DryRunSecrets)?;
    } else {
        resolve_secrets(&mut spec, source)?;
    }

    let args = match kind {
        Registration::Add => build_add(&spec, &opts.subcommand)?,
        Registration::Remote => build_remote(&spec, &opts.subcommand)?,
    };
    let preview = redact(&args);

    let style = StyleOptions::detect();
    // Preview is informational; a broken stdout must not block registration.
    let _ = writeln!(echo, "{}", command_preview(&opts.cli, &preview, &style));

    let mut outcome = Outcome {
        name: spec.name().to_string(),
        transport: spec.transport.to_string(),
        scope: spec.scope.to_string(),
        preview,
        invoked: false,
        needs_oauth_login,
    };

    if opts.dry_run {
        info!(name = %outcome.name, "dry run; collaborator not invoked");
        return Ok(outcome);
    }

    invoker.invoke(&opts.cli, &args)?;
    outcome.invoked = true;
    Ok(outcome)
}

/// Success box (and the OAuth follow-up hint when relevant).
pub fn print_outcome(outcome: &Outcome) {
    let style = StyleOptions::detect();
    let title = if outcome.invoked {
        format!("{} Registered '{}'", emoji("success", &style), outcome.name)
    } else {
        format!("{} Dry run for '{}'", emoji("info", &style), outcome.name)
    };
    let subtitle = format!("transport={} • scope={}", outcome.transport, outcome.scope);
    println!("{}", box_header(title, Some(subtitle), &style));

    if outcome.needs_oauth_login {
        println!(
            "{} {}",
            emoji("lock", &style),
            color(
                Role::Dim,
                "Authenticate from your client (e.g. `/mcp`) to finish the OAuth flow.",
                &style
            )
        );
    }
}
