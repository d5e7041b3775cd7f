//! Argument vector assembly.
//!
//! The collaborator's parser binds repeatable flags (`-e`, `--header`) to
//! whatever token follows, positionals included. Everything that must not be
//! swallowed (the name, the URL, the `--` command) is therefore placed so that
//! no repeatable flag precedes it by accident:
//!
//!   add:    SUB add --transport T --scope S [oauth] NAME [-e K=V]* (URL | -- CMD...) [--header H]*
//!   remote: SUB add --transport T --scope S [oauth] NAME URL [--header H]*
//!
use std::fmt;

use tracing::warn;

use super::spec::{ServerSpec, Transport};
use crate::error::{RegisterError, RegisterResult};

/// Collaborator subcommand that owns server registration.
pub const DEFAULT_SUBCOMMAND: &str = "mcp";

/// Exact argv for one collaborator invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Position of the first exact `token`, if present.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.0.iter().position(|t| t == token)
    }
}

impl From<Vec<String>> for ArgumentVector {
    fn from(v: Vec<String>) -> Self {
        ArgumentVector(v)
    }
}

impl fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(&self.0))
    }
}

/// Shared prefix: `SUB add --transport T --scope S [oauth flags] NAME`.
fn head(spec: &ServerSpec, subcommand: &str) -> Vec<String> {
    let mut out = vec![
        subcommand.to_string(),
        "add".to_string(),
        "--transport".to_string(),
        spec.transport.as_str().to_string(),
        "--scope".to_string(),
        spec.scope.as_str().to_string(),
    ];
    if let Some(id) = spec.client_id.as_deref().filter(|id| !id.is_empty()) {
        out.push("--client-id".to_string());
        out.push(id.to_string());
    }
    if let Some(secret) = &spec.client_secret {
        out.push("--client-secret".to_string());
        out.push(secret.expose().to_string());
    }
    out.push(spec.name().to_string());
    out
}

fn push_headers(out: &mut Vec<String>, spec: &ServerSpec) {
    for h in &spec.headers {
        out.push("--header".to_string());
        out.push(h.clone());
    }
}

fn require_url(spec: &ServerSpec) -> RegisterResult<&str> {
    spec.url()
        .ok_or_else(|| RegisterError::usage("URL required for http/sse transport"))
}

/// Build the vector for `add` (stdio command or network URL).
pub fn build_add(spec: &ServerSpec, subcommand: &str) -> RegisterResult<ArgumentVector> {
    let mut out = head(spec, subcommand);
    for (k, v) in &spec.env_vars {
        out.push("-e".to_string());
        out.push(format!("{k}={v}"));
    }

    match spec.transport {
        Transport::Http | Transport::Sse => {
            let url = require_url(spec)?;
            if let Some(extra) = spec.command_args.first() {
                return Err(RegisterError::usage(format!(
                    "unexpected argument '{extra}' after URL"
                )));
            }
            out.push(url.to_string());
            push_headers(&mut out, spec);
        }
        Transport::Stdio => {
            if spec.url().is_some() {
                return Err(RegisterError::usage(
                    "stdio transport takes a command, not a URL",
                ));
            }
            if spec.command_args.is_empty() {
                return Err(RegisterError::usage(
                    "command required for stdio transport (usage: add NAME -- CMD [ARGS...])",
                ));
            }
            out.push("--".to_string());
            out.extend(spec.command_args.iter().cloned());
            if !spec.headers.is_empty() {
                warn!(
                    count = spec.headers.len(),
                    "ignoring --header for stdio transport"
                );
            }
        }
    }

    Ok(ArgumentVector(out))
}

/// Build the vector for `remote` (network URL only, no env pairs).
pub fn build_remote(spec: &ServerSpec, subcommand: &str) -> RegisterResult<ArgumentVector> {
    if !spec.transport.is_network() {
        return Err(RegisterError::usage(
            "remote servers use http or sse transport",
        ));
    }
    let url = require_url(spec)?;
    let mut out = head(spec, subcommand);
    out.push(url.to_string());
    push_headers(&mut out, spec);
    Ok(ArgumentVector(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::spec::{Scope, Secret};

    fn http_spec() -> ServerSpec {
        let mut spec = ServerSpec::new("github", Transport::Http);
        spec.url = Some("https://api.githubcopilot.com/mcp/".into());
        spec
    }

    #[test]
    fn network_transport_without_url_is_rejected() {
        for t in [Transport::Http, Transport::Sse] {
            let spec = ServerSpec::new("srv", t);
            assert_eq!(
                build_add(&spec, "mcp").unwrap_err(),
                RegisterError::usage("URL required for http/sse transport")
            );
            assert!(build_remote(&spec, "mcp").is_err());
        }
        let mut blank = ServerSpec::new("srv", Transport::Http);
        blank.url = Some("   ".into());
        assert!(build_add(&blank, "mcp").is_err());
    }

    #[test]
    fn stdio_layout() {
        let mut spec = ServerSpec::new("fs", Transport::Stdio);
        spec.scope = Scope::Project;
        spec.env_vars.push(("ROOT".into(), "/tmp".into()));
        spec.command_args = vec!["npx".into(), "-y".into(), "pkg".into()];
        let v = build_add(&spec, "mcp").unwrap();
        assert_eq!(
            v.as_slice(),
            &[
                "mcp", "add", "--transport", "stdio", "--scope", "project", "fs", "-e",
                "ROOT=/tmp", "--", "npx", "-y", "pkg"
            ]
        );
    }

    #[test]
    fn name_precedes_repeatable_flags_and_url() {
        let mut spec = http_spec();
        spec.env_vars.push(("A".into(), "1".into()));
        spec.env_vars.push(("B".into(), "2".into()));
        spec.headers.push("X-One: 1".into());
        spec.headers.push("X-Two: 2".into());
        let v = build_add(&spec, "mcp").unwrap();

        let name = v.position("github").unwrap();
        let url = v.position("https://api.githubcopilot.com/mcp/").unwrap();
        let first_env = v.position("-e").unwrap();
        let first_header = v.position("--header").unwrap();
        assert!(name < first_env);
        assert!(name < first_header);
        assert!(first_env < url);
        assert!(url < first_header);
    }

    #[test]
    fn stdio_headers_are_not_appended_to_command() {
        let mut spec = ServerSpec::new("fs", Transport::Stdio);
        spec.command_args = vec!["node".into()];
        spec.headers.push("X-A: b".into());
        let v = build_add(&spec, "mcp").unwrap();
        assert_eq!(v.as_slice().last().map(String::as_str), Some("node"));
        assert!(v.position("--header").is_none());
    }

    #[test]
    fn stdio_requires_command_and_rejects_url() {
        let spec = ServerSpec::new("fs", Transport::Stdio);
        assert!(build_add(&spec, "mcp").is_err());
        let mut with_url = ServerSpec::new("fs", Transport::Stdio);
        with_url.url = Some("https://x.dev".into());
        with_url.command_args = vec!["node".into()];
        assert!(build_add(&with_url, "mcp").is_err());
    }

    #[test]
    fn network_spec_with_command_is_rejected() {
        let mut spec = http_spec();
        spec.command_args = vec!["--api-kye".into(), "K".into()];
        assert_eq!(
            build_add(&spec, "mcp").unwrap_err(),
            RegisterError::usage("unexpected argument '--api-kye' after URL")
        );
    }

    #[test]
    fn oauth_flags_sit_before_name() {
        let mut spec = http_spec();
        spec.client_id = Some("cid".into());
        spec.client_secret = Some(Secret::new("shh"));
        let v = build_remote(&spec, "mcp").unwrap();
        assert_eq!(
            v.as_slice(),
            &[
                "mcp",
                "add",
                "--transport",
                "http",
                "--scope",
                "local",
                "--client-id",
                "cid",
                "--client-secret",
                "shh",
                "github",
                "https://api.githubcopilot.com/mcp/"
            ]
        );
    }

    #[test]
    fn remote_layout_ignores_env() {
        let mut spec = http_spec();
        spec.env_vars.push(("A".into(), "1".into()));
        spec.headers.push("Authorization: Bearer t".into());
        let v = build_remote(&spec, "mcp").unwrap();
        assert!(v.position("-e").is_none());
        assert_eq!(v.position("github").unwrap() + 1, v.position(spec.url().unwrap()).unwrap());
        assert_eq!(v.as_slice()[v.as_slice().len() - 2], "--header");
    }

    #[test]
    fn display_is_shell_quoted() {
        let v = ArgumentVector::from(vec!["mcp".to_string(), "a b".to_string()]);
        assert_eq!(v.to_string(), "mcp 'a b'");
    }
}
