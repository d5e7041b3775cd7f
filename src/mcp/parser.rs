//! Token grammar for `add` and `remote`.
//!
//! parse_add    -> ServerSpec (stdio command, or http/sse URL)
//! parse_remote -> ServerSpec (always http/sse)
//! derive_server_name -> name guessed from a URL host
//!
//! The `add` grammar is deliberately permissive: the first token it does not
//! recognise starts command capture, and everything after it (flags included)
//! belongs to the subprocess argv. Once a URL is bound there is no command to
//! capture, so an unrecognised token after it is a usage error.
//!
use tracing::trace;
use url::Url;

use super::spec::{AuthMode, Scope, ServerSpec, Transport};
use crate::error::{RegisterError, RegisterResult};

/// Fallback name for URLs without a usable host.
pub const DEFAULT_REMOTE_NAME: &str = "remote-gateway";

/// Options shared by both grammars, collected before the spec is assembled.
#[derive(Debug, Default)]
struct Collected {
    scope: Option<Scope>,
    transport: Option<Transport>,
    env_vars: Vec<(String, String)>,
    headers: Vec<String>,
    auth: AuthMode,
    client_id: Option<String>,
}

impl Collected {
    fn set_oauth(&mut self, wants_secret: bool) {
        let already = matches!(
            self.auth,
            AuthMode::OAuthClientCredentials {
                client_secret: true
            }
        );
        self.auth = AuthMode::OAuthClientCredentials {
            client_secret: already || wants_secret,
        };
    }

    fn into_spec(self, name: String, default_transport: Transport) -> ServerSpec {
        let mut spec = ServerSpec::new(name, self.transport.unwrap_or(default_transport));
        spec.scope = self.scope.unwrap_or_default();
        spec.env_vars = self.env_vars;
        spec.headers = self.headers;
        spec.auth = self.auth;
        spec.client_id = self.client_id;
        spec
    }
}

/// Outcome of offering one token to the shared flag table.
enum Flag {
    Consumed,
    Unknown,
}

/// Handle a flag common to `add` and `remote`. `rest` yields the following
/// tokens so value flags can take their argument.
fn take_common_flag<'a>(
    token: &str,
    rest: &mut impl Iterator<Item = &'a String>,
    out: &mut Collected,
    allow_env: bool,
) -> RegisterResult<Flag> {
    match token {
        "--scope" => out.scope = Some(Scope::parse(value_for(token, rest)?)?),
        "--transport" => out.transport = Some(Transport::parse(value_for(token, rest)?)?),
        "--header" | "-H" => out.headers.push(value_for(token, rest)?.to_string()),
        "--client-id" => {
            out.client_id = Some(value_for(token, rest)?.to_string());
            out.set_oauth(false);
        }
        "--client-secret" => out.set_oauth(true),
        "--oauth" => out.set_oauth(false),
        "--bearer" => out.auth = AuthMode::BearerPrompt,
        "--env" | "-e" if allow_env => {
            let raw = value_for(token, rest)?;
            out.env_vars.push(parse_env_pair(raw)?);
        }
        "--api-key" if allow_env => {
            out.auth = AuthMode::ApiKeyEnv {
                var: value_for(token, rest)?.to_string(),
            };
        }
        _ => return Ok(Flag::Unknown),
    }
    Ok(Flag::Consumed)
}

fn value_for<'a>(
    flag: &str,
    rest: &mut impl Iterator<Item = &'a String>,
) -> RegisterResult<&'a str> {
    rest.next()
        .map(String::as_str)
        .ok_or_else(|| RegisterError::usage(format!("{flag} requires a value")))
}

fn parse_env_pair(raw: &str) -> RegisterResult<(String, String)> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(RegisterError::usage(format!(
            "invalid --env (expected KEY=VALUE): {raw}"
        ))),
    }
}

fn looks_like_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}

/// Parse `add <name> [flags...] (-- CMD... | URL | CMD...)`.
pub fn parse_add(tokens: &[String]) -> RegisterResult<ServerSpec> {
    let Some((name, tail)) = tokens.split_first() else {
        return Err(RegisterError::usage("server name is required"));
    };
    if name.trim().is_empty() || name.starts_with('-') {
        return Err(RegisterError::usage("server name is required"));
    }

    let mut collected = Collected::default();
    let mut url: Option<String> = None;
    let mut command_args: Vec<String> = Vec::new();

    let mut iter = tail.iter().enumerate();
    while let Some((idx, token)) = iter.next() {
        if token == "--" {
            command_args = tail[idx + 1..].to_vec();
            break;
        }
        let mut values = iter.by_ref().map(|(_, t)| t);
        match take_common_flag(token, &mut values, &mut collected, true)? {
            Flag::Consumed => continue,
            Flag::Unknown => {}
        }
        if url.is_some() {
            return Err(RegisterError::usage(format!(
                "unexpected argument '{token}' after URL"
            )));
        }
        if looks_like_url(token) {
            url = Some(token.clone());
            continue;
        }
        trace!(token = %token, "command capture starts");
        command_args = tail[idx..].to_vec();
        break;
    }

    let default_transport = if url.is_some() {
        Transport::Http
    } else {
        Transport::Stdio
    };
    let mut spec = collected.into_spec(name.clone(), default_transport);
    spec.url = url;
    spec.command_args = command_args;
    Ok(spec)
}

/// Parse `remote <url> [--name N] [flags...]`.
pub fn parse_remote(tokens: &[String]) -> RegisterResult<ServerSpec> {
    let Some((url, tail)) = tokens.split_first() else {
        return Err(RegisterError::usage("URL is required"));
    };
    if url.trim().is_empty() || url.starts_with('-') {
        return Err(RegisterError::usage("URL is required"));
    }

    let mut collected = Collected::default();
    let mut name: Option<String> = None;

    let mut iter = tail.iter();
    while let Some(token) = iter.next() {
        if token == "--name" {
            name = Some(value_for(token, &mut iter)?.to_string());
            continue;
        }
        match take_common_flag(token, &mut iter, &mut collected, false)? {
            Flag::Consumed => {}
            Flag::Unknown => {
                return Err(RegisterError::usage(format!(
                    "unexpected argument '{token}' for remote"
                )));
            }
        }
    }

    if collected.transport == Some(Transport::Stdio) {
        return Err(RegisterError::usage(
            "remote servers use http or sse transport",
        ));
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| derive_server_name(url));
    let mut spec = collected.into_spec(name, Transport::Http);
    spec.url = Some(url.clone());
    Ok(spec)
}

/// Guess a server name from a URL host: one leading `mcp.`/`www.` label is
/// dropped and dots become dashes.
///
/// - "https://mcp.sentry.dev/mcp" -> "sentry-dev"
/// - "://invalid" -> "remote-gateway"
pub fn derive_server_name(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw.trim()) else {
        return DEFAULT_REMOTE_NAME.to_string();
    };
    let Some(host) = parsed.host_str().filter(|h| !h.is_empty()) else {
        return DEFAULT_REMOTE_NAME.to_string();
    };
    let host = host.trim_matches(|c| c == '[' || c == ']');
    let trimmed = ["mcp.", "www."]
        .iter()
        .find_map(|p| host.strip_prefix(*p).filter(|rest| !rest.is_empty()))
        .unwrap_or(host);
    let name = trimmed.replace(['.', ':'], "-");
    if name.is_empty() {
        DEFAULT_REMOTE_NAME.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sentinel_captures_stdio_command() {
        let spec = parse_add(&toks(&["srv", "--", "npx", "-y", "pkg"])).unwrap();
        assert_eq!(spec.transport, Transport::Stdio);
        assert_eq!(spec.command_args, toks(&["npx", "-y", "pkg"]));
        assert!(spec.url.is_none());
    }

    #[test]
    fn url_defaults_to_http() {
        let spec = parse_add(&toks(&["github", "https://api.githubcopilot.com/mcp/"])).unwrap();
        assert_eq!(spec.transport, Transport::Http);
        assert_eq!(spec.url(), Some("https://api.githubcopilot.com/mcp/"));
        assert!(spec.command_args.is_empty());
    }

    #[test]
    fn empty_tokens_require_name() {
        let err = parse_add(&[]).unwrap_err();
        assert_eq!(err, RegisterError::usage("server name is required"));
    }

    #[test]
    fn flags_before_command_are_parsed() {
        let spec = parse_add(&toks(&[
            "fs",
            "--scope",
            "project",
            "--env",
            "ROOT=/tmp",
            "-e",
            "DEBUG=1",
            "--api-key",
            "FS_TOKEN",
            "--",
            "node",
            "server.js",
        ]))
        .unwrap();
        assert_eq!(spec.scope, Scope::Project);
        assert_eq!(
            spec.env_vars,
            vec![
                ("ROOT".to_string(), "/tmp".to_string()),
                ("DEBUG".to_string(), "1".to_string())
            ]
        );
        assert_eq!(
            spec.auth,
            AuthMode::ApiKeyEnv {
                var: "FS_TOKEN".into()
            }
        );
        assert_eq!(spec.command_args, toks(&["node", "server.js"]));
    }

    #[test]
    fn first_unknown_token_captures_everything_after() {
        let spec = parse_add(&toks(&["srv", "python", "-m", "server", "--scope", "user"])).unwrap();
        assert_eq!(spec.transport, Transport::Stdio);
        assert_eq!(
            spec.command_args,
            toks(&["python", "-m", "server", "--scope", "user"])
        );
        assert_eq!(spec.scope, Scope::Local);
    }

    #[test]
    fn unknown_flag_before_url_starts_command_capture() {
        let spec = parse_add(&toks(&["srv", "--verbose", "https://example.com/mcp"])).unwrap();
        assert_eq!(spec.transport, Transport::Stdio);
        assert!(spec.url.is_none());
        assert_eq!(
            spec.command_args,
            toks(&["--verbose", "https://example.com/mcp"])
        );
    }

    #[test]
    fn token_after_url_is_rejected() {
        let err = parse_add(&toks(&["srv", "https://x.dev/mcp", "--api-kye", "K", "extra"]))
            .unwrap_err();
        assert_eq!(
            err,
            RegisterError::usage("unexpected argument '--api-kye' after URL")
        );
        assert!(parse_add(&toks(&["srv", "https://a.dev", "https://b.dev"])).is_err());
    }

    #[test]
    fn known_flags_after_url_are_still_parsed() {
        let spec = parse_add(&toks(&["srv", "https://x.dev/mcp", "--bearer", "--scope", "user"]))
            .unwrap();
        assert_eq!(spec.url(), Some("https://x.dev/mcp"));
        assert_eq!(spec.auth, AuthMode::BearerPrompt);
        assert_eq!(spec.scope, Scope::User);
        assert!(spec.command_args.is_empty());
    }

    #[test]
    fn headers_and_bearer_with_sse() {
        let spec = parse_add(&toks(&[
            "api",
            "--transport",
            "sse",
            "--header",
            "X-Team: core",
            "--bearer",
            "https://example.com/sse",
        ]))
        .unwrap();
        assert_eq!(spec.transport, Transport::Sse);
        assert_eq!(spec.headers, toks(&["X-Team: core"]));
        assert_eq!(spec.auth, AuthMode::BearerPrompt);
    }

    #[test]
    fn oauth_flags_merge() {
        let spec = parse_add(&toks(&[
            "svc",
            "--client-secret",
            "--client-id",
            "abc",
            "https://example.com/mcp",
        ]))
        .unwrap();
        assert_eq!(spec.client_id.as_deref(), Some("abc"));
        assert_eq!(
            spec.auth,
            AuthMode::OAuthClientCredentials {
                client_secret: true
            }
        );
    }

    #[test]
    fn value_flag_without_value_is_usage_error() {
        let err = parse_add(&toks(&["srv", "--scope"])).unwrap_err();
        assert_eq!(err, RegisterError::usage("--scope requires a value"));
    }

    #[test]
    fn env_without_equals_is_rejected() {
        let err = parse_add(&toks(&["srv", "--env", "NOPE", "--", "x"])).unwrap_err();
        assert!(err.to_string().contains("expected KEY=VALUE"));
    }

    #[test]
    fn remote_derives_name_and_defaults_http() {
        let spec = parse_remote(&toks(&["https://mcp.sentry.dev/mcp", "--bearer"])).unwrap();
        assert_eq!(spec.name(), "sentry-dev");
        assert_eq!(spec.transport, Transport::Http);
        assert_eq!(spec.auth, AuthMode::BearerPrompt);
    }

    #[test]
    fn remote_explicit_name_and_sse() {
        let spec = parse_remote(&toks(&[
            "https://example.com/sse",
            "--name",
            "events",
            "--transport",
            "sse",
            "--scope",
            "user",
        ]))
        .unwrap();
        assert_eq!(spec.name(), "events");
        assert_eq!(spec.transport, Transport::Sse);
        assert_eq!(spec.scope, Scope::User);
    }

    #[test]
    fn remote_rejects_unknown_and_missing_url() {
        assert_eq!(
            parse_remote(&[]).unwrap_err(),
            RegisterError::usage("URL is required")
        );
        assert!(parse_remote(&toks(&["https://x.dev", "--env", "A=1"])).is_err());
        assert!(parse_remote(&toks(&["https://x.dev", "--transport", "stdio"])).is_err());
    }

    #[test]
    fn derive_server_name_cases() {
        assert_eq!(derive_server_name("https://mcp.sentry.dev/mcp"), "sentry-dev");
        assert_eq!(derive_server_name("://invalid"), "remote-gateway");
        assert_eq!(derive_server_name("https://www.example.org/"), "example-org");
        assert_eq!(derive_server_name("http://localhost:8080/mcp"), "localhost");
        assert_eq!(
            derive_server_name("https://api.githubcopilot.com/mcp/"),
            "api-githubcopilot-com"
        );
    }
}
