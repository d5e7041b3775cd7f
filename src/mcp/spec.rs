//! Server specification (what the user asked to register).
//!
//! ServerSpec { name, scope, transport, env_vars, headers, command_args, url, auth, client_id }
//! Secrets: SecretSlot (which credential) + Secret (masked wrapper).
//!
use std::fmt;

use crate::error::{RegisterError, RegisterResult};

/// Configuration tier the collaborator persists the server into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Local,
    Project,
    User,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Project => "project",
            Scope::User => "user",
        }
    }

    pub fn parse(raw: &str) -> RegisterResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Scope::Local),
            "project" => Ok(Scope::Project),
            "user" => Ok(Scope::User),
            other => Err(RegisterError::usage(format!(
                "invalid scope '{other}' (expected local|project|user)"
            ))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire mechanism used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
    Sse,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
            Transport::Sse => "sse",
        }
    }

    pub fn parse(raw: &str) -> RegisterResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            "sse" => Ok(Transport::Sse),
            other => Err(RegisterError::usage(format!(
                "invalid transport '{other}' (expected stdio|http|sse)"
            ))),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Transport::Http | Transport::Sse)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the registered server authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    None,
    /// Prompt for a value and pass it as env var `VAR`.
    ApiKeyEnv { var: String },
    /// Prompt for a token and send it as `Authorization: Bearer <token>`.
    BearerPrompt,
    /// OAuth handled by the collaborator; `client_secret` requests a prompt.
    OAuthClientCredentials { client_secret: bool },
}

/// Logical credential a prompt fills in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSlot {
    ApiKey { var: String },
    BearerToken,
    ClientSecret,
}

impl SecretSlot {
    /// Label shown before the masked input.
    pub fn prompt_label(&self) -> String {
        match self {
            SecretSlot::ApiKey { var } => format!("Enter value for {var}"),
            SecretSlot::BearerToken => "Enter bearer token".to_string(),
            SecretSlot::ClientSecret => "Enter OAuth client secret".to_string(),
        }
    }

    /// Noun used in the "no <value> provided" failure.
    pub fn noun(&self) -> &'static str {
        match self {
            SecretSlot::ApiKey { .. } => "API key",
            SecretSlot::BearerToken => "token",
            SecretSlot::ClientSecret => "client secret",
        }
    }
}

/// A captured credential. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Everything needed to build one collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    name: String,
    pub scope: Scope,
    pub transport: Transport,
    pub env_vars: Vec<(String, String)>,
    pub headers: Vec<String>,
    pub command_args: Vec<String>,
    pub url: Option<String>,
    pub auth: AuthMode,
    pub client_id: Option<String>,
    /// Filled by the client-secret prompt; emitted after `--client-secret`.
    pub client_secret: Option<Secret>,
    pub resolved_secrets: Vec<(SecretSlot, Secret)>,
}

impl ServerSpec {
    pub fn new(name: impl Into<String>, transport: Transport) -> Self {
        Self {
            name: name.into(),
            scope: Scope::default(),
            transport,
            env_vars: Vec::new(),
            headers: Vec::new(),
            command_args: Vec::new(),
            url: None,
            auth: AuthMode::None,
            client_id: None,
            client_secret: None,
            resolved_secrets: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-empty URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Secret slots the auth mode requires, in prompt order.
    pub fn required_secrets(&self) -> Vec<SecretSlot> {
        match &self.auth {
            AuthMode::None => Vec::new(),
            AuthMode::ApiKeyEnv { var } => vec![SecretSlot::ApiKey { var: var.clone() }],
            AuthMode::BearerPrompt => vec![SecretSlot::BearerToken],
            AuthMode::OAuthClientCredentials { client_secret } => {
                if *client_secret {
                    vec![SecretSlot::ClientSecret]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Move every resolved secret into its env var / header / client secret
    /// and clear the slot list.
    pub fn apply_secrets(&mut self) {
        for (slot, secret) in std::mem::take(&mut self.resolved_secrets) {
            match slot {
                SecretSlot::ApiKey { var } => {
                    let value = secret.into_inner();
                    if let Some(entry) = self.env_vars.iter_mut().find(|(k, _)| *k == var) {
                        entry.1 = value;
                    } else {
                        self.env_vars.push((var, value));
                    }
                }
                SecretSlot::BearerToken => {
                    self.headers
                        .retain(|h| !header_name(h).eq_ignore_ascii_case("authorization"));
                    self.headers
                        .push(format!("Authorization: Bearer {}", secret.expose()));
                }
                SecretSlot::ClientSecret => {
                    self.client_secret = Some(secret);
                }
            }
        }
    }
}

fn header_name(raw: &str) -> &str {
    raw.split_once(':').map(|(k, _)| k.trim()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_and_transport_parse_case_insensitive() {
        assert_eq!(Scope::parse("Project").unwrap(), Scope::Project);
        assert_eq!(Transport::parse(" SSE ").unwrap(), Transport::Sse);
        assert!(matches!(
            Transport::parse("ws"),
            Err(RegisterError::Usage(_))
        ));
    }

    #[test]
    fn secret_formatting_is_masked() {
        let s = Secret::new("hunter2");
        assert_eq!(format!("{s}"), "****");
        assert_eq!(format!("{s:?}"), "Secret(****)");
        assert_eq!(s.expose(), "hunter2");
    }

    #[test]
    fn spec_debug_never_shows_resolved_values() {
        let mut spec = ServerSpec::new("srv", Transport::Http);
        spec.resolved_secrets
            .push((SecretSlot::BearerToken, Secret::new("tok-123")));
        assert!(!format!("{spec:?}").contains("tok-123"));
    }

    #[test]
    fn apply_secrets_moves_values_and_clears_slots() {
        let mut spec = ServerSpec::new("srv", Transport::Http);
        spec.headers.push("authorization: stale".into());
        spec.resolved_secrets
            .push((SecretSlot::BearerToken, Secret::new("tok")));
        spec.resolved_secrets.push((
            SecretSlot::ApiKey {
                var: "API_KEY".into(),
            },
            Secret::new("k1"),
        ));
        spec.resolved_secrets
            .push((SecretSlot::ClientSecret, Secret::new("cs")));
        spec.apply_secrets();

        assert!(spec.resolved_secrets.is_empty());
        assert_eq!(spec.headers, vec!["Authorization: Bearer tok".to_string()]);
        assert_eq!(spec.env_vars, vec![("API_KEY".into(), "k1".into())]);
        assert_eq!(spec.client_secret.as_ref().map(Secret::expose), Some("cs"));
    }

    #[test]
    fn api_key_overrides_existing_env_entry() {
        let mut spec = ServerSpec::new("srv", Transport::Stdio);
        spec.env_vars.push(("API_KEY".into(), "placeholder".into()));
        spec.resolved_secrets.push((
            SecretSlot::ApiKey {
                var: "API_KEY".into(),
            },
            Secret::new("real"),
        ));
        spec.apply_secrets();
        assert_eq!(spec.env_vars, vec![("API_KEY".into(), "real".into())]);
    }

    #[test]
    fn required_secrets_follow_auth_mode() {
        let mut spec = ServerSpec::new("srv", Transport::Http);
        assert!(spec.required_secrets().is_empty());
        spec.auth = AuthMode::OAuthClientCredentials {
            client_secret: false,
        };
        assert!(spec.required_secrets().is_empty());
        spec.auth = AuthMode::OAuthClientCredentials {
            client_secret: true,
        };
        assert_eq!(spec.required_secrets(), vec![SecretSlot::ClientSecret]);
        spec.auth = AuthMode::BearerPrompt;
        assert_eq!(spec.required_secrets()[0].noun(), "token");
    }
}
