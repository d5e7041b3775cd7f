//! Read-only view of the project server manifest (`.mcp.json`).
//!
//! The collaborator owns this file. We only parse it for display, so unknown
//! fields, `null`s and ill-typed values are skipped rather than failing the
//! listing. Env and header values are never surfaced.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RegisterError, RegisterResult};

/// Default manifest location, relative to the working directory.
pub const DEFAULT_MANIFEST: &str = ".mcp.json";

#[derive(Debug, Default, Deserialize)]
struct ManifestFile {
    #[serde(rename = "mcpServers", default)]
    mcp_servers: Option<BTreeMap<String, Value>>,
}

/// One entry as written by the collaborator. Every field is read loosely:
/// `null` or a value of the wrong type counts as absent.
#[derive(Debug, Default, Deserialize)]
struct RawEntry {
    #[serde(default)]
    command: Option<Value>,
    #[serde(default)]
    args: Option<Value>,
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    url: Option<Value>,
    #[serde(default)]
    env: Option<Value>,
    #[serde(default)]
    headers: Option<Value>,
}

fn text(v: Option<Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn text_list(v: Option<Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn keys(v: Option<Value>) -> Vec<String> {
    match v {
        Some(Value::Object(map)) => {
            let mut keys: Vec<String> = map.into_iter().map(|(k, _)| k).collect();
            keys.sort();
            keys
        }
        _ => Vec::new(),
    }
}

/// One server as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestServer {
    pub name: String,
    pub transport: String,
    /// Command line (stdio) or URL (http/sse).
    pub target: String,
    pub env_keys: Vec<String>,
    pub header_keys: Vec<String>,
}

impl ManifestServer {
    fn from_entry(name: String, value: Value) -> Self {
        let raw: RawEntry = serde_json::from_value(value).unwrap_or_default();
        let kind = text(raw.kind);
        let (transport, target) = match (text(raw.url), text(raw.command)) {
            (Some(url), _) => (kind.unwrap_or_else(|| "http".to_string()), url),
            (None, Some(cmd)) => {
                let mut argv = vec![cmd];
                argv.extend(text_list(raw.args));
                (
                    kind.unwrap_or_else(|| "stdio".to_string()),
                    shell_words::join(&argv),
                )
            }
            (None, None) => (kind.unwrap_or_else(|| "unknown".to_string()), String::new()),
        };
        ManifestServer {
            name,
            transport,
            target,
            env_keys: keys(raw.env),
            header_keys: keys(raw.headers),
        }
    }
}

/// Parse manifest text into servers sorted by name.
pub fn parse_manifest(raw: &str) -> RegisterResult<Vec<ManifestServer>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: ManifestFile =
        serde_json::from_str(raw).map_err(|e| RegisterError::Manifest(e.to_string()))?;
    Ok(file
        .mcp_servers
        .unwrap_or_default()
        .into_iter()
        .map(|(name, raw)| ManifestServer::from_entry(name, raw))
        .collect())
}

/// Load the manifest at `path`. A missing file is an empty listing.
pub fn load_manifest(path: &Path) -> RegisterResult<Vec<ManifestServer>> {
    match std::fs::read_to_string(path) {
        Ok(raw) => parse_manifest(&raw).map_err(|e| match e {
            RegisterError::Manifest(msg) => {
                RegisterError::Manifest(format!("{}: {msg}", path.display()))
            }
            other => other,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(RegisterError::Manifest(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}
