/*!
`list.rs`

Implements `mcp-reg list`: show the servers in the project manifest
(`.mcp.json` by default, `--manifest` / `MCP_REG_MANIFEST` to override).

The manifest belongs to the collaborator. It is read, never written, and only
env/header *keys* are shown.

JSON Output Shape:
{
  "status": "ok",
  "manifest": ".mcp.json",
  "count": 2,
  "servers": [
    { "name": "fs", "transport": "stdio", "target": "npx -y pkg",
      "env_keys": ["ROOT"], "header_keys": [] }
  ]
}
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::mcp::manifest::{DEFAULT_MANIFEST, ManifestServer, load_manifest};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project manifest to read
    #[arg(long, env = "MCP_REG_MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs) -> Result<()> {
    let servers = load_manifest(&args.manifest)?;
    if args.json {
        println!("{}", render_json(&args.manifest, &servers)?);
    } else {
        println!("{}", render_human(&args.manifest, &servers, &StyleOptions::detect()));
    }
    Ok(())
}

fn render_json(manifest: &std::path::Path, servers: &[ManifestServer]) -> Result<String> {
    let items: Vec<serde_json::Value> = servers
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name,
                "transport": s.transport,
                "target": s.target,
                "env_keys": s.env_keys,
                "header_keys": s.header_keys,
            })
        })
        .collect();
    let body = serde_json::json!({
        "status": "ok",
        "manifest": manifest.display().to_string(),
        "count": servers.len(),
        "servers": items,
    });
    serde_json::to_string_pretty(&body).context("Failed to serialize server list")
}

fn render_human(manifest: &std::path::Path, servers: &[ManifestServer], style: &StyleOptions) -> String {
    let header = box_header(
        format!("{} Project MCP servers ({})", emoji("list", style), servers.len()),
        Some(format!("manifest={}", manifest.display())),
        style,
    );
    if servers.is_empty() {
        return format!(
            "{header}\n{}",
            color(
                Role::Dim,
                format!("{} (none) - register one with `mcp-reg add`", emoji("info", style)),
                style
            )
            .trim_start()
        );
    }

    let rows: Vec<Vec<String>> = servers
        .iter()
        .map(|s| {
            let keys: Vec<&str> = s
                .env_keys
                .iter()
                .chain(&s.header_keys)
                .map(String::as_str)
                .collect();
            vec![
                s.name.clone(),
                s.transport.clone(),
                s.target.clone(),
                if keys.is_empty() {
                    "-".to_string()
                } else {
                    keys.join(", ")
                },
            ]
        })
        .collect();
    format!(
        "{header}\n{}",
        table(&["NAME", "TRANSPORT", "TARGET", "SECRETS"], &rows, style)
    )
}
