//! Display-safe copies of argument vectors.
//!
//! Only the token right after a sensitive flag is rewritten; the vector keeps
//! its length so a preview lines up with what actually runs.

use super::builder::ArgumentVector;

pub const MASK: &str = "****";

fn mask_token(flag: &str, value: &str) -> Option<String> {
    match flag {
        "-e" | "--env" => Some(match value.split_once('=') {
            Some((key, _)) => format!("{key}={MASK}"),
            None => MASK.to_string(),
        }),
        "--header" | "-H" if value.to_ascii_lowercase().contains("bearer") => {
            Some(format!("Authorization: Bearer {MASK}"))
        }
        "--client-secret" => Some(MASK.to_string()),
        _ => None,
    }
}

/// Mask secrets in a raw token list. Never touches the input.
pub fn redact_tokens(tokens: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let masked = i
            .checked_sub(1)
            .and_then(|prev| mask_token(&tokens[prev], token));
        out.push(masked.unwrap_or_else(|| token.clone()));
    }
    out
}

/// Mask secrets in a built vector.
pub fn redact(args: &ArgumentVector) -> ArgumentVector {
    ArgumentVector::from(redact_tokens(args.as_slice()))
}
