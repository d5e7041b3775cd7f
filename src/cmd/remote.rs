/*!
`remote.rs`

`mcp-reg remote <url> [--name N] [options]`

Shortcut for network servers. The name defaults to one derived from the URL
host (`https://mcp.sentry.dev/mcp` -> `sentry-dev`).
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{Registration, RunOptions, print_outcome, register};
use crate::mcp::{ProcessInvoker, parse_remote};
use crate::utils::input::TerminalPrompter;

#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// URL, then options (--name N, --scope, --transport http|sse,
    /// --header "K: V", --bearer, --oauth, --client-id ID, --client-secret)
    #[arg(
        value_name = "URL [OPTIONS]",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub tokens: Vec<String>,
}

pub fn execute_remote(args: RemoteArgs, opts: &RunOptions) -> Result<()> {
    let spec = parse_remote(&args.tokens)?;
    let outcome = register(
        Registration::Remote,
        spec,
        &mut TerminalPrompter,
        &mut ProcessInvoker,
        opts,
        &mut std::io::stdout(),
    )?;
    print_outcome(&outcome);
    Ok(())
}
