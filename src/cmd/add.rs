/*!
`add.rs`

`mcp-reg add <name> [options] (-- CMD [ARGS...] | URL)`

clap only routes the subcommand here; the tokens after `add` are handed to
the engine's own grammar untouched so that `--` and command flags survive.
The one exception is a `--` placed directly after `add`: clap takes it as its
own separator, so the name must always come first.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{Registration, RunOptions, print_outcome, register};
use crate::mcp::{ProcessInvoker, parse_add};
use crate::utils::input::TerminalPrompter;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Server name, options (--scope, --transport, --env K=V, --api-key VAR,
    /// --header "K: V", --bearer, --oauth, --client-id ID, --client-secret),
    /// then `-- CMD [ARGS...]` or a URL.
    ///
    /// NAME must come before `--`: in `add -- npx` the `--` is consumed and
    /// `npx` is taken as the name. Write `add fs -- npx ...` instead.
    #[arg(
        value_name = "NAME [OPTIONS] (-- CMD | URL)",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub tokens: Vec<String>,
}

pub fn execute_add(args: AddArgs, opts: &RunOptions) -> Result<()> {
    let spec = parse_add(&args.tokens)?;
    let outcome = register(
        Registration::Add,
        spec,
        &mut TerminalPrompter,
        &mut ProcessInvoker,
        opts,
        &mut std::io::stdout(),
    )?;
    print_outcome(&outcome);
    Ok(())
}
