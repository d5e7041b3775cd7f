use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod error;
mod mcp;
mod utils;

use cmd::{AddArgs, ListArgs, RemoteArgs, RunOptions};
use error::RegisterError;

/// mcp-reg - register MCP servers through the Claude Code CLI
///
/// Command layout:
///   mcp-reg add <name> [options] (-- CMD [ARGS...] | URL)
///   mcp-reg remote <url> [--name N] [options]
///   mcp-reg list [--manifest PATH] [--json]
///
/// Secrets (--api-key VAR, --bearer, --client-secret) are typed at a masked
/// prompt and never echoed; the printed command always shows `****`.
///
/// Global flags / env:
///   -v / -vv          Increase verbosity (RUST_LOG overrides)
///   -q / --quiet      Errors only
///   --cli PATH        Collaborator binary (MCP_REG_CLI, default `claude`)
///   --dry-run         Print the command without running it (MCP_REG_DRY_RUN)
///
/// Examples:
///   mcp-reg add fs --env ROOT=/srv -- npx -y @modelcontextprotocol/server-filesystem /srv
///   mcp-reg add github --bearer https://api.githubcopilot.com/mcp/
///   mcp-reg remote https://mcp.sentry.dev/mcp --oauth --scope user
#[derive(Parser, Debug)]
#[command(
    name = "mcp-reg",
    version,
    author,
    about = "mcp-reg - register MCP servers with masked credential capture",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Collaborator CLI that performs the registration
    #[arg(long, global = true, env = "MCP_REG_CLI", default_value = mcp::DEFAULT_CLI)]
    cli: String,

    /// Print the (redacted) command and stop before running it
    #[arg(long, global = true, env = "MCP_REG_DRY_RUN")]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a local (stdio) or network server
    Add(AddArgs),

    /// Register a network server by URL
    Remote(RemoteArgs),

    /// List servers in the project manifest
    List(ListArgs),
}

fn run(cli: Cli) -> Result<()> {
    let opts = RunOptions {
        cli: cli.cli,
        subcommand: mcp::DEFAULT_SUBCOMMAND.to_string(),
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Add(args) => cmd::execute_add(args, &opts),
        Commands::Remote(args) => cmd::execute_remote(args, &opts),
        Commands::List(args) => cmd::execute_list(args),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    if let Err(err) = run(cli) {
        let style = cmd::format::StyleOptions::detect();
        let code = match err.downcast_ref::<RegisterError>() {
            Some(reg) => {
                eprintln!("{}", cmd::format::error_box(reg, &style));
                reg.exit_code()
            }
            None => {
                tracing::error!("{err:#}");
                1
            }
        };
        std::process::exit(code);
    }
}
