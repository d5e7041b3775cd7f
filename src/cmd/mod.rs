/*!
Command dispatcher module.

  src/cmd/
    mod.rs      (this file: declarations + re-exports)
    add.rs      (AddArgs    + execute_add)
    remote.rs   (RemoteArgs + execute_remote)
    list.rs     (ListArgs   + execute_list)
    shared.rs   (registration pipeline, RunOptions, success report)
    format.rs   (boxes / tables / command preview)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that returns `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and stay minimal; `add` and `remote`
    forward raw tokens to the engine's parser.
*/

pub mod add;
pub mod format;
pub mod list;
pub mod remote;
pub mod shared;

pub use add::{AddArgs, execute_add};
pub use list::{ListArgs, execute_list};
pub use remote::{RemoteArgs, execute_remote};
pub use shared::RunOptions;
