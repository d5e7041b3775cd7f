//! Registration engine.
//!
//! parser   : raw tokens -> ServerSpec
//! builder  : ServerSpec -> ArgumentVector (order-correct)
//! redact   : ArgumentVector -> display-safe copy
//! invoke   : run the collaborator with inherited stdio
//! manifest : read-only view of `.mcp.json` for `list`
//!
pub mod builder;
pub mod invoke;
pub mod manifest;
pub mod parser;
pub mod redact;
pub mod spec;

pub use builder::{ArgumentVector, DEFAULT_SUBCOMMAND, build_add, build_remote};
pub use invoke::{DEFAULT_CLI, Invoker, ProcessInvoker};
pub use parser::{parse_add, parse_remote};
pub use redact::redact;
pub use spec::{AuthMode, Secret, ServerSpec};
