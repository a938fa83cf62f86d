//! CLI command handlers.

mod config;
mod extract;
mod fetch;
mod resolve;

pub use config::run_config_show_command;
pub use extract::run_extract_command;
pub use fetch::run_fetch_command;
pub use resolve::run_resolve_command;

/// Logged when a reference is empty, mirroring the reader's "add ?url=" hint.
pub(crate) const MISSING_LINK_HINT: &str =
    "missing book link; pass a reference or add ?url=<link> to the reader page address";
