//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod listings;
pub mod util;
pub mod watch;
