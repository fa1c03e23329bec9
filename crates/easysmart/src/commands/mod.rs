//! Command dispatch: bridges CLI args -> switch calls -> output formatting.

pub mod config_cmd;
pub mod info;
pub mod ports;
pub mod watch;

use easysmart_core::SwitchConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a switch-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: SwitchConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Info => info::handle(config, global).await,
        Command::Ports(args) => ports::handle(config, &args, global).await,
        Command::Watch(args) => watch::handle(config, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
