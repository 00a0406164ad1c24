use clap::{Args, Subcommand};

use crate::cli::subcommands::{SessionCommands, TicketCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the local database and a default config file.
    Init(InitArgs),
    /// Session management.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Tickets and their threads.
    Ticket {
        #[command(subcommand)]
        action: TicketCommands,
    },
}

/// Arguments for `desk init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing `.desk/config.toml`.
    #[arg(long)]
    pub force: bool,
}
