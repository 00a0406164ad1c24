use clap::Subcommand;

/// Ticket commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TicketCommands {
    /// Open a ticket.
    Open {
        #[arg(long)]
        title: String,
        /// First description of the problem.
        #[arg(long)]
        message: String,
        #[arg(long)]
        attachment: Option<String>,
    },
    /// Reply to a ticket.
    Reply {
        id: String,
        #[arg(long)]
        message: String,
        /// Idempotency key; resubmitting with the same key returns the
        /// original reply.
        #[arg(long)]
        key: Option<String>,
    },
    /// Show a ticket and its thread.
    Show { id: String },
    /// List tickets: your own, or all of them for staff.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// Only tickets waiting on a staff reply (staff only).
        #[arg(long, conflicts_with = "status")]
        awaiting: bool,
    },
    /// Show a ticket's audit trail, newest first (staff only).
    Audit {
        id: String,
        /// Only entries of this kind: created, message_added, status_changed.
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Start work on an open ticket (staff only).
    Start { id: String },
    /// Mark a ticket in progress as resolved (staff only).
    Resolve { id: String },
    /// Close a resolved ticket (staff only).
    Close { id: String },
}

