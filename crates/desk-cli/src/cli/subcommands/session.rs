use clap::Subcommand;

/// Session lifecycle commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SessionCommands {
    /// Issue a session and store its token in ~/.desk/credentials.
    ///
    /// Stands in for the storefront's sign-in: the role is taken as given,
    /// so anyone who can reach the database can log in as staff.
    Login {
        /// User id the session belongs to.
        #[arg(long)]
        user: String,
        /// Role: customer, pro_customer, user, editor, manager, admin, super_admin.
        #[arg(long)]
        role: String,
        /// Session lifetime in seconds (defaults to sessions.ttl_secs).
        #[arg(long)]
        ttl_secs: Option<u64>,
    },
    /// Revoke the current session and forget its token.
    Logout,
    /// Revoke every session of a user (staff only).
    Revoke {
        #[arg(long)]
        user: String,
    },
    /// Show who the current token belongs to.
    Status,
    /// Delete sessions that expired or were revoked (staff only).
    Purge {
        /// Keep sessions that ended within this many days.
        #[arg(long, default_value_t = 0)]
        older_than_days: u32,
    },
}
