mod login;
mod logout;
mod purge;
mod revoke;
mod status;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SessionCommands;
use crate::context::AppContext;

/// Handle `desk session`.
pub async fn handle(
    action: &SessionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SessionCommands::Login {
            user,
            role,
            ttl_secs,
        } => login::run(user, role, *ttl_secs, ctx, flags).await,
        SessionCommands::Logout => logout::run(ctx, flags).await,
        SessionCommands::Revoke { user } => revoke::run(user, ctx, flags).await,
        SessionCommands::Status => status::run(ctx, flags).await,
        SessionCommands::Purge { older_than_days } => {
            purge::run(*older_than_days, ctx, flags).await
        }
    }
}
