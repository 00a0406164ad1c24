mod audit;
mod list;
mod open;
mod reply;
mod show;
mod transition;

use desk_core::enums::TicketAction;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TicketCommands;
use crate::context::AppContext;

/// Handle `desk ticket`.
pub async fn handle(
    action: &TicketCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TicketCommands::Open {
            title,
            message,
            attachment,
        } => open::run(title, message, attachment.as_deref(), ctx, flags).await,
        TicketCommands::Reply { id, message, key } => {
            reply::run(id, message, key.as_deref(), ctx, flags).await
        }
        TicketCommands::Show { id } => show::run(id, ctx, flags).await,
        TicketCommands::List {
            status,
            limit,
            awaiting,
        } => list::run(status.as_deref(), *limit, *awaiting, ctx, flags).await,
        TicketCommands::Audit { id, action, limit } => {
            audit::run(id, action.as_deref(), *limit, ctx, flags).await
        }
        TicketCommands::Start { id } => transition::run(id, TicketAction::Start, ctx, flags).await,
        TicketCommands::Resolve { id } => {
            transition::run(id, TicketAction::Resolve, ctx, flags).await
        }
        TicketCommands::Close { id } => transition::run(id, TicketAction::Close, ctx, flags).await,
    }
}
