use desk_core::enums::TicketAction;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `desk ticket start|resolve|close`.
pub async fn run(
    id: &str,
    action: TicketAction,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let transitioned = ctx
        .gateway
        .transition(ctx.token.as_deref(), id, action)
        .await?;
    output(&transitioned, flags.format)
}
