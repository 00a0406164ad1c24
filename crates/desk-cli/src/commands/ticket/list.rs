use desk_core::enums::TicketStatus;
use desk_db::repos::ticket::TicketFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Creators see their own tickets, staff see all of them. `awaiting` lists
/// the staff queue instead.
pub async fn run(
    status: Option<&str>,
    limit: Option<u32>,
    awaiting: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let limit = ctx.list_limit(limit, flags)?;

    if awaiting {
        ctx.require_staff().await?;
        let tickets = ctx.service.list_awaiting_staff(limit).await?;
        return output(&tickets, flags.format);
    }

    let viewer = ctx.identity().await?;
    let status = status
        .map(|value| parse_enum::<TicketStatus>(value, "status"))
        .transpose()?;
    let filter = TicketFilter {
        creator_id: (!viewer.is_staff()).then(|| viewer.id.clone()),
        status,
        limit: Some(limit),
    };

    let tickets = ctx.service.list_tickets(&filter).await?;
    output(&tickets, flags.format)
}
