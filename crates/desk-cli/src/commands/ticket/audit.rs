use desk_core::entities::AuditEntry;
use desk_core::enums::{AuditAction, EntityType};
use desk_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    id: &str,
    action: Option<&str>,
    limit: Option<u32>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let entries = trail(id, action, limit, ctx, flags).await?;
    output(&entries, flags.format)
}

/// A ticket's audit entries, newest first.
pub(super) async fn trail(
    id: &str,
    action: Option<&str>,
    limit: Option<u32>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<Vec<AuditEntry>> {
    ctx.require_staff().await?;
    let action = action
        .map(|value| parse_enum::<AuditAction>(value, "action"))
        .transpose()?;
    let limit = ctx.list_limit(limit, flags)?;
    ctx.service.get_ticket(id).await?;

    let filter = AuditFilter {
        entity_type: Some(EntityType::Ticket),
        entity_id: Some(id.to_string()),
        action,
        actor_id: None,
        limit: Some(limit),
    };
    Ok(ctx.service.query_audit(&filter).await?)
}
