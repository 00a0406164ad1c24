use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
pub(super) struct PurgeResponse {
    pub(super) removed: u64,
    pub(super) cutoff: DateTime<Utc>,
}

pub async fn run(
    older_than_days: u32,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let response = purge(older_than_days, ctx).await?;
    output(&response, flags.format)
}

/// Delete sessions that ended before the cutoff.
pub(super) async fn purge(
    older_than_days: u32,
    ctx: &AppContext,
) -> anyhow::Result<PurgeResponse> {
    let actor = ctx.require_staff().await?;
    let cutoff = Utc::now() - TimeDelta::days(i64::from(older_than_days));
    let removed = ctx.service.purge_sessions(cutoff).await?;
    tracing::info!(actor = %actor.id, removed, older_than_days, "sessions purged");
    Ok(PurgeResponse { removed, cutoff })
}
