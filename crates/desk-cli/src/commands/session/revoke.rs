use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct RevokeResponse {
    user_id: String,
    revoked: u64,
}

pub async fn run(user: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.require_staff().await?;
    let revoked = ctx.service.revoke_user_sessions(user).await?;
    tracing::info!(actor = %actor.id, user_id = user, revoked, "sessions revoked");

    output(
        &RevokeResponse {
            user_id: user.to_string(),
            revoked,
        },
        flags.format,
    )
}
