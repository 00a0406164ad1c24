use chrono::{DateTime, TimeDelta, Utc};
use desk_config::MAX_TTL_SECS;
use desk_core::enums::Role;
use desk_core::identity::Identity;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct LoginResponse {
    user_id: String,
    role: Role,
    token: String,
    expires_at: DateTime<Utc>,
    stored: bool,
}

pub async fn run(
    user: &str,
    role: &str,
    ttl_secs: Option<u64>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let role = parse_enum::<Role>(role, "role")?;
    let ttl_secs = ttl_secs.unwrap_or(ctx.config.sessions.ttl_secs);
    if ttl_secs == 0 || ttl_secs > MAX_TTL_SECS {
        anyhow::bail!("--ttl-secs must be between 1 and {MAX_TTL_SECS}");
    }

    let identity = Identity::new(user, role);
    let (token, session) = ctx
        .service
        .issue_session(&identity, TimeDelta::seconds(i64::try_from(ttl_secs)?))
        .await?;

    let stored = match &ctx.token_store {
        Some(store) => {
            store.store(&token)?;
            true
        }
        None => false,
    };

    output(
        &LoginResponse {
            user_id: session.identity.id,
            role: session.identity.role,
            token,
            expires_at: session.expires_at,
            stored,
        },
        flags.format,
    )
}
