use chrono::{DateTime, Utc};
use desk_core::enums::Role;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct StatusResponse {
    authenticated: bool,
    user_id: Option<String>,
    role: Option<Role>,
    staff: bool,
    expires_at: Option<DateTime<Utc>>,
}

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = match ctx.token.as_deref() {
        Some(token) => ctx.service.find_live_session(token, Utc::now()).await?,
        None => None,
    };

    let status = match session {
        Some(session) => StatusResponse {
            authenticated: true,
            staff: session.identity.is_staff(),
            user_id: Some(session.identity.id),
            role: Some(session.identity.role),
            expires_at: Some(session.expires_at),
        },
        None => StatusResponse {
            authenticated: false,
            user_id: None,
            role: None,
            staff: false,
            expires_at: None,
        },
    };

    output(&status, flags.format)
}
