use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LogoutResponse {
    revoked: bool,
    cleared: bool,
}

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let revoked = match ctx.token.as_deref() {
        Some(token) => ctx.service.revoke_session(token).await?,
        None => false,
    };

    let cleared = match &ctx.token_store {
        Some(store) => {
            store.delete()?;
            true
        }
        None => false,
    };

    output(&LogoutResponse { revoked, cleared }, flags.format)
}
