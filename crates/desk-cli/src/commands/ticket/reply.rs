use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    id: &str,
    message: &str,
    key: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let accepted = ctx
        .gateway
        .submit_reply(ctx.token.as_deref(), id, message, key)
        .await?;
    output(&accepted, flags.format)
}
