use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let view = ctx.gateway.view_thread(ctx.token.as_deref(), id).await?;
    output(&view, flags.format)
}
