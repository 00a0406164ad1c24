use desk_core::entities::NewTicket;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    title: &str,
    message: &str,
    attachment: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let creator = ctx.identity().await?;
    let ticket = ctx
        .service
        .create_ticket(
            &creator,
            &NewTicket {
                title: title.to_string(),
                message: message.to_string(),
                attachment_url: attachment.map(String::from),
            },
        )
        .await?;

    output(&ticket, flags.format)
}
