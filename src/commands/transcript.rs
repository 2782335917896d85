use super::send_chunked;
use crate::state::Context;

/// Show the question/answer transcript for this session
#[poise::command(slash_command, guild_only)]
pub async fn transcript(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let rendered = ctx.data().page.qa().render().await;
    send_chunked(&ctx, &rendered).await
}
