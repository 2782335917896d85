use tracing::warn;

use super::send_chunked;
use crate::docs::render_documents;
use crate::state::Context;

/// List every document the document service holds
#[poise::command(slash_command, guild_only)]
pub async fn library(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    match ctx.data().page.backend().list_documents().await {
        Ok(docs) => {
            let output = format!(
                "**Library** ({} documents)\n\n{}",
                docs.len(),
                render_documents(&docs)
            );
            send_chunked(&ctx, &output).await
        }
        Err(e) => {
            warn!(error = %e, "library listing failed");
            ctx.say(format!("**Error:** {}", e)).await?;
            Ok(())
        }
    }
}
