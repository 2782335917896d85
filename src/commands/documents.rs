use super::send_chunked;
use crate::docs::intake::UploadIntake;
use crate::docs::render_documents;
use crate::state::Context;

/// List documents uploaded this session
#[poise::command(slash_command, guild_only)]
pub async fn documents(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let page = &ctx.data().page;
    let docs = page.documents().await;

    let mut output = String::from("**Your Documents**\n\n");
    output.push_str(&render_documents(&docs));
    if page.is_uploading() {
        output.push_str(&format!("\n\n_{}_", UploadIntake::status_line(true)));
    } else if let Some(error) = page.intake_error() {
        output.push_str(&format!("\n\n**Last upload error:** {}", error));
    }

    send_chunked(&ctx, &output).await
}
