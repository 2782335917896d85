use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::info;

use super::say_ephemeral;
use crate::docs::intake::{is_accepted, DropOutcome, UploadIntake};
use crate::docs::render_card;
use crate::docs::types::UploadFile;
use crate::state::Context;

/// Upload a PDF, DOCX, or TXT document
#[poise::command(slash_command, guild_only)]
pub async fn upload(
    ctx: Context<'_>,
    #[description = "PDF, DOCX, or TXT file"] file: Option<serenity::Attachment>,
) -> Result<(), anyhow::Error> {
    let page = &ctx.data().page;

    // Claim the surface before deferring; a disabled surface gets an ephemeral notice.
    let Some(surface) = page.open_intake() else {
        return say_ephemeral(&ctx, UploadIntake::status_line(true)).await;
    };

    let files = match file {
        Some(attachment) => {
            ctx.defer().await?;
            let media_type = attachment.content_type.clone().unwrap_or_default();
            info!(
                user = ctx.author().name,
                name = %attachment.filename,
                media_type = %media_type,
                size = attachment.size,
                "file dropped"
            );
            // Rejected types are never fetched.
            let bytes = if is_accepted(&media_type) {
                attachment
                    .download()
                    .await
                    .context("Failed to fetch attachment")?
            } else {
                Vec::new()
            };
            vec![UploadFile::new(attachment.filename.clone(), media_type, bytes)]
        }
        None => Vec::new(),
    };

    match surface.drop_files(files).await {
        DropOutcome::Empty => say_ephemeral(&ctx, UploadIntake::status_line(false)).await,
        DropOutcome::Rejected(error) | DropOutcome::Failed(error) => {
            ctx.say(format!("**Error:** {}", error)).await?;
            Ok(())
        }
        DropOutcome::Uploaded(doc) => {
            ctx.say(format!("Uploaded\n{}", render_card(&doc))).await?;
            Ok(())
        }
        // the surface was already claimed above
        DropOutcome::Disabled => Ok(()),
    }
}
