use tracing::info;

use super::{say_ephemeral, send_chunked};
use crate::qa::render::render_message;
use crate::qa::{AskOutcome, IgnoreReason, Message};
use crate::state::Context;

/// Ask a question about your documents
#[poise::command(slash_command, guild_only)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Your question"] question: String,
) -> Result<(), anyhow::Error> {
    let page = &ctx.data().page;

    // Submit before deferring so an ignored question can still be answered ephemerally.
    let submitted = match page.qa().submit(&question).await {
        Ok(q) => q,
        Err(IgnoreReason::Pending) => {
            return say_ephemeral(&ctx, "Still answering the previous question, try again shortly.")
                .await;
        }
        Err(IgnoreReason::Blank) => {
            return say_ephemeral(&ctx, "Ask a question about your documents...").await;
        }
    };
    info!(user = ctx.author().name, question = %submitted, "question received");

    // The submitted question must be completed even if the defer fails.
    let deferred = ctx.defer().await;
    let outcome = page.qa().complete(page.backend(), &submitted).await;
    deferred?;

    match outcome {
        AskOutcome::Answered(answer) => {
            let asked = Message::Question { content: submitted };
            let full = format!("{}\n\n{}", render_message(&asked), render_message(&answer));
            send_chunked(&ctx, &full).await
        }
        AskOutcome::Failed(error) => {
            ctx.say(format!("**Error:** {}", error)).await?;
            Ok(())
        }
        AskOutcome::Ignored(_) => Ok(()),
    }
}
