mod ask;
mod documents;
mod library;
mod transcript;
mod upload;

use crate::state::Context;

/// Document Intelligence - upload documents and ask questions about them
#[poise::command(
    slash_command,
    subcommands(
        "upload::upload",
        "documents::documents",
        "ask::ask",
        "transcript::transcript",
        "library::library"
    )
)]
pub async fn docintel(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Reply visible only to the invoking user. Used for disabled/ignored
/// interactions, which must still be acknowledged.
async fn say_ephemeral(ctx: &Context<'_>, text: impl Into<String>) -> Result<(), anyhow::Error> {
    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

/// Split text into Discord-safe chunks (max 1990 chars), preferring line
/// then word boundaries.
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(1990);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}

/// Send a message in chunks through ctx.say(), so follow-ups go through the
/// interaction webhook (no Send Messages permission required).
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text) {
        ctx.say(chunk).await?;
    }
    Ok(())
}
