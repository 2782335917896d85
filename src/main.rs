mod api;
mod commands;
mod docs;
mod page;
mod qa;
mod state;

use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tracing::{error, info, Level};

use api::ApiClient;
use page::Page;
use state::AppState;

fn log_level() -> Level {
    dotenv::var("DOCINTEL_LOG_LEVEL")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::DEBUG)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(log_level())
        .init();

    let token = dotenv::var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;
    let guild_id: Option<serenity::GuildId> = dotenv::var("DISCORD_GUILD_ID")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(serenity::GuildId::new);

    // Init document service client
    let api = ApiClient::from_env()?;
    info!(base_url = api.base_url(), "document service client initialized");

    let app_state = AppState {
        page: Arc::new(Page::new(Arc::new(api))),
    };

    let intents = serenity::GatewayIntents::GUILDS;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::docintel()],
            on_error: |err| {
                Box::pin(async move {
                    if let poise::FrameworkError::Command { error, ctx, .. } = err {
                        error!(command = ctx.command().qualified_name, "command failed: {:#}", error);
                        let _ = ctx.say(format!("**Error:** {}", error)).await;
                    } else if let Err(e) = poise::builtins::on_error(err).await {
                        error!("Error while handling error: {}", e);
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as: {} ({})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                info!("Registering {} top-level command(s):", commands.len());
                for cmd in commands {
                    info!("  /{} ({} subcommands)", cmd.name, cmd.subcommands.len());
                    for sub in &cmd.subcommands {
                        info!("    /{} {}", cmd.name, sub.name);
                    }
                }

                if let Some(gid) = guild_id {
                    info!("Registering to guild {} (instant)", gid);
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        gid,
                    )
                    .await?;
                } else {
                    info!("Registering globally (up to 1 hour delay)");
                    poise::builtins::register_globally(
                        ctx,
                        &framework.options().commands,
                    )
                    .await?;
                }

                Ok(app_state)
            })
        })
        .build();

    info!("Starting Document Intelligence bot...");

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}
