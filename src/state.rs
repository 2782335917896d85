use std::sync::Arc;

use crate::page::Page;

pub struct AppState {
    /// The bot process lifetime is the session; everything here is in memory.
    pub page: Arc<Page>,
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
