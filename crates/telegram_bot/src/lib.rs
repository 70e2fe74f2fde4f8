//! Telegram bot.
//!
//! Users log spending by texting the bot (`rm12 makan`) and read it back with
//! commands (`/today`, `/summary`, `/undo`, `/export`, ...). The bot talks to
//! the ledger [`Engine`] in-process.

use std::sync::Arc;

use chrono_tz::Tz;
use engine::Engine;
use teloxide::{prelude::*, utils::command::BotCommands};

mod commands;
mod handlers;
mod parsing;
mod ui;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    ledger: handlers::Ledger,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    engine: Arc<Engine>,
    timezone: Tz,
}

impl Bot {
    pub fn new(
        token: &str,
        allowed_users: Option<Vec<UserId>>,
        engine: Arc<Engine>,
        timezone: Tz,
    ) -> Result<Self, String> {
        if token.trim().is_empty() {
            return Err("telegram token is empty".to_string());
        }

        Ok(Self {
            token: token.to_string(),
            allowed_users,
            engine,
            timezone,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot
            .set_my_commands(commands::LedgerCommands::bot_commands())
            .await
        {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            ledger: handlers::Ledger::new(self.engine.clone(), self.timezone),
        };

        Dispatcher::builder(bot, handlers::schema())
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    engine: Option<Arc<Engine>>,
    timezone: Option<Tz>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Telegram user ids allowed to use the bot. Empty means everyone.
    pub fn allowed_users(mut self, allowed_users: Vec<u64>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.into_iter().map(UserId).collect());
        }
        self
    }

    pub fn engine(mut self, engine: Arc<Engine>) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    /// Zone used for "today" and for the dates shown to users. Defaults to UTC.
    pub fn timezone(mut self, timezone: Tz) -> BotBuilder {
        self.timezone = Some(timezone);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let engine = self
            .engine
            .ok_or_else(|| "telegram bot needs a ledger engine".to_string())?;
        Bot::new(
            &self.token,
            self.allowed_users,
            engine,
            self.timezone.unwrap_or(Tz::UTC),
        )
    }
}
