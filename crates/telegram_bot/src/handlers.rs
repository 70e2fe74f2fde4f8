//! Maps telegram updates onto the ledger.
//!
//! [`Ledger`] is the transport independent part: each `on_*` method turns one
//! inbound message or command into a [`Reply`]. The teloxide endpoints below
//! only identify the user, call it, and deliver the reply.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use engine::{Engine, EngineError, summarize};
use teloxide::{
    RequestError,
    dispatching::UpdateHandler,
    prelude::*,
    types::InputFile,
};
use thiserror::Error;

use crate::{ConfigParameters, commands::LedgerCommands, parsing::parse_expense, ui};

/// What to send back for one inbound update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    /// Stay silent.
    Nothing,
    Text(String),
    Document { file_name: String, bytes: Vec<u8> },
}

#[derive(Debug, Error)]
pub(crate) enum HandlerError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

/// Listing windows, each with an inclusive lower bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Window {
    /// Since local midnight.
    Today,
    /// The last 7 × 24 hours.
    Week,
    /// The last 30 × 24 hours.
    Month,
}

impl Window {
    fn title(self) -> &'static str {
        match self {
            Self::Today => "Expenses Today",
            Self::Week => "Expenses Last 7 Days",
            Self::Month => "Expenses Last 30 Days",
        }
    }

    pub(crate) fn cutoff(self, now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        match self {
            Self::Today => start_of_local_day(now, tz),
            Self::Week => now - Duration::days(7),
            Self::Month => now - Duration::days(30),
        }
    }
}

fn start_of_local_day(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let midnight = now.with_timezone(&tz).date_naive().and_time(NaiveTime::MIN);
    // Zones that skip midnight on DST change start the day an hour later.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map_or(now, |start| start.with_timezone(&Utc))
}

#[derive(Clone)]
pub(crate) struct Ledger {
    engine: Arc<Engine>,
    tz: Tz,
}

impl Ledger {
    pub(crate) fn new(engine: Arc<Engine>, tz: Tz) -> Self {
        Self { engine, tz }
    }

    /// Free text: record it if it parses, ignore it otherwise.
    pub(crate) async fn on_text(&self, user_id: i64, raw: &str) -> Result<Reply, HandlerError> {
        let Some(parsed) = parse_expense(raw) else {
            return Ok(Reply::Nothing);
        };

        let saved = self
            .engine
            .insert(user_id, parsed.amount, &parsed.category)
            .await?;
        tracing::info!(user_id, id = saved.id, "expense saved");
        Ok(Reply::Text(ui::saved_text(saved.amount, &saved.category)))
    }

    pub(crate) async fn on_window(
        &self,
        user_id: i64,
        window: Window,
        now: DateTime<Utc>,
    ) -> Result<Reply, HandlerError> {
        let records = self
            .engine
            .query(user_id, Some(window.cutoff(now, self.tz)))
            .await?;
        Ok(Reply::Text(ui::render_list(
            &records,
            window.title(),
            self.tz,
        )))
    }

    pub(crate) async fn on_summary(&self, user_id: i64) -> Result<Reply, HandlerError> {
        let records = self.engine.query(user_id, None).await?;
        Ok(Reply::Text(ui::render_summary(&summarize(&records))))
    }

    pub(crate) async fn on_undo(&self, user_id: i64) -> Result<Reply, HandlerError> {
        let text = match self.engine.delete_most_recent(user_id).await? {
            Some(deleted) => {
                tracing::info!(user_id, id = deleted.id, "expense undone");
                ui::deleted_text(&deleted)
            }
            None => ui::nothing_to_delete_text().to_string(),
        };
        Ok(Reply::Text(text))
    }

    pub(crate) async fn on_export(&self, user_id: i64) -> Result<Reply, HandlerError> {
        let records = self.engine.query(user_id, None).await?;
        if records.is_empty() {
            return Ok(Reply::Text(ui::nothing_to_export_text().to_string()));
        }

        Ok(Reply::Document {
            file_name: format!("expenses_{user_id}.csv"),
            bytes: ui::render_csv(&records, self.tz)?,
        })
    }

    async fn on_command(
        &self,
        user_id: i64,
        cmd: LedgerCommands,
    ) -> Result<Reply, HandlerError> {
        match cmd {
            LedgerCommands::Start | LedgerCommands::Help => {
                Ok(Reply::Text(ui::welcome_text().to_string()))
            }
            LedgerCommands::Today => self.on_window(user_id, Window::Today, Utc::now()).await,
            LedgerCommands::Week => self.on_window(user_id, Window::Week, Utc::now()).await,
            LedgerCommands::Month => self.on_window(user_id, Window::Month, Utc::now()).await,
            LedgerCommands::Summary => self.on_summary(user_id).await,
            LedgerCommands::Undo => self.on_undo(user_id).await,
            LedgerCommands::Export => self.on_export(user_id).await,
        }
    }
}

/// Build the schema for ledger commands and free text messages.
pub(crate) fn schema() -> UpdateHandler<RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<LedgerCommands>()
                .endpoint(handle_command),
        )
        .branch(dptree::endpoint(handle_message))
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: LedgerCommands,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let sender = msg.from.as_ref().map(|user| user.id);
    let Some(user_id) = ledger_user(cfg.allowed_users.as_deref(), sender) else {
        return Ok(());
    };

    let reply = cfg.ledger.on_command(user_id, cmd).await;
    deliver(&bot, msg.chat.id, reply).await
}

async fn handle_message(bot: Bot, msg: Message, cfg: ConfigParameters) -> ResponseResult<()> {
    let sender = msg.from.as_ref().map(|user| user.id);
    let Some(user_id) = ledger_user(cfg.allowed_users.as_deref(), sender) else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if is_command(text) {
        return Ok(());
    }

    let reply = cfg.ledger.on_text(user_id, text).await;
    deliver(&bot, msg.chat.id, reply).await
}

async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    reply: Result<Reply, HandlerError>,
) -> ResponseResult<()> {
    match reply {
        Ok(Reply::Nothing) => {}
        Ok(Reply::Text(text)) => {
            bot.send_message(chat_id, text).await?;
        }
        Ok(Reply::Document { file_name, bytes }) => {
            bot.send_document(chat_id, InputFile::memory(bytes).file_name(file_name))
                .await?;
        }
        Err(err) => {
            tracing::error!("ledger operation failed: {err}");
            bot.send_message(chat_id, ui::storage_error_text()).await?;
        }
    }
    Ok(())
}

/// The ledger owner for a message, if the sender is allowed to use the bot.
fn ledger_user(allowed_users: Option<&[UserId]>, from: Option<UserId>) -> Option<i64> {
    let from = from?;
    if let Some(ids) = allowed_users
        && !ids.contains(&from)
    {
        tracing::debug!("ignoring message from user {from}");
        return None;
    }
    i64::try_from(from.0).ok()
}

/// Text that reached the free text branch but looks like a command. Unknown
/// commands are not expenses.
fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

#[cfg(test)]
mod tests {
    use chrono_tz::Asia::Kuala_Lumpur;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use teloxide::utils::command::BotCommands;

    use super::*;

    async fn ledger() -> Ledger {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        Ledger::new(Arc::new(engine), Kuala_Lumpur)
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            other => panic!("expected text reply, got {other:?}"),
        }
    }

    #[test]
    fn today_starts_at_local_midnight() {
        // 2026-10-17 01:30 in Kuala Lumpur.
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 17, 30, 0).unwrap();
        assert_eq!(
            Window::Today.cutoff(now, Kuala_Lumpur),
            Utc.with_ymd_and_hms(2026, 10, 16, 16, 0, 0).unwrap()
        );
    }

    #[test]
    fn week_and_month_are_rolling() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        assert_eq!(
            Window::Week.cutoff(now, Kuala_Lumpur),
            Utc.with_ymd_and_hms(2026, 10, 10, 12, 0, 0).unwrap()
        );
        assert_eq!(
            Window::Month.cutoff(now, Kuala_Lumpur),
            Utc.with_ymd_and_hms(2026, 9, 17, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn today_survives_a_skipped_midnight() {
        // Santiago skips 00:00-01:00 when DST starts on 2026-09-06.
        let tz: Tz = "America/Santiago".parse().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 9, 6, 15, 0, 0).unwrap();
        let cutoff = Window::Today.cutoff(now, tz);
        assert!(cutoff <= now);
        assert!(now - cutoff < Duration::hours(24));
    }

    #[tokio::test]
    async fn text_is_saved_and_confirmed() {
        let ledger = ledger().await;

        let reply = ledger.on_text(1, "rm12 makan").await.unwrap();
        assert_eq!(reply, Reply::Text("✅ Saved: RM12.00 (makan)".to_string()));

        let reply = ledger.on_text(1, "hello there").await.unwrap();
        assert_eq!(reply, Reply::Nothing);

        let records = ledger.engine.query(1, None).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn today_lists_fresh_records() {
        let ledger = ledger().await;
        ledger.on_text(1, "rm12 makan").await.unwrap();
        ledger.on_text(1, "rm5 air").await.unwrap();

        let reply = text(
            ledger
                .on_window(1, Window::Today, Utc::now())
                .await
                .unwrap(),
        );
        assert!(reply.starts_with("📌 Expenses Today"));
        assert!(reply.contains("• RM5.00 - air"));
        assert!(reply.ends_with("💰 Total: RM17.00"));

        let empty = text(ledger.on_window(2, Window::Week, Utc::now()).await.unwrap());
        assert_eq!(empty, "📭 Expenses Last 7 Days: Tiada rekod.");
    }

    #[tokio::test]
    async fn summary_and_undo_flow() {
        let ledger = ledger().await;
        assert_eq!(
            text(ledger.on_summary(1).await.unwrap()),
            "📭 Tiada rekod untuk summary."
        );
        assert_eq!(
            text(ledger.on_undo(1).await.unwrap()),
            "❌ Takde rekod nak delete."
        );

        ledger.on_text(1, "rm12 makan").await.unwrap();
        ledger.on_text(1, "rm5 air").await.unwrap();
        ledger.on_text(1, "rm80 minyak").await.unwrap();

        let summary = text(ledger.on_summary(1).await.unwrap());
        assert!(summary.ends_with("💰 Total semua: RM97.00"));

        assert_eq!(
            text(ledger.on_undo(1).await.unwrap()),
            "🗑️ Deleted last: RM80.00 - minyak"
        );
        let summary = text(ledger.on_summary(1).await.unwrap());
        assert!(summary.ends_with("💰 Total semua: RM17.00"));
    }

    #[tokio::test]
    async fn export_returns_csv_document() {
        let ledger = ledger().await;
        assert_eq!(
            text(ledger.on_export(5).await.unwrap()),
            "📭 Tiada data untuk export."
        );

        ledger.on_text(5, "rm3.5 teh tarik").await.unwrap();
        match ledger.on_export(5).await.unwrap() {
            Reply::Document { file_name, bytes } => {
                assert_eq!(file_name, "expenses_5.csv");
                let csv = String::from_utf8(bytes).unwrap();
                let mut lines = csv.lines();
                assert_eq!(lines.next(), Some("id,amount,category,created_at"));
                assert!(lines.next().unwrap().starts_with("1,3.50,teh tarik,"));
                assert_eq!(lines.next(), None);
            }
            other => panic!("expected document, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn help_and_start_explain_usage() {
        let ledger = ledger().await;
        for cmd in [LedgerCommands::Start, LedgerCommands::Help] {
            let reply = text(ledger.on_command(1, cmd).await.unwrap());
            assert!(reply.contains("rm12 makan"));
        }
    }

    #[test]
    fn allow_list_filters_senders() {
        let allowed = [UserId(10), UserId(20)];
        assert_eq!(ledger_user(Some(&allowed[..]), Some(UserId(20))), Some(20));
        assert_eq!(ledger_user(Some(&allowed[..]), Some(UserId(30))), None);
        assert_eq!(ledger_user(Some(&allowed[..]), None), None);
    }

    #[test]
    fn without_allow_list_everyone_is_a_ledger_user() {
        assert_eq!(ledger_user(None, Some(UserId(30))), Some(30));
        assert_eq!(ledger_user(None, None), None);
        // Ids beyond i64 cannot own a ledger.
        assert_eq!(ledger_user(None, Some(UserId(u64::MAX))), None);
    }

    #[test]
    fn unknown_commands_are_not_expenses() {
        assert!(is_command("/delete"));
        assert!(is_command("  /rm12 makan"));
        assert!(!is_command("rm12 makan"));
        assert!(!is_command("12 /makan"));
    }

    #[tokio::test]
    async fn sub_cent_amounts_add_up() {
        let ledger = ledger().await;
        for _ in 0..3 {
            let reply = ledger.on_text(1, "rm1.333 kopi").await.unwrap();
            assert_eq!(reply, Reply::Text("✅ Saved: RM1.33 (kopi)".to_string()));
        }

        let summary = text(ledger.on_summary(1).await.unwrap());
        assert!(summary.contains("• kopi: RM4.00"));
        assert!(summary.ends_with("💰 Total semua: RM4.00"));
    }

    #[test]
    fn commands_parse_in_lowercase() {
        assert_eq!(
            LedgerCommands::parse("/undo", "belanja_bot").unwrap(),
            LedgerCommands::Undo
        );
        assert_eq!(
            LedgerCommands::parse("/export", "belanja_bot").unwrap(),
            LedgerCommands::Export
        );
        assert!(LedgerCommands::parse("/delete", "belanja_bot").is_err());
    }
}
