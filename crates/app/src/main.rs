use std::sync::Arc;

use chrono_tz::Tz;
use clap::Parser;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[derive(Debug, Parser)]
#[command(version, about = "Expense ledger telegram bot")]
struct Cli {
    /// Settings file, with or without the `.toml` extension.
    #[arg(short, long, env = "BELANJA_CONFIG", default_value = "settings")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "belanja={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {}: {err}", settings.app.timezone))?;

    let db = parse_database(&settings.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;
    tracing::info!("Ledger ready, timezone {timezone}");

    let bot = telegram_bot::Bot::builder()
        .token(&settings.telegram.token)
        .allowed_users(settings.telegram.allowed_users.clone())
        .engine(Arc::new(engine))
        .timezone(timezone)
        .build()?;
    bot.run().await;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
