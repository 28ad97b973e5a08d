use dotenvy::dotenv;
use opsboard::{
    bot,
    config::{self, team::Config},
    core::member,
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and create tables. The default database lives under data/.
    std::fs::create_dir_all("data")?;
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed team members from config.toml
    let team = config::team::load_default_config().unwrap_or_else(|e| {
        warn!("No team roster loaded ({}), starting without seeding", e);
        Config::default()
    });
    member::seed_members(&db, &team)
        .await
        .inspect(|count| info!("Team roster checked, {} new members", count))
        .inspect_err(|e| error!("Failed to seed team members: {}", e))?;

    // 5. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, db).await?;

    Ok(())
}
