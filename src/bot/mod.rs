//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for opsboard: read-mostly KPI and payroll
//! reports plus manual KPI progress updates. Commands only call into [`crate::core`].

/// Discord command implementations (general, kpi, payroll)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::member,
    entities::ProfileModel,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Discord rejects messages longer than 2000 characters; leave room for formatting.
const MESSAGE_CHUNK_LIMIT: usize = 1900;

/// Shared data available to all bot commands.
/// This structure holds the database connection and any other global state
/// that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Cuts `line` into pieces of at most `limit` bytes on character boundaries.
fn split_oversized(line: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line;

    while rest.len() > limit {
        let cut = rest
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= limit)
            .last()
            .filter(|i| *i > 0)
            .unwrap_or_else(|| rest.chars().next().map_or(rest.len(), char::len_utf8));
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }

    pieces.push(rest);
    pieces
}

/// Splits lines into messages that stay under Discord's length limit.
///
/// Lines are kept whole where possible; a single line longer than the limit is cut.
#[must_use]
pub fn chunk_lines(lines: &[String]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in lines
        .iter()
        .flat_map(|line| split_oversized(line, MESSAGE_CHUNK_LIMIT))
    {
        if !current.is_empty() && current.len() + piece.len() + 1 > MESSAGE_CHUNK_LIMIT {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(piece);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Builds one reply per message chunk. Ephemeral replies are only visible to the caller.
#[must_use]
pub fn build_replies(lines: &[String], ephemeral: bool) -> Vec<poise::CreateReply> {
    chunk_lines(lines)
        .into_iter()
        .map(|chunk| {
            poise::CreateReply::default()
                .content(chunk)
                .ephemeral(ephemeral)
        })
        .collect()
}

/// Sends `lines` to the channel as one or more messages.
pub async fn say_lines(ctx: Context<'_>, lines: &[String]) -> Result<()> {
    for reply in build_replies(lines, false) {
        ctx.send(reply).await?;
    }
    Ok(())
}

/// Sends `lines` as one or more messages only the caller can see.
pub async fn say_private_lines(ctx: Context<'_>, lines: &[String]) -> Result<()> {
    for reply in build_replies(lines, true) {
        ctx.send(reply).await?;
    }
    Ok(())
}

/// Today's date in the bot host's local time zone.
#[must_use]
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Resolves a member by name, or the member linked to the invoking Discord user.
pub async fn resolve_member(ctx: Context<'_>, name: Option<String>) -> Result<ProfileModel> {
    let db = &ctx.data().database;

    match name {
        Some(name) => member::get_member_by_name(db, &name)
            .await?
            .ok_or(Error::MemberNotFound { id: name }),
        None => {
            let discord_id = ctx.author().id.to_string();
            member::get_member_by_discord_id(db, &discord_id)
                .await?
                .ok_or(Error::MemberNotFound { id: discord_id })
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ An error occurred: {error}")).await {
                tracing::error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip(token, database))]
pub async fn run_bot(token: String, database: DatabaseConnection) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::kpi_stats(),
                commands::kpi_summary(),
                commands::my_kpis(),
                commands::kpi_progress(),
                commands::payroll(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| tracing::error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| tracing::error!("Client error: {:?}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_lines_keeps_short_output_together() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(chunk_lines(&lines), vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_chunk_lines_splits_long_output() {
        let line = "x".repeat(1000);
        let lines = vec![line.clone(), line.clone(), line];
        let chunks = chunk_lines(&lines);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= MESSAGE_CHUNK_LIMIT));
    }

    #[test]
    fn test_chunk_lines_cuts_single_oversized_line() {
        let lines = vec!["y".repeat(5000), "tail".to_string()];
        let chunks = chunk_lines(&lines);
        assert!(chunks.iter().all(|c| c.len() <= MESSAGE_CHUNK_LIMIT));
        assert_eq!(chunks.concat().replace('\n', ""), format!("{}tail", "y".repeat(5000)));
    }

    #[test]
    fn test_split_oversized_respects_char_boundaries() {
        let line = "é".repeat(1500);
        let pieces = split_oversized(&line, MESSAGE_CHUNK_LIMIT);
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().all(|p| p.len() <= MESSAGE_CHUNK_LIMIT));
        assert_eq!(pieces.concat(), line);
    }

    #[test]
    fn test_build_replies_private() {
        let lines = vec!["x".repeat(1000), "x".repeat(1000)];

        let private = build_replies(&lines, true);
        assert_eq!(private.len(), 2);
        assert!(private.iter().all(|r| r.ephemeral == Some(true)));

        let public = build_replies(&lines, false);
        assert!(public.iter().all(|r| r.ephemeral == Some(false)));
    }

    #[test]
    fn test_chunk_lines_empty() {
        assert!(chunk_lines(&[]).is_empty());
    }
}
