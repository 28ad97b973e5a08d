//! Autocomplete handlers for Discord slash command parameters.

use crate::{bot::BotData, core::member, errors::Error};

/// Provides autocomplete suggestions for team member names.
///
/// Matches the partial input case-insensitively anywhere in the name and returns at
/// most 25 names (Discord's limit), alphabetically.
pub async fn autocomplete_member_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(members) = member::get_all_members(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    members
        .into_iter()
        .filter(|m| m.name.to_lowercase().contains(&partial_lower))
        .map(|m| m.name)
        .take(25)
        .collect()
}
