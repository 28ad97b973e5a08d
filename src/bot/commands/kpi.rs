//! KPI commands - team stats, per-member summaries and manual progress updates.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, handlers::autocomplete::autocomplete_member_name, resolve_member,
            say_lines, say_private_lines, today,
        },
        core::{kpi, progress, report},
        errors::{Error, Result},
    };
    use tracing::info;

    /// Shows how many active KPIs are completed, on track, at risk or behind.
    #[poise::command(slash_command, prefix_command)]
    pub async fn kpi_stats(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let reference = today();
        let stats = progress::get_kpi_stats(&ctx.data().database, reference).await?;

        ctx.say(format!(
            "📊 **KPI stats for {reference}**\n{}",
            report::format_stats(&stats)
        ))
        .await?;
        Ok(())
    }

    /// Shows a KPI roll-up for every team member.
    #[poise::command(slash_command, prefix_command)]
    pub async fn kpi_summary(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let reference = today();
        let summaries = progress::get_kpi_summary_by_user(&ctx.data().database, reference).await?;

        if summaries.is_empty() {
            ctx.say("No active KPIs.").await?;
            return Ok(());
        }

        let mut lines = vec![format!("📋 **KPI summary for {reference}**")];
        lines.extend(summaries.iter().map(report::format_summary_row));
        say_lines(ctx, &lines).await
    }

    /// Shows the active KPIs of a member (defaults to you).
    #[poise::command(slash_command, prefix_command)]
    pub async fn my_kpis(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Team member name"]
        #[autocomplete = "autocomplete_member_name"]
        member: Option<String>,
    ) -> Result<()> {
        let member = resolve_member(ctx, member).await?;
        let reference = today();
        let active = progress::get_active_kpi_progress(&ctx.data().database, reference).await?;

        let mut lines = vec![format!("🎯 **{}'s KPIs**", member.name)];
        lines.extend(
            active
                .iter()
                .filter(|p| p.kpi.user_id == member.id)
                .map(report::format_kpi_line),
        );

        if lines.len() == 1 {
            ctx.say(format!("{} has no active KPIs.", member.name)).await?;
            return Ok(());
        }
        say_lines(ctx, &lines).await
    }

    /// Records a new progress value for one of your KPIs.
    #[poise::command(slash_command)]
    pub async fn kpi_progress(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "KPI id"] kpi_id: i64,
        #[description = "New progress value"] value: f64,
        #[description = "Optional note"] note: Option<String>,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;
        let db = &ctx.data().database;
        let actor = resolve_member(ctx, None).await?;

        let updated = kpi::record_progress_as(db, kpi_id, value, note, actor.id).await?;
        info!(
            "KPI {} set to {} by {} (Discord user {})",
            updated.id,
            value,
            actor.name,
            ctx.author().id
        );

        let current = progress::get_kpi_progress(db, kpi_id, today()).await?;
        let mut lines = vec![
            "✏️ Progress recorded".to_string(),
            report::format_kpi_line(&current),
        ];
        if current.is_live() {
            lines.push(
                "⚠️ This KPI is auto-tracked; the recorded value is not shown.".to_string(),
            );
        }

        say_private_lines(ctx, &lines).await
    }
}

// Re-export all commands
pub use inner::*;
