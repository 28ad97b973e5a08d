//! General Discord commands - ping and help.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Opsboard Help**\n\n\
        **KPI Commands**\n\
        • `/kpi_stats` - Team-wide count of active KPIs per status.\n\
        • `/kpi_summary` - Per-member KPI roll-up with average completion.\n\
        • `/my_kpis [member]` - Active KPIs of a member (defaults to you).\n\
        • `/kpi_progress <kpi_id> <value> [note]` - Records progress on a KPI you own or created.\n\n\
        **Payroll Commands**\n\
        • `/payroll [member]` - Estimated pay for this month, visible only to you.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
