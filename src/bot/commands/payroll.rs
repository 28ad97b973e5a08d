//! Payroll command - estimated monthly pay for one or all members.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, handlers::autocomplete::autocomplete_member_name, resolve_member,
            say_private_lines, today,
        },
        core::{
            payroll::{get_payroll, get_payroll_for_member},
            report,
        },
        errors::{Error, Result},
    };

    /// Shows this month's estimated pay for a member, or for everyone. Only the caller
    /// sees the reply.
    #[poise::command(slash_command)]
    pub async fn payroll(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Team member name (omit for everyone)"]
        #[autocomplete = "autocomplete_member_name"]
        member: Option<String>,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;
        let db = &ctx.data().database;
        let reference = today();

        let rows = match member {
            Some(name) => {
                let member = resolve_member(ctx, Some(name)).await?;
                vec![get_payroll_for_member(db, member.id, reference).await?]
            }
            None => get_payroll(db, reference).await?,
        };

        if rows.is_empty() {
            return say_private_lines(ctx, &["No team members configured.".to_string()]).await;
        }

        let mut lines = vec![format!(
            "💰 **Payroll estimate for {}**",
            reference.format("%Y-%m")
        )];
        lines.extend(rows.iter().map(report::format_payroll_row));
        say_private_lines(ctx, &lines).await
    }
}

// Re-export all commands
pub use inner::*;
