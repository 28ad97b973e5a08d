//! Report formatting.
//!
//! Turns KPI progress, stats, summaries and payroll rows into plain text lines. All
//! functions are framework-agnostic; the bot layer only joins and sends what they return.

use crate::core::{
    payroll::PayrollRow,
    progress::{KpiProgress, KpiStats, KpiSummary, StatusBucket},
};

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80%`. The fill is clamped to
/// 0..=100 while the printed number is not.
#[must_use]
pub fn format_progress_bar(progress_percent: i64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = progress_percent.clamp(0, 100);

    // clamped ∈ [0, 100], length is small; the product fits comfortably.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((clamped as usize) * length + 50) / 100;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent}%")
}

/// Formats a money amount rounded to whole units with `,` thousands separators.
///
/// `12500000.0` becomes `"12,500,000"`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    // Payroll amounts are far inside i64 range.
    #[allow(clippy::cast_possible_truncation)]
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a value without a trailing `.0` when it is whole.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Emoji marker for a status bucket.
#[must_use]
pub const fn status_marker(status: StatusBucket) -> &'static str {
    match status {
        StatusBucket::Completed => "✅",
        StatusBucket::OnTrack => "🟢",
        StatusBucket::AtRisk => "🟡",
        StatusBucket::Behind => "🔴",
    }
}

/// One line per KPI: marker, name, value against target, bar and bucket.
#[must_use]
pub fn format_kpi_line(progress: &KpiProgress) -> String {
    let kpi = &progress.kpi;
    let auto = if progress.is_live() {
        " (auto)"
    } else {
        ""
    };

    format!(
        "{} #{} {}{auto}: {}/{} {} {} {}",
        status_marker(progress.status),
        kpi.id,
        kpi.name,
        format_value(progress.current_value),
        format_value(kpi.target_value),
        kpi.unit,
        format_progress_bar(progress.percentage, Some(10)),
        progress.status.label()
    )
}

/// Team-wide bucket counts on one line.
#[must_use]
pub fn format_stats(stats: &KpiStats) -> String {
    format!(
        "{} active KPIs | ✅ {} completed | 🟢 {} on track | 🟡 {} at risk | 🔴 {} behind",
        stats.total, stats.completed, stats.on_track, stats.at_risk, stats.behind
    )
}

/// One member's roll-up on one line.
#[must_use]
pub fn format_summary_row(summary: &KpiSummary) -> String {
    let position = if summary.position.is_empty() {
        String::new()
    } else {
        format!(" ({})", summary.position)
    };

    format!(
        "{}{position}: {} KPIs, avg {}% | ✅ {} 🟢 {} 🟡 {} 🔴 {}",
        summary.user_name,
        summary.total_kpis,
        summary.avg_completion,
        summary.completed,
        summary.on_track,
        summary.at_risk,
        summary.behind
    )
}

/// Multi-line payroll breakdown for one member.
#[must_use]
pub fn format_payroll_row(row: &PayrollRow) -> String {
    let products = if row.product_counts.is_empty() {
        "none".to_string()
    } else {
        row.product_counts
            .iter()
            .map(|(kind, count)| format!("{kind} x{count}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "**{}**\n\
         Base: {} | KPI: {}/{} ({:.1}%, x{:.1}) → {}\n\
         Extra: {} ({products}) | Bonus salary: {}\n\
         Gross: {} | Insurance: -{} | Tax: -{}\n\
         **Net: {}**",
        row.member_name,
        format_money(row.base_salary),
        format_value(row.total_tasks_done),
        format_value(row.kpi_target),
        row.kpi_percent,
        row.coefficient,
        format_money(row.kpi_bonus_amount),
        format_money(row.extra_bonus),
        format_money(row.bonus_salary),
        format_money(row.gross_total),
        format_money(row.insurance_deduction),
        format_money(row.tax_deduction),
        format_money(row.net_pay),
    )
}
