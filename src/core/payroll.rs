//! Payroll estimator.
//!
//! Combines a member's base salary, a tiered KPI bonus, per-content-type "extra product"
//! bonuses and their fixed bonus salary, then deducts insurance and tax. Figures are
//! recomputed on every read and never persisted.
//!
//! The coefficient tiers (85% / 100%) are independent of the KPI status buckets
//! (50% / 80% / 100%) in [`crate::core::progress`].

use crate::{
    core::{
        content, member,
        progress::{self, KpiProgress},
    },
    entities::{ContentItemModel, ProfileModel},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, prelude::Json};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Gross pay above this amount is taxed; below it no tax is due.
pub const TAX_THRESHOLD: f64 = 15_000_000.0;

/// Estimated pay breakdown for one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollRow {
    /// Profile id
    pub member_id: i64,
    /// Profile name
    pub member_name: String,
    /// Base salary
    pub base_salary: f64,
    /// Target of the primary KPI
    pub kpi_target: f64,
    /// Live value of the primary KPI
    pub total_tasks_done: f64,
    /// Primary KPI achievement in percent (unrounded)
    pub kpi_percent: f64,
    /// Bonus multiplier: 1.2 from 100%, 1.0 from 85%, else 0
    pub coefficient: f64,
    /// Amount the coefficient is applied to
    pub kpi_bonus_base: f64,
    /// `kpi_bonus_base * coefficient`
    pub kpi_bonus_amount: f64,
    /// Sum of per-content-type rates over delivered items
    pub extra_bonus: f64,
    /// Fixed bonus salary
    pub bonus_salary: f64,
    /// Base salary plus every bonus
    pub gross_total: f64,
    /// Insurance on the base salary above the member's threshold
    pub insurance_deduction: f64,
    /// Tax on gross pay above [`TAX_THRESHOLD`]
    pub tax_deduction: f64,
    /// Gross minus deductions
    pub net_pay: f64,
    /// Delivered items that earned a rate, by normalized content type
    pub product_counts: BTreeMap<String, usize>,
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Step function from KPI achievement to bonus multiplier.
#[must_use]
pub fn kpi_coefficient(kpi_percent: f64) -> f64 {
    if kpi_percent >= 100.0 {
        1.2
    } else if kpi_percent >= 85.0 {
        1.0
    } else {
        0.0
    }
}

/// Achievement percent of a value against a target; 0 for a non-positive target.
#[must_use]
pub fn kpi_percent(current_value: f64, target_value: f64) -> f64 {
    if target_value > 0.0 {
        current_value * 100.0 / target_value
    } else {
        0.0
    }
}

/// Insurance on the part of the base salary above `threshold`. Bonuses are never insured.
#[must_use]
pub fn insurance_deduction(base_salary: f64, threshold: f64, insurance_percent: f64) -> f64 {
    (base_salary - threshold).max(0.0) * insurance_percent / 100.0
}

/// Tax on the part of gross pay above [`TAX_THRESHOLD`].
#[must_use]
pub fn tax_deduction(gross_total: f64, tax_percent: f64) -> f64 {
    if gross_total > TAX_THRESHOLD {
        (gross_total - TAX_THRESHOLD) * tax_percent / 100.0
    } else {
        0.0
    }
}

/// Builds the rate lookup from a member's `content_rates` JSON object.
///
/// Keys are trimmed and lower-cased. Values may be numbers or numeric strings; anything
/// else, and any non-positive rate, is dropped.
#[must_use]
pub fn normalized_rates(content_rates: Option<&Json>) -> HashMap<String, f64> {
    let Some(Json::Object(map)) = content_rates else {
        return HashMap::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let rate = match value {
                Json::Number(n) => n.as_f64(),
                Json::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            (rate.is_finite() && rate > 0.0).then(|| (normalize_key(key), rate))
        })
        .collect()
}

/// Picks the KPI payroll is based on: the first auto-tracked one, else the first one.
#[must_use]
pub fn select_primary_kpi<'a>(kpis: &[&'a KpiProgress]) -> Option<&'a KpiProgress> {
    kpis.iter()
        .find(|p| p.is_auto_tracked())
        .or_else(|| kpis.first())
        .copied()
}

/// Estimates pay for one member.
///
/// `active_kpis` and `content_items` may contain other members' rows; only those owned
/// by or assigned to `member` are considered. The order of `active_kpis` decides the
/// primary KPI.
#[must_use]
pub fn compute_payroll_row(
    member: &ProfileModel,
    active_kpis: &[KpiProgress],
    content_items: &[ContentItemModel],
) -> PayrollRow {
    let own_kpis: Vec<&KpiProgress> = active_kpis
        .iter()
        .filter(|p| p.kpi.user_id == member.id)
        .collect();
    let primary = select_primary_kpi(&own_kpis);

    let (kpi_target, total_tasks_done) =
        primary.map_or((0.0, 0.0), |p| (p.kpi.target_value, p.current_value));
    let kpi_percent = kpi_percent(total_tasks_done, kpi_target);
    let coefficient = kpi_coefficient(kpi_percent);

    // An unset or zero member bonus falls through to the KPI's own bonus value.
    let kpi_bonus_base = amount(
        member
            .kpi_bonus
            .filter(|v| *v != 0.0)
            .or_else(|| primary.and_then(|p| p.kpi.bonus_value)),
    );
    let kpi_bonus_amount = kpi_bonus_base * coefficient;

    let rates = normalized_rates(member.content_rates.as_ref());
    let mut extra_bonus = 0.0;
    let mut product_counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in content_items
        .iter()
        .filter(|item| item.assignee_id == Some(member.id))
        .filter(|item| item.status.is_delivered())
    {
        let key = normalize_key(&item.content_type);
        if let Some(rate) = rates.get(&key) {
            extra_bonus += rate;
            *product_counts.entry(key).or_default() += 1;
        }
    }

    let base_salary = amount(member.base_salary);
    let bonus_salary = amount(member.bonus_salary);
    let gross_total = base_salary + kpi_bonus_amount + extra_bonus + bonus_salary;

    let insurance_deduction = insurance_deduction(
        base_salary,
        amount(member.insurance_threshold),
        amount(member.insurance_percent),
    );
    let tax_deduction = tax_deduction(gross_total, amount(member.tax_percent));

    PayrollRow {
        member_id: member.id,
        member_name: member.name.clone(),
        base_salary,
        kpi_target,
        total_tasks_done,
        kpi_percent,
        coefficient,
        kpi_bonus_base,
        kpi_bonus_amount,
        extra_bonus,
        bonus_salary,
        gross_total,
        insurance_deduction,
        tax_deduction,
        net_pay: gross_total - insurance_deduction - tax_deduction,
        product_counts,
    }
}

/// Payroll estimate for every member as of `reference`.
///
/// Uses the KPIs active on `reference` and the content items scheduled in the calendar
/// month containing it.
pub async fn get_payroll(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<Vec<PayrollRow>> {
    let members = member::get_all_members(db).await?;
    let kpis = progress::get_active_kpi_progress(db, reference).await?;
    let items = content::get_content_items_for_month(db, reference).await?;

    let rows: Vec<PayrollRow> = members
        .iter()
        .map(|m| compute_payroll_row(m, &kpis, &items))
        .collect();

    tracing::debug!("Estimated payroll for {} members as of {}", rows.len(), reference);
    Ok(rows)
}

/// Payroll estimate for a single member as of `reference`.
pub async fn get_payroll_for_member(
    db: &DatabaseConnection,
    member_id: i64,
    reference: NaiveDate,
) -> Result<PayrollRow> {
    let member = member::get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })?;
    let kpis = progress::get_active_kpi_progress(db, reference).await?;
    let items = content::get_content_items_for_month(db, reference).await?;

    Ok(compute_payroll_row(&member, &kpis, &items))
}
