//! Profile entity - A team member together with the payroll settings used for estimation.
//!
//! Every numeric payroll field is nullable; the payroll estimator treats a missing value as zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Unique identifier for the team member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (unique, case-insensitive lookups)
    pub name: String,
    /// Job title shown in summaries (e.g., "Content Lead")
    pub position: Option<String>,
    /// Discord user ID linked to this member, if any
    pub discord_id: Option<String>,
    /// Monthly base salary
    pub base_salary: Option<f64>,
    /// Fixed monthly bonus added on top of everything else
    pub bonus_salary: Option<f64>,
    /// Bonus base the KPI coefficient is applied to
    pub kpi_bonus: Option<f64>,
    /// Base salary portion exempt from insurance
    pub insurance_threshold: Option<f64>,
    /// Insurance rate in percent, applied above the threshold
    pub insurance_percent: Option<f64>,
    /// Income tax rate in percent, applied above the fixed tax threshold
    pub tax_percent: Option<f64>,
    /// Flat bonus per published content item, keyed by content type (JSON object)
    #[sea_orm(column_type = "Json", nullable)]
    pub content_rates: Option<Json>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member owns many KPIs
    #[sea_orm(has_many = "super::kpi::Entity")]
    Kpis,
}

impl Related<super::kpi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kpis.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
