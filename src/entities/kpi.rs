//! KPI entity - A measurable target assigned to one team member over a date range.
//!
//! When `auto_track` is set, `current_value` is recomputed on every read from tasks or
//! content items; the stored column then only holds the last manual update.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What an auto-tracked KPI counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TrackingSource {
    /// Completed tasks assigned to the owner
    #[sea_orm(string_value = "tasks")]
    Tasks,
    /// Published or completed content items assigned to the owner
    #[sea_orm(string_value = "content")]
    Content,
}

/// Reporting period of a KPI (informational)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum KpiPeriod {
    /// One week
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// One calendar month
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// One quarter
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// One year
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// KPI database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kpis")]
pub struct Model {
    /// Unique identifier for the KPI
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile that owns the KPI
    pub user_id: i64,
    /// Short name (e.g., "Videos published")
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Informational category (e.g., "content", "sales")
    pub kpi_type: String,
    /// Value that counts as 100%
    pub target_value: f64,
    /// Last manually recorded value
    pub current_value: f64,
    /// Display unit (e.g., "videos")
    pub unit: String,
    /// Reporting period
    pub period: KpiPeriod,
    /// First day of the KPI window (inclusive)
    pub start_date: Date,
    /// Last day of the KPI window (inclusive)
    pub end_date: Date,
    /// Whether `current_value` is derived from activity instead of manual updates
    pub auto_track: bool,
    /// What auto-tracking counts
    pub tracking_source: Option<TrackingSource>,
    /// Extra filter for the source, e.g. `{"content_type": "video"}`
    #[sea_orm(column_type = "Json", nullable)]
    pub tracking_filter: Option<Json>,
    /// Fallback bonus base used by payroll when the owner has no `kpi_bonus`
    pub bonus_value: Option<f64>,
    /// Profile that created the KPI
    pub created_by: Option<i64>,
    /// When the KPI was created
    pub created_at: DateTimeUtc,
    /// When the KPI was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between KPI and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each KPI belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
    /// One KPI has many history snapshots
    #[sea_orm(has_many = "super::kpi_history::Entity")]
    History,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::kpi_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
