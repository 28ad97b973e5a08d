//! KPI history entity - Append-only log of manual progress updates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// KPI history database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kpi_history")]
pub struct Model {
    /// Unique identifier for the snapshot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// KPI the snapshot belongs to
    pub kpi_id: i64,
    /// Value recorded by the update
    pub value: f64,
    /// Optional free-text note
    pub note: Option<String>,
    /// Profile that recorded the update
    pub recorded_by: Option<i64>,
    /// When the update was recorded
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between history rows and KPIs
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each snapshot belongs to one KPI
    #[sea_orm(
        belongs_to = "super::kpi::Entity",
        from = "Column::KpiId",
        to = "super::kpi::Column::Id"
    )]
    Kpi,
}

impl Related<super::kpi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kpi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
