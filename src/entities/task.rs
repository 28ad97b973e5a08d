//! Task entity - Kanban cards; completed ones feed task-tracked KPIs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kanban column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    #[sea_orm(string_value = "todo")]
    Todo,
    /// Being worked on
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Waiting for review
    #[sea_orm(string_value = "review")]
    Review,
    /// Finished; counts toward task-tracked KPIs
    #[sea_orm(string_value = "done")]
    Done,
}

/// Task database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Unique identifier for the task
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short title of the card
    pub title: String,
    /// Profile the task is assigned to
    pub assigned_to: Option<i64>,
    /// Current Kanban status
    pub status: TaskStatus,
    /// Set when the task moves to `done`, cleared when it leaves it
    pub completed_at: Option<DateTimeUtc>,
    /// When the task was created
    pub created_at: DateTimeUtc,
}

/// Tasks are only linked to profiles by id; no declared relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
