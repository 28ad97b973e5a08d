//! Content item entity - Entries on the content calendar.
//!
//! Published or completed items count toward content-tracked KPIs and earn the
//! assignee the flat per-type rate configured on their profile.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publishing state of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Being written
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Waiting for approval
    #[sea_orm(string_value = "review")]
    Review,
    /// Approved and queued for its slot
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Live
    #[sea_orm(string_value = "published")]
    Published,
    /// Delivered and closed out
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl ContentStatus {
    /// Whether the item counts as delivered output (`published` or `completed`).
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Published | Self::Completed)
    }
}

/// Content item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Working title
    pub title: String,
    /// Free-form content type label (e.g., "video", "Blog Post")
    #[sea_orm(column_name = "type")]
    pub content_type: String,
    /// Profile responsible for the item
    pub assignee_id: Option<i64>,
    /// Publishing state
    pub status: ContentStatus,
    /// Calendar slot
    pub scheduled_date: Option<DateTimeUtc>,
    /// Spend attributed to the item
    pub actual_cost: Option<f64>,
    /// When the item was created
    pub created_at: DateTimeUtc,
}

/// Content items are only linked to profiles by id; no declared relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
