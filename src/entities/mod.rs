//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod content_item;
pub mod kpi;
pub mod kpi_history;
pub mod profile;
pub mod task;

// Re-export specific types to avoid conflicts
pub use content_item::{
    Column as ContentItemColumn, ContentStatus, Entity as ContentItem, Model as ContentItemModel,
};
pub use kpi::{Column as KpiColumn, Entity as Kpi, KpiPeriod, Model as KpiModel, TrackingSource};
pub use kpi_history::{
    Column as KpiHistoryColumn, Entity as KpiHistory, Model as KpiHistoryModel,
};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use task::{Column as TaskColumn, Entity as Task, Model as TaskModel, TaskStatus};
