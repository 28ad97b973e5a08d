//! Shared test utilities for opsboard.
//!
//! This module provides helpers for setting up in-memory test databases, creating rows
//! through the core API with sensible defaults, and building plain entity models for
//! the pure computations. Date-bound fixtures use March 2024.

#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use crate::{
    core::{
        content::{self, NewContentItem},
        kpi::{self, NewKpi},
        member::{self, NewMember, PayrollSettings},
        tracking::TrackingRule,
    },
    entities::{self, ContentStatus, KpiPeriod, TaskStatus},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Shorthand for a UTC timestamp.
pub fn ts(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap()
}

/// Creates a member with no payroll settings.
pub async fn create_test_member(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::profile::Model> {
    member::create_member(
        db,
        NewMember {
            name: name.to_string(),
            position: Some("Marketing".to_string()),
            ..Default::default()
        },
    )
    .await
}

/// Creates a member with the reference payroll settings.
///
/// # Defaults
/// * `base_salary`: 10,000,000
/// * `kpi_bonus`: 2,000,000
/// * `insurance_threshold`: 5,000,000 at 10%
/// * `tax_percent`: 10%
/// * `content_rates`: video = 500,000
pub async fn create_paid_member(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::profile::Model> {
    let mut content_rates = BTreeMap::new();
    content_rates.insert("video".to_string(), 500_000.0);

    member::create_member(
        db,
        NewMember {
            name: name.to_string(),
            position: Some("Video Editor".to_string()),
            discord_id: None,
            payroll: PayrollSettings {
                base_salary: Some(10_000_000.0),
                bonus_salary: None,
                kpi_bonus: Some(2_000_000.0),
                insurance_threshold: Some(5_000_000.0),
                insurance_percent: Some(10.0),
                tax_percent: Some(10.0),
            },
            content_rates,
        },
    )
    .await
}

/// A manual March 2024 KPI definition for `user_id`.
pub fn new_kpi_fixture(user_id: i64, target_value: f64) -> NewKpi {
    NewKpi {
        user_id,
        name: "Published videos".to_string(),
        description: None,
        kpi_type: "content".to_string(),
        target_value,
        current_value: 0.0,
        unit: "videos".to_string(),
        period: KpiPeriod::Monthly,
        start_date: date(2024, 3, 1),
        end_date: date(2024, 3, 31),
        tracking: TrackingRule::Manual,
        bonus_value: None,
        created_by: None,
    }
}

/// Creates a manual March 2024 KPI with the given stored value.
pub async fn create_test_kpi(
    db: &DatabaseConnection,
    user_id: i64,
    target_value: f64,
    current_value: f64,
) -> Result<entities::kpi::Model> {
    let mut new_kpi = new_kpi_fixture(user_id, target_value);
    new_kpi.current_value = current_value;
    kpi::create_kpi(db, new_kpi).await
}

/// Creates an auto-tracked March 2024 KPI.
pub async fn create_tracked_kpi(
    db: &DatabaseConnection,
    user_id: i64,
    target_value: f64,
    rule: TrackingRule,
) -> Result<entities::kpi::Model> {
    let mut new_kpi = new_kpi_fixture(user_id, target_value);
    new_kpi.tracking = rule;
    kpi::create_kpi(db, new_kpi).await
}

/// Creates a content item scheduled at `at`.
pub async fn create_test_content(
    db: &DatabaseConnection,
    assignee_id: i64,
    content_type: &str,
    status: ContentStatus,
    at: DateTime<Utc>,
) -> Result<entities::content_item::Model> {
    content::create_content_item(
        db,
        NewContentItem {
            title: format!("{content_type} piece"),
            content_type: content_type.to_string(),
            assignee_id: Some(assignee_id),
            status,
            scheduled_date: Some(at),
            actual_cost: None,
        },
    )
    .await
}

/// In-memory member model with no payroll settings.
pub fn member_fixture(id: i64, name: &str) -> entities::profile::Model {
    entities::profile::Model {
        id,
        name: name.to_string(),
        position: Some("Marketing".to_string()),
        discord_id: None,
        base_salary: None,
        bonus_salary: None,
        kpi_bonus: None,
        insurance_threshold: None,
        insurance_percent: None,
        tax_percent: None,
        content_rates: None,
        created_at: ts(2024, 1, 1, 0, 0, 0),
    }
}

/// In-memory manual March 2024 KPI model.
pub fn kpi_fixture(user_id: i64, target_value: f64, current_value: f64) -> entities::kpi::Model {
    entities::kpi::Model {
        id: 1,
        user_id,
        name: "Published videos".to_string(),
        description: None,
        kpi_type: "content".to_string(),
        target_value,
        current_value,
        unit: "videos".to_string(),
        period: KpiPeriod::Monthly,
        start_date: date(2024, 3, 1),
        end_date: date(2024, 3, 31),
        auto_track: false,
        tracking_source: None,
        tracking_filter: None,
        bonus_value: None,
        created_by: None,
        created_at: ts(2024, 3, 1, 0, 0, 0),
        updated_at: ts(2024, 3, 1, 0, 0, 0),
    }
}

/// In-memory task model.
pub fn task_fixture(
    assigned_to: i64,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
) -> entities::task::Model {
    entities::task::Model {
        id: 0,
        title: "Task".to_string(),
        assigned_to: Some(assigned_to),
        status,
        completed_at,
        created_at: ts(2024, 3, 1, 0, 0, 0),
    }
}

/// In-memory content item model.
pub fn content_fixture(
    assignee_id: i64,
    content_type: &str,
    status: ContentStatus,
    scheduled_date: Option<DateTime<Utc>>,
) -> entities::content_item::Model {
    entities::content_item::Model {
        id: 0,
        title: format!("{content_type} piece"),
        content_type: content_type.to_string(),
        assignee_id: Some(assignee_id),
        status,
        scheduled_date,
        actual_cost: None,
        created_at: ts(2024, 3, 1, 0, 0, 0),
    }
}
