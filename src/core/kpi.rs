//! KPI business logic - Handles creating, reading, updating and deleting KPIs.
//!
//! Manual progress updates overwrite the stored `current_value` and append a snapshot to
//! the KPI history log inside one database transaction. Auto-tracked values are never
//! persisted here; see [`crate::core::progress`].

use crate::{
    core::{member, tracking::TrackingRule},
    entities::{Kpi, KpiHistory, KpiPeriod, kpi, kpi_history},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Everything needed to create a KPI.
#[derive(Debug, Clone)]
pub struct NewKpi {
    /// Owning profile
    pub user_id: i64,
    /// Short name
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Informational category
    pub kpi_type: String,
    /// Value that counts as 100%
    pub target_value: f64,
    /// Initial stored value
    pub current_value: f64,
    /// Display unit
    pub unit: String,
    /// Reporting period
    pub period: KpiPeriod,
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
    /// How the live value is obtained
    pub tracking: TrackingRule,
    /// Fallback payroll bonus base
    pub bonus_value: Option<f64>,
    /// Profile creating the KPI
    pub created_by: Option<i64>,
}

fn validate_new_kpi(new_kpi: &NewKpi) -> Result<()> {
    if new_kpi.name.trim().is_empty() {
        return Err(Error::InvalidKpi {
            message: "KPI name cannot be empty".to_string(),
        });
    }

    if new_kpi.end_date < new_kpi.start_date {
        return Err(Error::InvalidKpi {
            message: format!(
                "end date {} is before start date {}",
                new_kpi.end_date, new_kpi.start_date
            ),
        });
    }

    if !new_kpi.target_value.is_finite() || new_kpi.target_value < 0.0 {
        return Err(Error::InvalidAmount {
            amount: new_kpi.target_value,
        });
    }

    if !new_kpi.current_value.is_finite() || new_kpi.current_value < 0.0 {
        return Err(Error::InvalidAmount {
            amount: new_kpi.current_value,
        });
    }

    if let Some(bonus) = new_kpi
        .bonus_value
        .filter(|bonus| !bonus.is_finite() || *bonus < 0.0)
    {
        return Err(Error::InvalidAmount { amount: bonus });
    }

    Ok(())
}

/// Creates a KPI after validating its date range, amounts and owner.
pub async fn create_kpi(db: &DatabaseConnection, new_kpi: NewKpi) -> Result<kpi::Model> {
    validate_new_kpi(&new_kpi)?;

    if member::get_member_by_id(db, new_kpi.user_id).await?.is_none() {
        return Err(Error::MemberNotFound {
            id: new_kpi.user_id.to_string(),
        });
    }

    let now = chrono::Utc::now();
    let model = kpi::ActiveModel {
        user_id: Set(new_kpi.user_id),
        name: Set(new_kpi.name.trim().to_string()),
        description: Set(new_kpi.description),
        kpi_type: Set(new_kpi.kpi_type),
        target_value: Set(new_kpi.target_value),
        current_value: Set(new_kpi.current_value),
        unit: Set(new_kpi.unit),
        period: Set(new_kpi.period),
        start_date: Set(new_kpi.start_date),
        end_date: Set(new_kpi.end_date),
        auto_track: Set(new_kpi.tracking.is_auto()),
        tracking_source: Set(new_kpi.tracking.source()),
        tracking_filter: Set(new_kpi.tracking.filter_json()),
        bonus_value: Set(new_kpi.bonus_value),
        created_by: Set(new_kpi.created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    tracing::info!(
        "Created KPI '{}' (id {}) for member {}",
        created.name,
        created.id,
        created.user_id
    );
    Ok(created)
}

/// Finds a KPI by its unique ID.
pub async fn get_kpi_by_id(db: &DatabaseConnection, kpi_id: i64) -> Result<Option<kpi::Model>> {
    Kpi::find_by_id(kpi_id).one(db).await.map_err(Into::into)
}

/// All KPIs owned by a member, newest first.
pub async fn get_kpis_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<kpi::Model>> {
    Kpi::find()
        .filter(kpi::Column::UserId.eq(user_id))
        .order_by_desc(kpi::Column::CreatedAt)
        .order_by_desc(kpi::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// KPIs whose date range contains `reference`, newest first.
///
/// The newest-first order is the stable order payroll uses to pick a member's primary KPI.
pub async fn get_active_kpis(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<Vec<kpi::Model>> {
    Kpi::find()
        .filter(kpi::Column::StartDate.lte(reference))
        .filter(kpi::Column::EndDate.gte(reference))
        .order_by_desc(kpi::Column::CreatedAt)
        .order_by_desc(kpi::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a manual progress update and appends it to the KPI history.
///
/// The stored value is updated even when the KPI is auto-tracked; it is only shown
/// again once auto-tracking is switched off.
pub async fn update_kpi_progress(
    db: &DatabaseConnection,
    kpi_id: i64,
    new_value: f64,
    note: Option<String>,
    recorded_by: Option<i64>,
) -> Result<kpi::Model> {
    if !new_value.is_finite() || new_value < 0.0 {
        return Err(Error::InvalidAmount { amount: new_value });
    }

    let txn = db.begin().await?;

    let existing = Kpi::find_by_id(kpi_id)
        .one(&txn)
        .await?
        .ok_or(Error::KpiNotFound { id: kpi_id })?;

    if TrackingRule::from_kpi(&existing).is_auto() {
        tracing::warn!(
            "KPI {} is auto-tracked; stored value {} will not be displayed",
            kpi_id,
            new_value
        );
    }

    let now = chrono::Utc::now();
    let mut active: kpi::ActiveModel = existing.into();
    active.current_value = Set(new_value);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    kpi_history::ActiveModel {
        kpi_id: Set(kpi_id),
        value: Set(new_value),
        note: Set(note),
        recorded_by: Set(recorded_by),
        recorded_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(updated)
}

/// Whether `actor_id` may record progress on `kpi`: its owner or its creator.
#[must_use]
pub fn can_record_progress(kpi: &kpi::Model, actor_id: i64) -> bool {
    kpi.user_id == actor_id || kpi.created_by == Some(actor_id)
}

/// Records manual progress on behalf of a member, rejecting anyone but the KPI's owner
/// or creator.
pub async fn record_progress_as(
    db: &DatabaseConnection,
    kpi_id: i64,
    new_value: f64,
    note: Option<String>,
    actor_id: i64,
) -> Result<kpi::Model> {
    let existing = get_kpi_by_id(db, kpi_id)
        .await?
        .ok_or(Error::KpiNotFound { id: kpi_id })?;

    if !can_record_progress(&existing, actor_id) {
        tracing::warn!("Member {} denied progress update on KPI {}", actor_id, kpi_id);
        return Err(Error::NotPermitted { actor_id, kpi_id });
    }

    update_kpi_progress(db, kpi_id, new_value, note, Some(actor_id)).await
}

/// Switches a KPI between manual and auto-tracked modes, or changes what it tracks.
pub async fn set_auto_tracking(
    db: &DatabaseConnection,
    kpi_id: i64,
    rule: &TrackingRule,
) -> Result<kpi::Model> {
    let existing = get_kpi_by_id(db, kpi_id)
        .await?
        .ok_or(Error::KpiNotFound { id: kpi_id })?;

    let mut active: kpi::ActiveModel = existing.into();
    active.auto_track = Set(rule.is_auto());
    active.tracking_source = Set(rule.source());
    active.tracking_filter = Set(rule.filter_json());
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Manual progress snapshots for a KPI, newest first.
pub async fn get_kpi_history(
    db: &DatabaseConnection,
    kpi_id: i64,
) -> Result<Vec<kpi_history::Model>> {
    KpiHistory::find()
        .filter(kpi_history::Column::KpiId.eq(kpi_id))
        .order_by_desc(kpi_history::Column::RecordedAt)
        .order_by_desc(kpi_history::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Permanently deletes a KPI together with its history.
pub async fn delete_kpi(db: &DatabaseConnection, kpi_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    KpiHistory::delete_many()
        .filter(kpi_history::Column::KpiId.eq(kpi_id))
        .exec(&txn)
        .await?;

    let result = Kpi::delete_by_id(kpi_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        // Dropping the transaction rolls back the history delete.
        return Err(Error::KpiNotFound { id: kpi_id });
    }

    txn.commit().await?;
    tracing::info!("Deleted KPI {}", kpi_id);
    Ok(())
}
