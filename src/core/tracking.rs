//! Auto-tracking rules and date windows for KPIs.
//!
//! A KPI row stores its tracking configuration as three loosely related columns
//! (`auto_track`, `tracking_source`, `tracking_filter`). This module folds them into a
//! single [`TrackingRule`] so the progress engine can match on it exhaustively, and
//! provides the inclusive [`DateWindow`] used when counting activity.

use crate::entities::{ContentItemModel, KpiModel, TaskModel, TaskStatus, TrackingSource};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use sea_orm::prelude::Json;

/// Filter key understood for the content source.
const CONTENT_TYPE_KEY: &str = "content_type";
/// Filter value meaning "every content type".
const ALL_CONTENT_TYPES: &str = "all";

/// How a KPI's live value is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingRule {
    /// The stored `current_value` is used as-is.
    Manual,
    /// Count tasks the owner completed inside the KPI window.
    Tasks,
    /// Count delivered content items the owner is assigned to inside the KPI window,
    /// optionally restricted to one content type (`None` means all types).
    Content {
        /// Normalized (trimmed, lower-cased) content type, if restricted
        content_type: Option<String>,
    },
}

impl TrackingRule {
    /// Builds the rule described by a KPI row.
    ///
    /// `auto_track` without a recognised source falls back to [`TrackingRule::Manual`].
    /// A missing, empty or `"all"` content type filter means no type restriction.
    #[must_use]
    pub fn from_kpi(kpi: &KpiModel) -> Self {
        if !kpi.auto_track {
            return Self::Manual;
        }

        match kpi.tracking_source {
            Some(TrackingSource::Tasks) => Self::Tasks,
            Some(TrackingSource::Content) => Self::Content {
                content_type: content_type_from_filter(kpi.tracking_filter.as_ref()),
            },
            None => Self::Manual,
        }
    }

    /// Builds a content rule from a user-supplied type, normalizing `"all"` away.
    #[must_use]
    pub fn content(content_type: Option<&str>) -> Self {
        Self::Content {
            content_type: content_type.and_then(normalize_content_type),
        }
    }

    /// Whether the live value is derived from activity.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        !matches!(self, Self::Manual)
    }

    /// The `tracking_source` column value for this rule.
    #[must_use]
    pub const fn source(&self) -> Option<TrackingSource> {
        match self {
            Self::Manual => None,
            Self::Tasks => Some(TrackingSource::Tasks),
            Self::Content { .. } => Some(TrackingSource::Content),
        }
    }

    /// The `tracking_filter` column value for this rule.
    #[must_use]
    pub fn filter_json(&self) -> Option<Json> {
        match self {
            Self::Content {
                content_type: Some(content_type),
            } => Some(serde_json::json!({ CONTENT_TYPE_KEY: content_type })),
            Self::Content { content_type: None } => {
                Some(serde_json::json!({ CONTENT_TYPE_KEY: ALL_CONTENT_TYPES }))
            }
            Self::Manual | Self::Tasks => None,
        }
    }

    /// Counts the activity rows this rule credits to `user_id` inside `window`.
    ///
    /// Returns `None` for [`TrackingRule::Manual`], which has nothing to count.
    #[must_use]
    pub fn count(
        &self,
        user_id: i64,
        window: &DateWindow,
        tasks: &[TaskModel],
        content_items: &[ContentItemModel],
    ) -> Option<usize> {
        match self {
            Self::Manual => None,
            Self::Tasks => Some(
                tasks
                    .iter()
                    .filter(|task| task.assigned_to == Some(user_id))
                    .filter(|task| task.status == TaskStatus::Done)
                    .filter(|task| task.completed_at.is_some_and(|at| window.contains(at)))
                    .count(),
            ),
            Self::Content { content_type } => Some(
                content_items
                    .iter()
                    .filter(|item| item.assignee_id == Some(user_id))
                    .filter(|item| item.status.is_delivered())
                    .filter(|item| item.scheduled_date.is_some_and(|at| window.contains(at)))
                    .filter(|item| {
                        content_type.as_deref().is_none_or(|wanted| {
                            normalize_content_type(&item.content_type).as_deref() == Some(wanted)
                        })
                    })
                    .count(),
            ),
        }
    }
}

/// Trims and lower-cases a content type label; empty labels and `"all"` become `None`.
#[must_use]
pub fn normalize_content_type(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() || normalized == ALL_CONTENT_TYPES {
        None
    } else {
        Some(normalized)
    }
}

fn content_type_from_filter(filter: Option<&Json>) -> Option<String> {
    filter
        .and_then(|f| f.get(CONTENT_TYPE_KEY))
        .and_then(Json::as_str)
        .and_then(normalize_content_type)
}

/// Inclusive calendar window, from midnight on `start` to 23:59:59 on `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// First day, inclusive
    pub start: NaiveDate,
    /// Last day, inclusive through 23:59:59
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window between two dates.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The counting window of a KPI.
    #[must_use]
    pub const fn for_kpi(kpi: &KpiModel) -> Self {
        Self::new(kpi.start_date, kpi.end_date)
    }

    /// The calendar month containing `date`.
    #[must_use]
    pub fn month_containing(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self::new(first, last)
    }

    /// Whether a timestamp falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let at = at.naive_utc();
        match (
            self.start.and_hms_opt(0, 0, 0),
            self.end.and_hms_opt(23, 59, 59),
        ) {
            (Some(from), Some(to)) => from <= at && at <= to,
            _ => false,
        }
    }

    /// Whether a calendar day falls inside the window.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A KPI is active while the reference date lies within its date range.
#[must_use]
pub fn is_active(kpi: &KpiModel, reference: NaiveDate) -> bool {
    DateWindow::for_kpi(kpi).contains_date(reference)
}
