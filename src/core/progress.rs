//! KPI progress engine.
//!
//! Derives the live value of each KPI (stored value, or a count of completed tasks /
//! delivered content for auto-tracked KPIs), converts it to a percent of target and
//! sorts the KPI into a status bucket. The computations are pure; the async wrappers at
//! the bottom only fetch the activity snapshot and KPI rows they run over.
//!
//! Live values are never written back to the `kpis` table.

use crate::{
    core::{
        kpi,
        tracking::{DateWindow, TrackingRule, is_active},
    },
    core::member,
    entities::{
        ContentItem, ContentItemModel, KpiModel, ProfileModel, Task, TaskModel, TaskStatus,
        content_item, task,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Health bucket of a KPI, by percent of target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    /// 100% or more
    Completed,
    /// 80% up to 100%
    OnTrack,
    /// 50% up to 80%
    AtRisk,
    /// Below 50%
    Behind,
}

impl StatusBucket {
    /// Classifies a rounded percentage; each bucket includes its lower bound.
    #[must_use]
    pub const fn from_percentage(percentage: i64) -> Self {
        if percentage >= 100 {
            Self::Completed
        } else if percentage >= 80 {
            Self::OnTrack
        } else if percentage >= 50 {
            Self::AtRisk
        } else {
            Self::Behind
        }
    }

    /// Short label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::OnTrack => "on track",
            Self::AtRisk => "at risk",
            Self::Behind => "behind",
        }
    }
}

/// Tasks and content items the engine counts over.
#[derive(Debug, Clone, Default)]
pub struct ActivitySnapshot {
    /// Task rows (any status; filtering happens per rule)
    pub tasks: Vec<TaskModel>,
    /// Content item rows (any status; filtering happens per rule)
    pub content_items: Vec<ContentItemModel>,
}

/// A KPI together with its live value and classification.
#[derive(Debug, Clone, Serialize)]
pub struct KpiProgress {
    /// The KPI row as stored
    pub kpi: KpiModel,
    /// Value shown to users: the stored value, or the live count when auto-tracked
    pub current_value: f64,
    /// Percent of target, rounded; 0 when the target is not positive
    pub percentage: i64,
    /// Bucket derived from `percentage`
    pub status: StatusBucket,
    /// Whether the reference date lies inside the KPI's date range
    pub active: bool,
}

impl KpiProgress {
    /// The raw `auto_track` flag. Payroll picks its primary KPI on this flag.
    #[must_use]
    pub const fn is_auto_tracked(&self) -> bool {
        self.kpi.auto_track
    }

    /// Whether `current_value` came from activity rather than the stored column.
    ///
    /// False for a KPI flagged `auto_track` without a usable source.
    #[must_use]
    pub fn is_live(&self) -> bool {
        TrackingRule::from_kpi(&self.kpi).is_auto()
    }
}

/// Bucket tallies over a set of KPIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KpiStats {
    /// Number of KPIs counted
    pub total: usize,
    /// KPIs at or above 100%
    pub completed: usize,
    /// KPIs from 80% to below 100%
    pub on_track: usize,
    /// KPIs from 50% to below 80%
    pub at_risk: usize,
    /// KPIs below 50%
    pub behind: usize,
}

impl KpiStats {
    fn record(&mut self, status: StatusBucket) {
        self.total += 1;
        match status {
            StatusBucket::Completed => self.completed += 1,
            StatusBucket::OnTrack => self.on_track += 1,
            StatusBucket::AtRisk => self.at_risk += 1,
            StatusBucket::Behind => self.behind += 1,
        }
    }
}

/// Per-member KPI roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiSummary {
    /// Owning profile id
    pub user_id: i64,
    /// Owner display name, `"Unknown"` when the profile is missing
    pub user_name: String,
    /// Owner position, empty when unset
    pub position: String,
    /// Number of active KPIs
    pub total_kpis: usize,
    /// KPIs at or above 100%
    pub completed: usize,
    /// KPIs from 80% to below 100%
    pub on_track: usize,
    /// KPIs from 50% to below 80%
    pub at_risk: usize,
    /// KPIs below 50%
    pub behind: usize,
    /// Mean of the (unclamped) percentages, rounded
    pub avg_completion: i64,
}

/// Percent of target, rounded half away from zero. A non-positive target yields 0.
#[must_use]
pub fn percentage(current_value: f64, target_value: f64) -> i64 {
    if target_value > 0.0 {
        // Percentages of realistic KPI values are far inside i64 range.
        #[allow(clippy::cast_possible_truncation)]
        let rounded = (current_value * 100.0 / target_value).round() as i64;
        rounded
    } else {
        0
    }
}

/// Value shown for a KPI: the live activity count when auto-tracked, else the stored value.
#[must_use]
pub fn live_value(kpi: &KpiModel, activity: &ActivitySnapshot) -> f64 {
    let window = DateWindow::for_kpi(kpi);
    TrackingRule::from_kpi(kpi)
        .count(kpi.user_id, &window, &activity.tasks, &activity.content_items)
        .map_or(kpi.current_value, |count| {
            // Activity counts are small; f64 represents them exactly.
            #[allow(clippy::cast_precision_loss)]
            let count = count as f64;
            count
        })
}

/// Computes live value, percentage and bucket for one KPI as of `reference`.
#[must_use]
pub fn compute_kpi_progress(
    kpi: KpiModel,
    activity: &ActivitySnapshot,
    reference: NaiveDate,
) -> KpiProgress {
    let current_value = live_value(&kpi, activity);
    let percentage = percentage(current_value, kpi.target_value);
    let active = is_active(&kpi, reference);

    KpiProgress {
        kpi,
        current_value,
        percentage,
        status: StatusBucket::from_percentage(percentage),
        active,
    }
}

/// Tallies buckets over the active entries of `progress`.
#[must_use]
pub fn kpi_stats(progress: &[KpiProgress]) -> KpiStats {
    progress
        .iter()
        .filter(|p| p.active)
        .fold(KpiStats::default(), |mut stats, p| {
            stats.record(p.status);
            stats
        })
}

/// Groups the active entries of `progress` by owner and rolls them up.
///
/// Rows are ordered by user name, then user id.
#[must_use]
pub fn summarize_by_user(progress: &[KpiProgress], members: &[ProfileModel]) -> Vec<KpiSummary> {
    let members: HashMap<i64, &ProfileModel> = members.iter().map(|m| (m.id, m)).collect();

    let mut grouped: BTreeMap<i64, Vec<&KpiProgress>> = BTreeMap::new();
    for entry in progress.iter().filter(|p| p.active) {
        grouped.entry(entry.kpi.user_id).or_default().push(entry);
    }

    let mut summaries: Vec<KpiSummary> = grouped
        .into_iter()
        .map(|(user_id, entries)| {
            let member = members.get(&user_id);
            let stats = entries.iter().fold(KpiStats::default(), |mut stats, p| {
                stats.record(p.status);
                stats
            });
            let sum: i64 = entries.iter().map(|p| p.percentage).sum();
            // Group sizes and percentage sums stay well inside f64's exact integer range.
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let avg_completion = (sum as f64 / entries.len() as f64).round() as i64;

            KpiSummary {
                user_id,
                user_name: member.map_or_else(|| "Unknown".to_string(), |m| m.name.clone()),
                position: member
                    .and_then(|m| m.position.clone())
                    .unwrap_or_default(),
                total_kpis: stats.total,
                completed: stats.completed,
                on_track: stats.on_track,
                at_risk: stats.at_risk,
                behind: stats.behind,
                avg_completion,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.user_name
            .cmp(&b.user_name)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    summaries
}

/// Fetches the rows auto-tracking can credit: done tasks with a completion time and
/// delivered content items with a calendar slot, from the start of `since` onward.
///
/// `since` only bounds the query. Exact window filtering happens in
/// [`TrackingRule::count`], so the same snapshot serves KPIs with different date ranges.
pub async fn load_activity(db: &DatabaseConnection, since: NaiveDate) -> Result<ActivitySnapshot> {
    let since = since.and_time(NaiveTime::MIN).and_utc();

    let tasks = Task::find()
        .filter(task::Column::Status.eq(TaskStatus::Done))
        .filter(task::Column::CompletedAt.gte(since))
        .filter(task::Column::AssignedTo.is_not_null())
        .all(db)
        .await?;

    let content_items = ContentItem::find()
        .filter(content_item::Column::Status.is_in([
            content_item::ContentStatus::Published,
            content_item::ContentStatus::Completed,
        ]))
        .filter(content_item::Column::ScheduledDate.gte(since))
        .filter(content_item::Column::AssigneeId.is_not_null())
        .all(db)
        .await?;

    tracing::debug!(
        "Loaded activity snapshot: {} done tasks, {} delivered content items",
        tasks.len(),
        content_items.len()
    );

    Ok(ActivitySnapshot {
        tasks,
        content_items,
    })
}

/// Progress of a single KPI as of `reference`.
pub async fn get_kpi_progress(
    db: &DatabaseConnection,
    kpi_id: i64,
    reference: NaiveDate,
) -> Result<KpiProgress> {
    let kpi = kpi::get_kpi_by_id(db, kpi_id)
        .await?
        .ok_or(Error::KpiNotFound { id: kpi_id })?;

    let activity = if TrackingRule::from_kpi(&kpi).is_auto() {
        load_activity(db, kpi.start_date).await?
    } else {
        ActivitySnapshot::default()
    };

    Ok(compute_kpi_progress(kpi, &activity, reference))
}

/// Progress of every KPI active at `reference`, newest KPI first.
pub async fn get_active_kpi_progress(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<Vec<KpiProgress>> {
    let kpis = kpi::get_active_kpis(db, reference).await?;
    let earliest_tracked = kpis
        .iter()
        .filter(|k| TrackingRule::from_kpi(k).is_auto())
        .map(|k| k.start_date)
        .min();
    let activity = match earliest_tracked {
        Some(since) => load_activity(db, since).await?,
        None => ActivitySnapshot::default(),
    };

    tracing::debug!("Evaluating {} active KPIs as of {}", kpis.len(), reference);

    Ok(kpis
        .into_iter()
        .map(|k| compute_kpi_progress(k, &activity, reference))
        .collect())
}

/// Bucket tallies over all KPIs active at `reference`.
pub async fn get_kpi_stats(db: &DatabaseConnection, reference: NaiveDate) -> Result<KpiStats> {
    let progress = get_active_kpi_progress(db, reference).await?;
    Ok(kpi_stats(&progress))
}

/// Per-member roll-up of all KPIs active at `reference`.
pub async fn get_kpi_summary_by_user(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<Vec<KpiSummary>> {
    let progress = get_active_kpi_progress(db, reference).await?;
    let members = member::get_all_members(db).await?;
    Ok(summarize_by_user(&progress, &members))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::task as task_ops,
        entities::{ContentStatus, TrackingSource},
        test_utils::*,
    };

    fn progress_at(user_id: i64, target: f64, current: f64) -> KpiProgress {
        compute_kpi_progress(
            kpi_fixture(user_id, target, current),
            &ActivitySnapshot::default(),
            date(2024, 3, 15),
        )
    }

    #[test]
    fn test_zero_target_yields_zero_percent() {
        assert_eq!(percentage(42.0, 0.0), 0);
        assert_eq!(percentage(0.0, 0.0), 0);
        assert_eq!(percentage(5.0, -10.0), 0);

        let p = progress_at(1, 0.0, 50.0);
        assert_eq!(p.percentage, 0);
        assert_eq!(p.status, StatusBucket::Behind);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(2.0, 3.0), 67);
        assert_eq!(percentage(1.0, 3.0), 33);
        assert_eq!(percentage(1.0, 8.0), 13);
        assert_eq!(percentage(12.0, 10.0), 120);
    }

    #[test]
    fn test_manual_kpi_keeps_stored_value() {
        let mut activity = ActivitySnapshot::default();
        activity.tasks.push(task_fixture(
            1,
            TaskStatus::Done,
            Some(ts(2024, 3, 2, 10, 0, 0)),
        ));

        let p = compute_kpi_progress(kpi_fixture(1, 10.0, 7.5), &activity, date(2024, 3, 15));
        assert_eq!(p.current_value, 7.5);
        assert_eq!(p.percentage, 75);
        assert!(!p.is_auto_tracked());
    }

    #[test]
    fn test_status_bucket_lower_bounds_inclusive() {
        assert_eq!(StatusBucket::from_percentage(100), StatusBucket::Completed);
        assert_eq!(StatusBucket::from_percentage(130), StatusBucket::Completed);
        assert_eq!(StatusBucket::from_percentage(99), StatusBucket::OnTrack);
        assert_eq!(StatusBucket::from_percentage(80), StatusBucket::OnTrack);
        assert_eq!(StatusBucket::from_percentage(79), StatusBucket::AtRisk);
        assert_eq!(StatusBucket::from_percentage(50), StatusBucket::AtRisk);
        assert_eq!(StatusBucket::from_percentage(49), StatusBucket::Behind);
        assert_eq!(StatusBucket::from_percentage(0), StatusBucket::Behind);
    }

    #[test]
    fn test_auto_tracked_tasks_override_stored_value() {
        let mut kpi = kpi_fixture(1, 4.0, 99.0);
        kpi.auto_track = true;
        kpi.tracking_source = Some(TrackingSource::Tasks);

        let activity = ActivitySnapshot {
            tasks: vec![
                task_fixture(1, TaskStatus::Done, Some(ts(2024, 3, 1, 8, 0, 0))),
                task_fixture(1, TaskStatus::Done, Some(ts(2024, 3, 31, 23, 59, 59))),
                task_fixture(1, TaskStatus::Done, Some(ts(2024, 4, 1, 0, 0, 1))),
            ],
            content_items: Vec::new(),
        };

        let p = compute_kpi_progress(kpi, &activity, date(2024, 3, 15));
        assert_eq!(p.current_value, 2.0);
        assert_eq!(p.percentage, 50);
        assert_eq!(p.status, StatusBucket::AtRisk);
        // stored value untouched
        assert_eq!(p.kpi.current_value, 99.0);
    }

    #[test]
    fn test_auto_tracked_content_with_type_filter() {
        let mut kpi = kpi_fixture(1, 2.0, 0.0);
        kpi.auto_track = true;
        kpi.tracking_source = Some(TrackingSource::Content);
        kpi.tracking_filter = Some(serde_json::json!({ "content_type": "video" }));

        let at = Some(ts(2024, 3, 20, 9, 0, 0));
        let activity = ActivitySnapshot {
            tasks: Vec::new(),
            content_items: vec![
                content_fixture(1, "video", ContentStatus::Published, at),
                content_fixture(1, "Video", ContentStatus::Completed, at),
                content_fixture(1, "blog", ContentStatus::Published, at),
            ],
        };

        let p = compute_kpi_progress(kpi, &activity, date(2024, 3, 15));
        assert_eq!(p.current_value, 2.0);
        assert_eq!(p.status, StatusBucket::Completed);
    }

    #[test]
    fn test_active_flag_follows_reference_date() {
        let kpi = kpi_fixture(1, 10.0, 1.0);
        let inside =
            compute_kpi_progress(kpi.clone(), &ActivitySnapshot::default(), date(2024, 3, 31));
        let outside = compute_kpi_progress(kpi, &ActivitySnapshot::default(), date(2024, 4, 1));
        assert!(inside.active);
        assert!(!outside.active);
    }

    #[test]
    fn test_kpi_stats_counts_only_active() {
        let mut stale = progress_at(1, 10.0, 10.0);
        stale.active = false;

        let progress = vec![
            progress_at(1, 10.0, 10.0),
            progress_at(1, 10.0, 8.0),
            progress_at(2, 10.0, 5.0),
            progress_at(2, 10.0, 4.9),
            progress_at(3, 10.0, 0.0),
            stale,
        ];

        assert_eq!(
            kpi_stats(&progress),
            KpiStats {
                total: 5,
                completed: 1,
                on_track: 1,
                at_risk: 1,
                behind: 2,
            }
        );
    }

    #[test]
    fn test_summary_average_is_unclamped() {
        let progress = vec![progress_at(1, 10.0, 12.0), progress_at(1, 10.0, 6.0)];
        let members = vec![member_fixture(1, "Linh")];

        let summary = summarize_by_user(&progress, &members);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].avg_completion, 90);
        assert_eq!(summary[0].completed, 1);
        assert_eq!(summary[0].at_risk, 1);
        assert_eq!(summary[0].total_kpis, 2);
        assert_eq!(summary[0].user_name, "Linh");
        assert_eq!(summary[0].position, "Marketing");
    }

    #[test]
    fn test_summary_unknown_owner_and_ordering() {
        let progress = vec![
            progress_at(2, 10.0, 10.0),
            progress_at(1, 10.0, 3.0),
            progress_at(9, 10.0, 5.0),
        ];
        let members = vec![member_fixture(1, "Minh"), member_fixture(2, "An")];

        let summary = summarize_by_user(&progress, &members);
        let names: Vec<&str> = summary.iter().map(|s| s.user_name.as_str()).collect();
        assert_eq!(names, vec!["An", "Minh", "Unknown"]);
        assert_eq!(summary[2].position, "");
    }

    #[tokio::test]
    async fn test_get_kpi_stats_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "Linh").await?;

        // Manual KPI at 80%
        create_test_kpi(&db, member.id, 10.0, 8.0).await?;

        // Auto-tracked KPI with two completed tasks out of four
        let auto = create_tracked_kpi(&db, member.id, 4.0, TrackingRule::Tasks).await?;
        for _ in 0..2 {
            let task = task_ops::create_task(&db, "Edit reel".to_string(), Some(member.id)).await?;
            task_ops::complete_task_at(&db, task.id, ts(2024, 3, 12, 15, 0, 0)).await?;
        }

        let stats = get_kpi_stats(&db, date(2024, 3, 15)).await?;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.on_track, 1);
        assert_eq!(stats.at_risk, 1);

        let single = get_kpi_progress(&db, auto.id, date(2024, 3, 15)).await?;
        assert_eq!(single.current_value, 2.0);

        // Nothing is active outside the window
        let later = get_kpi_stats(&db, date(2024, 5, 1)).await?;
        assert_eq!(later.total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_kpi_summary_by_user_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let linh = create_test_member(&db, "Linh").await?;
        let an = create_test_member(&db, "An").await?;

        create_test_kpi(&db, linh.id, 10.0, 12.0).await?;
        create_test_kpi(&db, linh.id, 10.0, 6.0).await?;
        create_test_kpi(&db, an.id, 10.0, 1.0).await?;

        let summary = get_kpi_summary_by_user(&db, date(2024, 3, 15)).await?;
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].user_name, "An");
        assert_eq!(summary[0].behind, 1);
        assert_eq!(summary[1].user_name, "Linh");
        assert_eq!(summary[1].avg_completion, 90);

        Ok(())
    }

    #[test]
    fn test_auto_flag_without_source_is_not_live() {
        let mut kpi = kpi_fixture(1, 10.0, 7.0);
        kpi.auto_track = true;
        kpi.tracking_source = None;

        let p = compute_kpi_progress(kpi, &ActivitySnapshot::default(), date(2024, 3, 10));
        assert_eq!(p.current_value, 7.0);
        assert!(p.is_auto_tracked());
        assert!(!p.is_live());
    }

    #[tokio::test]
    async fn test_load_activity_skips_rows_before_since() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "Linh").await?;

        for at in [ts(2024, 2, 29, 23, 59, 59), ts(2024, 3, 1, 0, 0, 0)] {
            let task = task_ops::create_task(&db, "Edit reel".to_string(), Some(member.id)).await?;
            task_ops::complete_task_at(&db, task.id, at).await?;
            create_test_content(&db, member.id, "video", ContentStatus::Published, at).await?;
        }

        let activity = load_activity(&db, date(2024, 3, 1)).await?;
        assert_eq!(activity.tasks.len(), 1);
        assert_eq!(activity.tasks[0].completed_at, Some(ts(2024, 3, 1, 0, 0, 0)));
        assert_eq!(activity.content_items.len(), 1);
        assert_eq!(
            activity.content_items[0].scheduled_date,
            Some(ts(2024, 3, 1, 0, 0, 0))
        );

        let everything = load_activity(&db, date(2024, 1, 1)).await?;
        assert_eq!(everything.tasks.len(), 2);
        assert_eq!(everything.content_items.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_kpi_progress_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_kpi_progress(&db, 404, date(2024, 3, 15)).await;
        assert!(matches!(result, Err(Error::KpiNotFound { id: 404 })));
        Ok(())
    }
}
