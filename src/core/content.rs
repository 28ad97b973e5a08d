//! Content calendar business logic - Creating content items and moving them through
//! the publishing workflow.

use crate::{
    core::tracking::DateWindow,
    entities::{ContentItem, ContentStatus, content_item},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Everything needed to put an item on the content calendar.
#[derive(Debug, Clone)]
pub struct NewContentItem {
    /// Working title
    pub title: String,
    /// Content type label (e.g., "video")
    pub content_type: String,
    /// Responsible member
    pub assignee_id: Option<i64>,
    /// Initial status
    pub status: ContentStatus,
    /// Calendar slot
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Spend attributed to the item
    pub actual_cost: Option<f64>,
}

/// Creates a content item.
pub async fn create_content_item(
    db: &DatabaseConnection,
    new_item: NewContentItem,
) -> Result<content_item::Model> {
    if new_item.title.trim().is_empty() {
        return Err(Error::Config {
            message: "Content title cannot be empty".to_string(),
        });
    }
    if let Some(cost) = new_item
        .actual_cost
        .filter(|cost| !cost.is_finite() || *cost < 0.0)
    {
        return Err(Error::InvalidAmount { amount: cost });
    }

    content_item::ActiveModel {
        title: Set(new_item.title.trim().to_string()),
        content_type: Set(new_item.content_type),
        assignee_id: Set(new_item.assignee_id),
        status: Set(new_item.status),
        scheduled_date: Set(new_item.scheduled_date),
        actual_cost: Set(new_item.actual_cost),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Moves a content item to another publishing state.
pub async fn update_content_status(
    db: &DatabaseConnection,
    item_id: i64,
    status: ContentStatus,
) -> Result<content_item::Model> {
    let existing = ContentItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::ContentNotFound { id: item_id })?;

    let mut active: content_item::ActiveModel = existing.into();
    active.status = Set(status);
    active.update(db).await.map_err(Into::into)
}

/// Items scheduled inside `window`, in calendar order.
pub async fn get_content_items_in_window(
    db: &DatabaseConnection,
    window: &DateWindow,
) -> Result<Vec<content_item::Model>> {
    let from = window.start.and_time(NaiveTime::MIN).and_utc();
    let items = ContentItem::find()
        .filter(content_item::Column::ScheduledDate.gte(from))
        .order_by_asc(content_item::Column::ScheduledDate)
        .order_by_asc(content_item::Column::Id)
        .all(db)
        .await?;

    Ok(items
        .into_iter()
        .filter(|item| item.scheduled_date.is_some_and(|at| window.contains(at)))
        .collect())
}

/// Items scheduled in the calendar month containing `date`.
pub async fn get_content_items_for_month(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Vec<content_item::Model>> {
    get_content_items_in_window(db, &DateWindow::month_containing(date)).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_month_query_excludes_neighbours() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_content(&db, 1, "video", ContentStatus::Published, ts(2024, 2, 29, 23, 0, 0))
            .await?;
        let first =
            create_test_content(&db, 1, "video", ContentStatus::Published, ts(2024, 3, 1, 0, 0, 0))
                .await?;
        let last = create_test_content(
            &db,
            1,
            "blog",
            ContentStatus::Draft,
            ts(2024, 3, 31, 23, 59, 59),
        )
        .await?;
        create_test_content(&db, 1, "video", ContentStatus::Published, ts(2024, 4, 1, 0, 0, 0))
            .await?;

        let march = get_content_items_for_month(&db, date(2024, 3, 15)).await?;
        let ids: Vec<i64> = march.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![first.id, last.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_content_status() -> Result<()> {
        let db = setup_test_db().await?;
        let item =
            create_test_content(&db, 1, "reel", ContentStatus::Scheduled, ts(2024, 3, 3, 9, 0, 0))
                .await?;

        let published = update_content_status(&db, item.id, ContentStatus::Published).await?;
        assert_eq!(published.status, ContentStatus::Published);
        assert!(published.status.is_delivered());

        let missing = update_content_status(&db, 999, ContentStatus::Published).await;
        assert!(matches!(missing.unwrap_err(), Error::ContentNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_content_rejects_negative_cost() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_content_item(
            &db,
            NewContentItem {
                title: "Launch post".to_string(),
                content_type: "post".to_string(),
                assignee_id: None,
                status: ContentStatus::Draft,
                scheduled_date: None,
                actual_cost: Some(-5.0),
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        Ok(())
    }
}
