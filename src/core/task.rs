//! Task business logic - The slice of Kanban handling that KPI tracking depends on.
//!
//! A task's `completed_at` is stamped when it moves to `done` and cleared when it moves
//! back out, so task-tracked KPIs always count the latest completion.

use crate::{
    entities::{Task, TaskStatus, task},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a task in the `todo` column.
pub async fn create_task(
    db: &DatabaseConnection,
    title: String,
    assigned_to: Option<i64>,
) -> Result<task::Model> {
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "Task title cannot be empty".to_string(),
        });
    }

    task::ActiveModel {
        title: Set(title.trim().to_string()),
        assigned_to: Set(assigned_to),
        status: Set(TaskStatus::Todo),
        completed_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a task by id.
pub async fn get_task_by_id(db: &DatabaseConnection, task_id: i64) -> Result<Option<task::Model>> {
    Task::find_by_id(task_id).one(db).await.map_err(Into::into)
}

/// Tasks assigned to a member, newest first.
pub async fn get_tasks_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<task::Model>> {
    Task::find()
        .filter(task::Column::AssignedTo.eq(user_id))
        .order_by_desc(task::Column::CreatedAt)
        .order_by_desc(task::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn set_status(
    db: &DatabaseConnection,
    task_id: i64,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
) -> Result<task::Model> {
    let existing = get_task_by_id(db, task_id)
        .await?
        .ok_or(Error::TaskNotFound { id: task_id })?;

    let mut active: task::ActiveModel = existing.into();
    active.status = Set(status);
    active.completed_at = Set(completed_at);
    active.update(db).await.map_err(Into::into)
}

/// Moves a task to another column.
///
/// Moving to `done` stamps `completed_at` with the current time, unless the task was
/// already done; moving anywhere else clears it.
pub async fn update_task_status(
    db: &DatabaseConnection,
    task_id: i64,
    status: TaskStatus,
) -> Result<task::Model> {
    let existing = get_task_by_id(db, task_id)
        .await?
        .ok_or(Error::TaskNotFound { id: task_id })?;

    if existing.status == status {
        return Ok(existing);
    }

    let completed_at = (status == TaskStatus::Done).then(Utc::now);
    set_status(db, task_id, status, completed_at).await
}

/// Marks a task done at an explicit time (backfills and imports).
pub async fn complete_task_at(
    db: &DatabaseConnection,
    task_id: i64,
    completed_at: DateTime<Utc>,
) -> Result<task::Model> {
    set_status(db, task_id, TaskStatus::Done, Some(completed_at)).await
}
