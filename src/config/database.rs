//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the schema always
//! matches the entity definitions without hand-written SQL.

use crate::entities::{ContentItem, Kpi, KpiHistory, Profile, Task};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/opsboard.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns the
/// default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions if they do not exist yet.
///
/// Profiles are created first so that the KPI foreign key has a target, and
/// KPIs before their history rows.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut profile_table = schema.create_table_from_entity(Profile);
    let mut task_table = schema.create_table_from_entity(Task);
    let mut content_table = schema.create_table_from_entity(ContentItem);
    let mut kpi_table = schema.create_table_from_entity(Kpi);
    let mut history_table = schema.create_table_from_entity(KpiHistory);

    for table in [
        &mut profile_table,
        &mut task_table,
        &mut content_table,
        &mut kpi_table,
        &mut history_table,
    ] {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ContentItemModel, KpiHistoryModel, KpiModel, ProfileModel, TaskModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProfileModel> = Profile::find().limit(1).all(&db).await?;
        let _: Vec<TaskModel> = Task::find().limit(1).all(&db).await?;
        let _: Vec<ContentItemModel> = ContentItem::find().limit(1).all(&db).await?;
        let _: Vec<KpiModel> = Kpi::find().limit(1).all(&db).await?;
        let _: Vec<KpiHistoryModel> = KpiHistory::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
