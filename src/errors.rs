//! Unified error type for the opsboard crate.
//!
//! The KPI progress engine and payroll estimator are total functions and never produce
//! these errors; only the persistence boundary, configuration loading and the bot layer do.

use thiserror::Error;

/// Every failure the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying `SeaORM` / database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read, parsed or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
    },

    /// No KPI with the given id
    #[error("KPI not found: {id}")]
    KpiNotFound {
        /// Requested KPI id
        id: i64,
    },

    /// No team member (profile) with the given id or name
    #[error("Team member not found: {id}")]
    MemberNotFound {
        /// Requested member id or name
        id: String,
    },

    /// No task with the given id
    #[error("Task not found: {id}")]
    TaskNotFound {
        /// Requested task id
        id: i64,
    },

    /// No content item with the given id
    #[error("Content item not found: {id}")]
    ContentNotFound {
        /// Requested content item id
        id: i64,
    },

    /// KPI definition rejected at the data boundary
    #[error("Invalid KPI: {message}")]
    InvalidKpi {
        /// What was wrong with it
        message: String,
    },

    /// Member tried to record progress on a KPI they neither own nor created
    #[error("Member {actor_id} may not update KPI {kpi_id}")]
    NotPermitted {
        /// Acting member id
        actor_id: i64,
        /// Target KPI id
        kpi_id: i64,
    },

    /// Money or progress value that is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending value
        amount: f64,
    },

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
