/// Database configuration and connection management
pub mod database;

/// Team member seeding from config.toml
pub mod team;
