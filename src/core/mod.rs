//! Core business logic - framework-agnostic KPI, payroll and activity operations.

/// Content calendar items
pub mod content;
/// KPI definitions, manual progress and history
pub mod kpi;
/// Team members and payroll settings
pub mod member;
/// Payroll estimator
pub mod payroll;
/// KPI progress engine
pub mod progress;
/// Plain-text report formatting
pub mod report;
/// Kanban tasks
pub mod task;
/// Auto-tracking rules and date windows
pub mod tracking;
