//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// KPI reporting and progress commands
pub mod kpi;

/// Payroll estimate commands
pub mod payroll;

// Export commands
pub use general::*;
pub use kpi::*;
pub use payroll::*;
