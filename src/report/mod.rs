//! Diagnostic report rendering.

pub mod summary;

pub use summary::{format_summary, ReportLabels, SummaryInput, NOT_ENTERED, NOT_FOUND, NOT_QUERIED};
