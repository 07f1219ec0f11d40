//! Household projection and the long-term premium analysis built on it

mod state;
mod labels;
mod matrix;
mod engine;

pub use state::{project_household, ProjectedYear, ProjectionState};
pub use labels::{household_label, needs_initials, MAX_IDENTIFIER_LEN};
pub use matrix::{AnalysisCell, AnalysisResultMatrix, AnalysisRow, UNSUBSIDIZED_ROW_INCOME};
pub use engine::{
    format_currency, AnalysisEngine, AnalysisObserver, AnalysisOutcome, AnalysisPlan, AnalysisReport,
    AnalysisRequest, CellLogEntry, IncomeRange, NoopObserver, PreflightWarning, Progress, STATUS_INITIALIZING,
    STATUS_STOPPED,
};
