//! Pro-forma income statement, balance sheet and cash-flow projection

mod state;
mod engine;
mod statements;

pub use state::ProjectionState;
pub use engine::{ProjectionConfig, ProjectionEngine};
pub use statements::{ProjectionResult, ProjectionRow, ProjectionSummary};
