/// Simulated wall-clock time.
pub mod clock;
pub mod grid;
pub mod report;
/// Per-tick telemetry record.
pub mod types;

pub use clock::GridClock;
pub use grid::{GridError, GridSimulator};
pub use report::RunReport;
pub use types::TickRecord;
