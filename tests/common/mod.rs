//! Shared builders for integration tests.

use std::rc::Rc;

use v2g_sim::energy::SourceMix;
use v2g_sim::logging::LogSink;
use v2g_sim::sim::grid::GridSimulator;

/// Sink that swallows all subject output.
pub struct NullSink;

impl LogSink for NullSink {
    fn write_line(&self, _line: &str) {}
}

pub fn quiet_sink() -> Rc<dyn LogSink> {
    Rc::new(NullSink)
}

/// Empty grid on the baseline aggregate mix.
pub fn aggregate_grid(seed: u64, tick_minutes: u32) -> GridSimulator {
    GridSimulator::new(
        SourceMix::aggregate(70, 50).expect("valid mix"),
        tick_minutes,
        500.0,
        seed,
        quiet_sink(),
    )
}
