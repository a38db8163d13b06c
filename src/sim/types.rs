//! Per-tick telemetry record.

use std::fmt;

use super::clock::GridClock;

/// Complete record of one simulation tick, captured before the clock
/// advances.
#[derive(Debug, Clone)]
pub struct TickRecord {
    /// Absolute simulated minute at the start of the tick.
    pub minute: u64,
    /// Clock reading at the start of the tick.
    pub time: GridClock,
    /// Production at this minute, % of nominal capacity.
    pub production_pct: i32,
    /// Consumption at this minute, % of nominal capacity.
    pub consumption_pct: i32,
    /// Whether consumption exceeded production.
    pub deficit: bool,
    /// Connected vehicles eligible for a transfer this tick.
    pub candidates: usize,
    /// Energy drawn from the grid into vehicles this tick (kWh).
    pub energy_charged_kwh: f32,
    /// Energy credited to the grid from vehicles this tick (kWh).
    pub energy_discharged_kwh: f32,
    /// Vehicles that spent the tick driving.
    pub driving: usize,
    /// Vehicles that spent the tick being towed.
    pub towed: usize,
    /// Vehicles connected to a station during the tick.
    pub connected: usize,
    /// Vehicles that ran out of charge and stranded this tick.
    pub stranded: usize,
}

impl fmt::Display for TickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | prod={:>3}% cons={:>3}% {} | charged={:>6.2} kWh discharged={:>6.2} kWh \
             (cand={}) | fleet: driving={} towed={} connected={}",
            self.time,
            self.production_pct,
            self.consumption_pct,
            if self.deficit { "deficit" } else { "surplus" },
            self.energy_charged_kwh,
            self.energy_discharged_kwh,
            self.candidates,
            self.driving,
            self.towed,
            self.connected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_does_not_panic() {
        let record = TickRecord {
            minute: 1500,
            time: GridClock::new(1, 1, 0),
            production_pct: 40,
            consumption_pct: 55,
            deficit: true,
            candidates: 2,
            energy_charged_kwh: 0.0,
            energy_discharged_kwh: 1.5,
            driving: 1,
            towed: 0,
            connected: 2,
            stranded: 0,
        };
        let line = format!("{record}");
        assert!(line.contains("deficit"));
        assert!(line.contains("01-01:00"));
    }
}
