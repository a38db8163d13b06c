//! Cosmetic text overview of the fleet.
//!
//! Renders from a read-only view of the simulator and is not on any
//! correctness path.

use std::fmt::Write;

use crate::fleet::{ChargeStation, Vehicle, VehicleState};
use crate::sim::grid::GridSimulator;

/// Renders the current time, weather, and one line per vehicle and station.
pub fn render_fleet(sim: &GridSimulator) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Grid at {} ===", sim.clock());
    if let Some(snapshot) = sim.snapshot() {
        let _ = writeln!(out, "{}", snapshot.weather);
    }

    for vehicle in sim.vehicles() {
        let _ = writeln!(out, "{}", vehicle_line(vehicle));
    }
    for station in sim.stations() {
        let _ = writeln!(out, "{}", station_line(station));
    }

    out
}

fn vehicle_line(vehicle: &Vehicle) -> String {
    format!(
        "  {}  {} {}  [{}] {:>5.1}%  {}",
        vehicle.grid_id(),
        vehicle.brand(),
        vehicle.model(),
        charge_bar(vehicle.charge_status()),
        vehicle.charge_status(),
        state_detail(vehicle.state()),
    )
}

fn station_line(station: &ChargeStation) -> String {
    let occupancy = match station.connected_vehicle() {
        Some(vehicle_id) => format!("occupied by {vehicle_id}"),
        None => "free".to_string(),
    };
    format!(
        "  {}  {:>6.1} kW  {}",
        station.grid_id(),
        station.charge_rate_kw(),
        occupancy,
    )
}

fn state_detail(state: &VehicleState) -> String {
    match state {
        VehicleState::Driving {
            remaining_route_km, ..
        } => format!("driving ({remaining_route_km:.1} km left)"),
        VehicleState::BeingTowed {
            remaining_route_km,
            penalty_minutes,
            ..
        } => {
            if *penalty_minutes > 0 {
                format!("awaiting tow truck ({penalty_minutes} min)")
            } else {
                format!("being towed ({remaining_route_km:.1} km left)")
            }
        }
        other => other.label().to_string(),
    }
}

fn charge_bar(percent: f32) -> String {
    let filled = (percent / 10.0).round() as usize;
    let filled = filled.min(10);
    format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::SourceMix;
    use crate::fleet::{ChargingProfile, models};
    use crate::logging::{LogLevel, LogSink};
    use std::rc::Rc;

    struct NullSink;

    impl LogSink for NullSink {
        fn write_line(&self, _line: &str) {}
    }

    fn demo_grid() -> GridSimulator {
        let mut grid = GridSimulator::new(
            SourceMix::aggregate(70, 50).expect("valid"),
            1,
            500.0,
            5,
            Rc::new(NullSink),
        );
        let vehicle = grid.register_vehicle(
            "Ada Lovelace",
            "HH AL 1815",
            &models::TESLA_MODEL_S,
            ChargingProfile::Default,
            LogLevel::None,
        );
        let station = grid.register_station(150.0, LogLevel::None);
        grid.connect(&vehicle, &station).expect("connect");
        grid
    }

    #[test]
    fn overview_lists_every_vehicle_and_station() {
        let grid = demo_grid();
        let rendered = render_fleet(&grid);
        assert!(rendered.contains("Tesla Model S"));
        assert!(rendered.contains("kW"));
        assert!(rendered.contains("occupied by"));
    }

    #[test]
    fn overview_shows_weather_after_first_tick() {
        let mut grid = demo_grid();
        assert!(!render_fleet(&grid).contains("day with"));
        grid.tick();
        assert!(render_fleet(&grid).contains("day with"));
    }

    #[test]
    fn charge_bar_scales_with_percentage() {
        assert_eq!(charge_bar(0.0), "..........");
        assert_eq!(charge_bar(50.0), "#####.....");
        assert_eq!(charge_bar(100.0), "##########");
    }
}
