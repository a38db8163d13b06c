//! Preset scenarios must load, validate, build, and run a full day.

mod common;

use v2g_sim::config::ScenarioConfig;
use v2g_sim::fleet::VehicleState;
use v2g_sim::sim::report::RunReport;

#[test]
fn every_preset_builds_and_survives_a_day() {
    for name in ScenarioConfig::PRESETS {
        let cfg = ScenarioConfig::from_preset(name).expect("preset loads");
        assert!(cfg.validate().is_empty(), "preset \"{name}\" invalid");

        let mut sim = cfg.build(common::quiet_sink()).expect("preset builds");
        let records = sim.operate(1440);
        assert!(!records.is_empty());

        for vehicle in sim.vehicles() {
            let status = vehicle.charge_status();
            assert!(
                (0.0..=100.0).contains(&status),
                "preset \"{name}\": charge {status} out of bounds"
            );
        }

        let report = RunReport::from_records(&records);
        assert_eq!(report.ticks, records.len());
        assert_eq!(report.deficit_ticks + report.surplus_ticks, report.ticks);
    }
}

#[test]
fn baseline_trips_finish_with_expected_charge() {
    let mut sim = ScenarioConfig::baseline()
        .build(common::quiet_sink())
        .expect("baseline builds");
    sim.operate(400);

    // The Model S drove its 200 km: 37.8 kWh out of 85 kWh.
    let tesla = &sim.vehicles()[0];
    assert_eq!(*tesla.state(), VehicleState::Idle);
    assert!((tesla.charge_status() - 55.53).abs() < 0.5);

    // The e-up! finished its 100 km commute at 12.9 kWh/100km.
    let eup = &sim.vehicles()[1];
    assert_eq!(*eup.state(), VehicleState::Idle);
    let expected = 100.0 - 100.0 * 12.9 / 100.0 / 18.7 * 100.0;
    assert!((eup.charge_status() - expected).abs() < 0.5);
}

#[test]
fn depot_fleet_starts_plugged_in() {
    let sim = ScenarioConfig::depot()
        .build(common::quiet_sink())
        .expect("depot builds");
    assert_eq!(sim.stations().len(), 4);
    assert_eq!(sim.vehicles().len(), 4);
    for station in sim.stations() {
        assert!(station.is_occupied());
    }
    for vehicle in sim.vehicles() {
        assert!(matches!(vehicle.state(), VehicleState::Connected { .. }));
    }
}

#[test]
fn renewable_preset_runs_two_days_by_default() {
    let cfg = ScenarioConfig::renewable();
    assert_eq!(cfg.simulation.run_minutes, 2880);
    let mut sim = cfg.build(common::quiet_sink()).expect("renewable builds");
    let records = sim.operate(cfg.simulation.run_minutes);
    assert_eq!(records.len(), 2880);
    assert_eq!(sim.clock().days(), 3);
}