//! V2G charge station: charging curve, discharge, and duration estimates.

use crate::logging::{LogLevel, Logger};

use super::FleetError;
use super::vehicle::{ConnectionMode, Vehicle};

/// Charge-rate reduction factor per charge-status decile, approximating the
/// fast-charge taper of a real battery. The terminal entry pins the rate to
/// zero at exactly 100%.
const CHARGE_CURVE: [f32; 11] = [
    0.50, 0.85, 0.90, 0.95, 0.775, 0.60, 0.425, 0.38, 0.36, 0.35, 0.0,
];

/// Effective rates at or below this are not throttled by the curve.
const CURVE_THRESHOLD_KW: f32 = 10.0;

/// Discharging runs 20% slower than the matched charge rate.
const DISCHARGE_DERATE: f32 = 0.8;

/// Share of withdrawn energy lost before it reaches the grid.
const ROUND_TRIP_LOSS: f32 = 0.1;

/// A bidirectional charger registered with a grid. Holds at most one
/// connected vehicle.
#[derive(Debug)]
pub struct ChargeStation {
    grid_id: String,
    charge_rate_kw: f32,
    connected_vehicle: Option<String>,
    logger: Logger,
}

impl ChargeStation {
    /// Creates a station. Called by the grid during registration.
    ///
    /// # Panics
    ///
    /// Panics if `charge_rate_kw` is not positive.
    pub(crate) fn new(charge_rate_kw: f32, grid_id: String, logger: Logger) -> Self {
        assert!(charge_rate_kw > 0.0, "charge_rate_kw must be > 0");
        Self {
            grid_id,
            charge_rate_kw,
            connected_vehicle: None,
            logger,
        }
    }

    pub fn grid_id(&self) -> &str {
        &self.grid_id
    }

    pub fn charge_rate_kw(&self) -> f32 {
        self.charge_rate_kw
    }

    /// Id of the connected vehicle, if any.
    pub fn connected_vehicle(&self) -> Option<&str> {
        self.connected_vehicle.as_deref()
    }

    pub fn is_occupied(&self) -> bool {
        self.connected_vehicle.is_some()
    }

    /// Reconfigures this subject's log verbosity.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.logger.set_level(level);
    }

    /// Records the station side of a connect.
    pub(crate) fn attach_vehicle(&mut self, vehicle_id: &str) -> Result<(), FleetError> {
        if let Some(occupant) = &self.connected_vehicle {
            self.logger.log(
                LogLevel::Error,
                &format!(
                    "Connected vehicle with ID {occupant} needs to be disconnected before the \
                     station can be used by another vehicle."
                ),
            );
            return Err(FleetError::StationOccupied {
                station_id: self.grid_id.clone(),
                occupant: occupant.clone(),
            });
        }
        self.connected_vehicle = Some(vehicle_id.to_string());
        Ok(())
    }

    /// Records the station side of a disconnect.
    pub(crate) fn detach_vehicle(&mut self, vehicle_id: &str) -> Result<(), FleetError> {
        if self.connected_vehicle.as_deref() == Some(vehicle_id) {
            self.connected_vehicle = None;
            self.logger.log(
                LogLevel::Info,
                &format!("Successfully disconnected the vehicle with ID {vehicle_id}."),
            );
            Ok(())
        } else {
            self.logger.log(
                LogLevel::Error,
                &format!(
                    "Tried disconnecting vehicle with ID {vehicle_id}, but the selected vehicle \
                     is not connected."
                ),
            );
            Err(FleetError::WrongStation {
                station_id: self.grid_id.clone(),
            })
        }
    }

    /// One charge step on a bare charge status. Returns the new status and
    /// the energy drawn in kWh. Shared by the live tick and the duration
    /// estimator so both follow the same curve.
    fn charge_step(
        &self,
        charge_status: f32,
        max_charge_rate_kw: f32,
        capacity_kwh: f32,
        tick_minutes: u32,
    ) -> (f32, f32) {
        let effective_rate = self.charge_rate_kw.min(max_charge_rate_kw);
        let reduction = if effective_rate > CURVE_THRESHOLD_KW {
            let decile = (charge_status / 10.0) as usize;
            CHARGE_CURVE[decile.min(CHARGE_CURVE.len() - 1)]
        } else {
            1.0
        };

        let energy_kwh = if charge_status < 100.0 {
            reduction * effective_rate / 60.0 * tick_minutes as f32
        } else {
            0.0
        };

        let new_status =
            ((capacity_kwh * charge_status / 100.0 + energy_kwh) / capacity_kwh * 100.0).min(100.0);
        (new_status, energy_kwh)
    }

    /// Charges the connected vehicle for one tick.
    ///
    /// Returns the energy drawn from the grid in kWh. Calling it for a
    /// vehicle that is not connected to this station is reported and
    /// charges nothing.
    pub fn tick_charge(&self, vehicle: &mut Vehicle, tick_minutes: u32) -> f32 {
        if self.connected_vehicle.as_deref() != Some(vehicle.grid_id()) {
            self.logger.log(
                LogLevel::Error,
                "Charging not possible, no vehicle is connected.",
            );
            return 0.0;
        }

        let (new_status, energy_kwh) = self.charge_step(
            vehicle.charge_status(),
            vehicle.max_charge_rate_kw(),
            vehicle.capacity_kwh(),
            tick_minutes,
        );
        vehicle.set_charge_status(new_status);
        vehicle.set_connection_mode(if energy_kwh > 0.0 {
            ConnectionMode::Charging
        } else {
            ConnectionMode::Idle
        });
        energy_kwh
    }

    /// Discharges the connected vehicle toward the grid for one tick.
    ///
    /// Evaluated minute by minute so the profile floor stops the discharge
    /// mid-tick instead of overshooting. Returns the energy credited to the
    /// grid in kWh, after the round-trip loss.
    pub fn tick_discharge(&self, vehicle: &mut Vehicle, tick_minutes: u32) -> f32 {
        if self.connected_vehicle.as_deref() != Some(vehicle.grid_id()) {
            self.logger.log(
                LogLevel::Error,
                "Discharging not possible, no vehicle is connected.",
            );
            return 0.0;
        }

        let discharge_rate_kw =
            vehicle.max_charge_rate_kw().min(self.charge_rate_kw) * DISCHARGE_DERATE;
        let per_minute_kwh = discharge_rate_kw / 60.0;
        let floor = vehicle.profile.min_charge_status() as f32;
        let capacity = vehicle.capacity_kwh();

        let mut withdrawn_kwh = 0.0;
        for _ in 0..tick_minutes {
            let status = vehicle.charge_status();
            let new_status = (capacity * status / 100.0 - per_minute_kwh) / capacity * 100.0;
            if new_status < floor || new_status < 0.0 {
                break;
            }
            withdrawn_kwh += per_minute_kwh;
            vehicle.set_charge_status(new_status);
            vehicle.set_connection_mode(ConnectionMode::Discharging);
        }

        withdrawn_kwh * (1.0 - ROUND_TRIP_LOSS)
    }

    /// Minutes of constant charging needed to lift the vehicle to
    /// `target_percent`, stepping a simulated copy of the charge status
    /// through the charge curve.
    pub fn charging_duration(
        &self,
        vehicle: &Vehicle,
        target_percent: f32,
        tick_minutes: u32,
    ) -> u32 {
        let mut status = vehicle.charge_status();
        let mut minutes = 0u32;
        while status < target_percent {
            let (next, energy_kwh) = self.charge_step(
                status,
                vehicle.max_charge_rate_kw(),
                vehicle.capacity_kwh(),
                tick_minutes,
            );
            if energy_kwh <= 0.0 {
                break;
            }
            status = next;
            minutes += tick_minutes;
        }
        minutes
    }
}
