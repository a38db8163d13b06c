//! Electric vehicle with a guarded driving/towing/connection state machine.

use rand::{Rng, rngs::StdRng};

use crate::logging::{LogLevel, Logger};
use crate::sim::clock::{GridClock, MINUTES_PER_DAY};

use super::FleetError;
use super::models::VehicleModel;
use super::profile::{ChargePriority, ChargingProfile};
use super::station::ChargeStation;

/// Default cruising speed in km/h.
pub const DEFAULT_SPEED_KMH: f32 = 90.0;

/// Speed of the towing truck once it has picked the vehicle up.
const TOW_SPEED_KMH: f32 = 70.0;

/// Minimum minutes until the towing truck arrives.
const TOW_PENALTY_MIN: i32 = 25;
/// Exclusive upper bound on the random extra wait.
const TOW_PENALTY_SPREAD: i32 = 10;

/// Vehicle lifecycle state. Each variant carries exactly the data that is
/// valid in that state, so driving and towing cannot be entered without
/// their parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleState {
    Idle,
    Driving {
        total_route_km: f32,
        remaining_route_km: f32,
    },
    BeingTowed {
        total_route_km: f32,
        remaining_route_km: f32,
        /// Minutes until the tow truck arrives; −1 once exhausted.
        penalty_minutes: i32,
    },
    Connected {
        station_id: String,
        mode: ConnectionMode,
    },
}

impl VehicleState {
    /// Short lowercase label for log and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleState::Idle => "idle",
            VehicleState::Driving { .. } => "driving",
            VehicleState::BeingTowed { .. } => "being towed",
            VehicleState::Connected {
                mode: ConnectionMode::Idle,
                ..
            } => "connected",
            VehicleState::Connected {
                mode: ConnectionMode::Charging,
                ..
            } => "charging",
            VehicleState::Connected {
                mode: ConnectionMode::Discharging,
                ..
            } => "discharging",
        }
    }
}

/// What a connected vehicle is doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Idle,
    Charging,
    Discharging,
}

/// An electric car registered with a grid.
#[derive(Debug)]
pub struct Vehicle {
    grid_id: String,
    owner: String,
    license_plate: String,
    horsepower: u32,
    brand: String,
    model: String,
    capacity_kwh: f32,
    consumption_kwh_per_100km: f32,
    max_charge_rate_kw: f32,
    /// Cruising speed in km/h; adjustable between trips.
    pub speed_kmh: f32,
    charge_status: f32,
    /// Charging policy; may be swapped while connected.
    pub profile: ChargingProfile,
    state: VehicleState,
    logger: Logger,
}

impl Vehicle {
    /// Creates a vehicle from catalog data. Called by the grid during
    /// registration, which supplies the unique id and the logger.
    ///
    /// # Panics
    ///
    /// Panics if the model's capacity, consumption, or charge rate is not
    /// positive.
    pub(crate) fn new(
        owner: &str,
        license_plate: &str,
        model: &VehicleModel,
        profile: ChargingProfile,
        grid_id: String,
        logger: Logger,
    ) -> Self {
        assert!(model.capacity_kwh > 0.0, "capacity_kwh must be > 0");
        assert!(
            model.consumption_kwh_per_100km > 0.0,
            "consumption_kwh_per_100km must be > 0"
        );
        assert!(
            model.max_charge_rate_kw > 0.0,
            "max_charge_rate_kw must be > 0"
        );

        Self {
            grid_id,
            owner: owner.to_string(),
            license_plate: license_plate.to_string(),
            horsepower: model.horsepower,
            brand: model.brand.to_string(),
            model: model.model.to_string(),
            capacity_kwh: model.capacity_kwh,
            consumption_kwh_per_100km: model.consumption_kwh_per_100km,
            max_charge_rate_kw: model.max_charge_rate_kw,
            speed_kmh: DEFAULT_SPEED_KMH,
            charge_status: 100.0,
            profile,
            state: VehicleState::Idle,
            logger,
        }
    }

    pub fn grid_id(&self) -> &str {
        &self.grid_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    pub fn horsepower(&self) -> u32 {
        self.horsepower
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn capacity_kwh(&self) -> f32 {
        self.capacity_kwh
    }

    pub fn consumption_kwh_per_100km(&self) -> f32 {
        self.consumption_kwh_per_100km
    }

    pub fn max_charge_rate_kw(&self) -> f32 {
        self.max_charge_rate_kw
    }

    /// Charge level in percent, always within `[0, 100]`.
    pub fn charge_status(&self) -> f32 {
        self.charge_status
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Id of the station this vehicle is plugged into, if any.
    pub fn station_id(&self) -> Option<&str> {
        match &self.state {
            VehicleState::Connected { station_id, .. } => Some(station_id),
            _ => None,
        }
    }

    /// Reconfigures this subject's log verbosity.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.logger.set_level(level);
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Sets the charge level directly, clamped to `[0, 100]`.
    pub fn set_charge_status(&mut self, charge_status: f32) {
        self.charge_status = charge_status.clamp(0.0, 100.0);
    }

    /// Updates the connection activity. Only the owning station calls this.
    ///
    /// # Panics
    ///
    /// Panics if the vehicle is not connected.
    pub(crate) fn set_connection_mode(&mut self, mode: ConnectionMode) {
        match &mut self.state {
            VehicleState::Connected { mode: current, .. } => *current = mode,
            other => panic!(
                "connection mode set on vehicle {} while {}",
                self.grid_id,
                other.label()
            ),
        }
    }

    /// Battery energy left after driving `route_km`, in kWh. A negative
    /// result means the charge does not cover the route.
    pub fn remaining_capacity_after(&self, route_km: f32) -> f32 {
        let route_consumption = route_km * (self.consumption_kwh_per_100km / 100.0);
        self.capacity_kwh * (self.charge_status / 100.0) - route_consumption
    }

    /// Estimated driving time for a route at the current speed, in minutes.
    pub fn route_duration_minutes(&self, route_km: f32) -> u32 {
        (route_km / (self.speed_kmh / 60.0)) as u32
    }

    /// Starts a trip over `route_km`. Legal only while idle; a busy vehicle
    /// reports the failure and stays unchanged.
    pub fn start_drive(&mut self, route_km: f32) -> Result<(), FleetError> {
        if self.state != VehicleState::Idle {
            self.logger.log(
                LogLevel::Error,
                "Vehicle must be in idle before attempting to drive.",
            );
            return Err(FleetError::NotIdle {
                state: self.state.label().to_string(),
            });
        }

        self.logger.log(
            LogLevel::Info,
            &format!(
                "Started route with {route_km}km. This will take approximately {} minutes.",
                self.route_duration_minutes(route_km)
            ),
        );
        self.state = VehicleState::Driving {
            total_route_km: route_km,
            remaining_route_km: route_km,
        };
        Ok(())
    }

    /// Drives for the length of one tick.
    ///
    /// Runs the battery down for the distance actually covered. If the
    /// charge cannot cover it the vehicle strands: charge drops to zero and
    /// a towing service is dispatched with a random 25–34 minute delay.
    ///
    /// # Panics
    ///
    /// Panics if the vehicle is not driving.
    pub fn tick_drive(&mut self, tick_minutes: u32, rng: &mut StdRng) {
        let VehicleState::Driving {
            total_route_km,
            remaining_route_km,
        } = self.state
        else {
            panic!(
                "tick_drive called on vehicle {} while {}",
                self.grid_id,
                self.state.label()
            );
        };

        let tick_distance = self.speed_kmh / 60.0 * tick_minutes as f32;
        let travelled = tick_distance.min(remaining_route_km);

        let capacity_left = self.remaining_capacity_after(travelled);
        if capacity_left < 0.0 {
            self.charge_status = 0.0;
            self.logger.log(
                LogLevel::Warn,
                "Vehicle was discharged before reaching the destination and needs to be \
                 recharged, a towing service was automatically called.",
            );
            self.state = VehicleState::BeingTowed {
                total_route_km,
                remaining_route_km,
                penalty_minutes: TOW_PENALTY_MIN + rng.random_range(0..TOW_PENALTY_SPREAD),
            };
            return;
        }

        self.charge_status = (capacity_left / self.capacity_kwh * 100.0).clamp(0.0, 100.0);

        let remaining = remaining_route_km - travelled;
        if remaining > 0.0 {
            self.state = VehicleState::Driving {
                total_route_km,
                remaining_route_km: remaining,
            };
        } else {
            self.logger
                .log(LogLevel::Info, &format!("Drove {total_route_km}km."));
            self.report_charge_level();
            self.state = VehicleState::Idle;
        }
    }

    /// Advances the towed state for the length of one tick.
    ///
    /// First waits out the dispatch penalty, then rides the tow truck along
    /// the remaining route. The battery is untouched.
    ///
    /// # Panics
    ///
    /// Panics if the vehicle is not being towed.
    pub fn tick_towed(&mut self, tick_minutes: u32) {
        let VehicleState::BeingTowed {
            total_route_km,
            remaining_route_km,
            penalty_minutes,
        } = self.state
        else {
            panic!(
                "tick_towed called on vehicle {} while {}",
                self.grid_id,
                self.state.label()
            );
        };

        if penalty_minutes > 0 {
            let rest = penalty_minutes - tick_minutes as i32;
            self.state = VehicleState::BeingTowed {
                total_route_km,
                remaining_route_km,
                penalty_minutes: if rest <= 0 { -1 } else { rest },
            };
            return;
        }

        let travelled = TOW_SPEED_KMH / 60.0 * tick_minutes as f32;
        if remaining_route_km - travelled > 0.0 {
            self.state = VehicleState::BeingTowed {
                total_route_km,
                remaining_route_km: remaining_route_km - travelled,
                penalty_minutes,
            };
        } else {
            self.logger.log(
                LogLevel::Info,
                &format!(
                    "Vehicle has reached its destination with the towing service. \
                     Drove {total_route_km}km."
                ),
            );
            self.report_charge_level();
            self.state = VehicleState::Idle;
        }
    }

    /// Logs the charge level, the remaining range, and an advisory.
    pub fn report_charge_level(&self) {
        let remaining_km = self.capacity_kwh * (self.charge_status / 100.0)
            / (self.consumption_kwh_per_100km / 100.0);
        let (advice, level) = if self.charge_status > 50.0 {
            ("Have a nice day!", LogLevel::Info)
        } else if self.charge_status > 20.0 {
            (
                "Please consider the remaining capacity when planning your route.",
                LogLevel::Warn,
            )
        } else {
            ("Please charge your car now.", LogLevel::Warn)
        };

        self.logger.log(
            level,
            &format!(
                "The current charge level is {:.0}%, you will be able to drive for {:.0}km. {}",
                self.charge_status, remaining_km, advice
            ),
        );
    }

    /// How urgently this vehicle needs energy, judged against the station
    /// it would charge from.
    ///
    /// The contractual floor takes precedence over everything else. Profiles
    /// without deadlines never rank above the floor; for the rest the time
    /// left until the next deadline is weighed against the time the station
    /// needs to reach the contracted target.
    pub fn charging_priority(
        &self,
        station: &ChargeStation,
        clock: &GridClock,
        tick_minutes: u32,
    ) -> ChargePriority {
        if self.charge_status <= self.profile.min_charge_status() as f32 {
            return ChargePriority::Immediate;
        }

        let Some(deadline_hours) = self.profile.contracted_times() else {
            return ChargePriority::None;
        };
        let target = self.profile.contracted_target().unwrap_or(100) as f32;

        // Walk forward minute by minute until a deadline comes up, wrapping
        // into the next day.
        let mut minute = clock.minute_of_day();
        let mut wait = 0u32;
        while !deadline_hours.iter().any(|&hour| hour * 60 == minute) {
            minute = (minute + 1) % MINUTES_PER_DAY;
            wait += 1;
        }

        let required = station.charging_duration(self, target, tick_minutes);

        let wait = wait as f32;
        let required = required as f32;
        if wait <= required {
            ChargePriority::Immediate
        } else if wait <= required * 1.5 {
            ChargePriority::Urgent
        } else if wait <= required * 2.0 {
            ChargePriority::Normal
        } else if wait <= required * 3.0 {
            ChargePriority::Weak
        } else {
            ChargePriority::None
        }
    }

    /// Checks whether a connect attempt may proceed, reporting the reason
    /// when it may not.
    pub(crate) fn ensure_can_connect(&self) -> Result<(), FleetError> {
        match &self.state {
            VehicleState::Idle => Ok(()),
            VehicleState::Connected { station_id, .. } => {
                self.logger.log(
                    LogLevel::Error,
                    &format!(
                        "Can't connect to a new charge station while unit with ID {station_id} \
                         is still connected."
                    ),
                );
                Err(FleetError::AlreadyConnected {
                    station_id: station_id.clone(),
                })
            }
            other => {
                self.logger.log(
                    LogLevel::Error,
                    &format!(
                        "Cannot connect to a charge station because the vehicle is currently \
                         {} and not idle.",
                        other.label()
                    ),
                );
                Err(FleetError::NotIdle {
                    state: other.label().to_string(),
                })
            }
        }
    }

    /// Links the vehicle to a station. The grid has already verified the
    /// vehicle is idle and the station free.
    pub(crate) fn attach(&mut self, station_id: &str) {
        assert!(
            self.state == VehicleState::Idle,
            "attach requires an idle vehicle"
        );
        self.state = VehicleState::Connected {
            station_id: station_id.to_string(),
            mode: ConnectionMode::Idle,
        };
    }

    /// Unlinks the vehicle from its station.
    pub(crate) fn detach(&mut self) {
        assert!(
            matches!(self.state, VehicleState::Connected { .. }),
            "detach requires a connected vehicle"
        );
        self.state = VehicleState::Idle;
    }

    /// Marks a connected vehicle as neither charging nor discharging.
    pub(crate) fn idle_connection(&mut self) {
        if matches!(self.state, VehicleState::Connected { .. }) {
            self.set_connection_mode(ConnectionMode::Idle);
        }
    }
}
