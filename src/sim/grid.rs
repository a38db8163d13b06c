//! The grid simulator: registries, tick loop, and priority allocation.

use std::fmt;
use std::rc::Rc;

use rand::distr::Alphanumeric;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::energy::{DailyEnergyModel, DaySnapshot, SourceMix};
use crate::fleet::models::VehicleModel;
use crate::fleet::{ChargeStation, ChargingProfile, FleetError, Vehicle, VehicleState};
use crate::logging::{LogLevel, LogSink, Logger};

use super::clock::GridClock;
use super::types::TickRecord;

const ID_LENGTH: usize = 8;

/// Recoverable grid-level outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// No vehicle with this id is registered.
    UnknownVehicle(String),
    /// No station with this id is registered.
    UnknownStation(String),
    /// A fleet-level rejection, e.g. an occupied station.
    Fleet(FleetError),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::UnknownVehicle(id) => write!(f, "no vehicle with ID {id} is registered"),
            GridError::UnknownStation(id) => write!(f, "no station with ID {id} is registered"),
            GridError::Fleet(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GridError {}

impl From<FleetError> for GridError {
    fn from(err: FleetError) -> Self {
        GridError::Fleet(err)
    }
}

/// Owns the vehicle and station registries and runs the tick loop.
///
/// Registries are `Vec`-backed so iteration — and with it the allocation
/// order — follows insertion order, never a hash layout. A single seeded
/// generator drives every random draw (weather, jitter, towing penalties,
/// registry ids), making whole runs reproducible.
pub struct GridSimulator {
    clock: GridClock,
    tick_minutes: u32,
    nominal_capacity_kw: f32,
    model: DailyEnergyModel,
    vehicles: Vec<Vehicle>,
    stations: Vec<ChargeStation>,
    snapshot: Option<DaySnapshot>,
    snapshot_day: u32,
    rng: StdRng,
    logger: Logger,
    sink: Rc<dyn LogSink>,
}

impl GridSimulator {
    /// Creates an empty grid starting at day 1, 00:00.
    ///
    /// # Arguments
    ///
    /// * `mix` - Source mix for the daily energy model
    /// * `tick_minutes` - Simulated minutes per tick (must be >= 1)
    /// * `nominal_capacity_kw` - Grid capacity behind the snapshot
    ///   percentages (must be > 0)
    /// * `seed` - Master random seed
    /// * `sink` - Log destination shared by all subjects
    ///
    /// # Panics
    ///
    /// Panics if `tick_minutes` is zero or the capacity is not positive.
    pub fn new(
        mix: SourceMix,
        tick_minutes: u32,
        nominal_capacity_kw: f32,
        seed: u64,
        sink: Rc<dyn LogSink>,
    ) -> Self {
        assert!(tick_minutes >= 1, "tick length must be at least one minute");
        assert!(
            nominal_capacity_kw > 0.0,
            "nominal_capacity_kw must be > 0"
        );

        let logger = Logger::new(Rc::clone(&sink), "grid", "master", LogLevel::All);
        Self {
            clock: GridClock::new(1, 0, 0),
            tick_minutes,
            nominal_capacity_kw,
            model: DailyEnergyModel::new(mix),
            vehicles: Vec::new(),
            stations: Vec::new(),
            snapshot: None,
            snapshot_day: 0,
            rng: StdRng::seed_from_u64(seed),
            logger,
            sink,
        }
    }

    /// Moves the clock before the run starts.
    pub fn set_start_time(&mut self, clock: GridClock) {
        self.clock = clock;
    }

    /// Reconfigures the grid subject's log verbosity.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.logger.set_level(level);
    }

    pub fn clock(&self) -> &GridClock {
        &self.clock
    }

    pub fn tick_minutes(&self) -> u32 {
        self.tick_minutes
    }

    /// Registered vehicles in insertion order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Registered stations in insertion order.
    pub fn stations(&self) -> &[ChargeStation] {
        &self.stations
    }

    /// The current day's snapshot, if a tick has run.
    pub fn snapshot(&self) -> Option<&DaySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.grid_id() == id)
    }

    pub fn vehicle_mut(&mut self, id: &str) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.grid_id() == id)
    }

    pub fn station(&self, id: &str) -> Option<&ChargeStation> {
        self.stations.iter().find(|s| s.grid_id() == id)
    }

    fn vehicle_index(&self, id: &str) -> Option<usize> {
        self.vehicles.iter().position(|v| v.grid_id() == id)
    }

    fn station_index(&self, id: &str) -> Option<usize> {
        self.stations.iter().position(|s| s.grid_id() == id)
    }

    /// Draws a random catalog model from the grid's generator.
    pub fn draw_model(&mut self) -> &'static VehicleModel {
        crate::fleet::models::random(&mut self.rng)
    }

    /// Registers a vehicle and returns its new unique id.
    pub fn register_vehicle(
        &mut self,
        owner: &str,
        license_plate: &str,
        model: &VehicleModel,
        profile: ChargingProfile,
        log_level: LogLevel,
    ) -> String {
        let id = self.generate_id(true);
        let first_name = owner.split_whitespace().next().unwrap_or(owner);
        let logger = Logger::new(
            Rc::clone(&self.sink),
            format!("{first_name}'s car"),
            id.clone(),
            log_level,
        );
        self.vehicles.push(Vehicle::new(
            owner,
            license_plate,
            model,
            profile,
            id.clone(),
            logger,
        ));
        id
    }

    /// Registers a charge station and returns its new unique id.
    pub fn register_station(&mut self, charge_rate_kw: f32, log_level: LogLevel) -> String {
        let id = self.generate_id(false);
        let logger = Logger::new(Rc::clone(&self.sink), "charger", id.clone(), log_level);
        self.stations
            .push(ChargeStation::new(charge_rate_kw, id.clone(), logger));
        id
    }

    /// Random 8-character id, retried until unused in the target registry.
    fn generate_id(&mut self, for_vehicle: bool) -> String {
        loop {
            let id: String = (0..ID_LENGTH)
                .map(|_| self.rng.sample(Alphanumeric) as char)
                .collect();
            let taken = if for_vehicle {
                self.vehicles.iter().any(|v| v.grid_id() == id)
            } else {
                self.stations.iter().any(|s| s.grid_id() == id)
            };
            if !taken {
                return id;
            }
        }
    }

    /// Starts a trip for a registered vehicle.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] for unknown ids or a vehicle that is not idle.
    pub fn start_drive(&mut self, vehicle_id: &str, route_km: f32) -> Result<(), GridError> {
        let index = self
            .vehicle_index(vehicle_id)
            .ok_or_else(|| GridError::UnknownVehicle(vehicle_id.to_string()))?;
        self.vehicles[index].start_drive(route_km)?;
        Ok(())
    }

    /// Plugs a vehicle into a station, keeping both sides of the link
    /// consistent. Neither side changes when the attempt fails.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] for unknown ids, a busy vehicle, or an
    /// occupied station.
    pub fn connect(&mut self, vehicle_id: &str, station_id: &str) -> Result<(), GridError> {
        let vehicle_index = self
            .vehicle_index(vehicle_id)
            .ok_or_else(|| GridError::UnknownVehicle(vehicle_id.to_string()))?;
        let station_index = self
            .station_index(station_id)
            .ok_or_else(|| GridError::UnknownStation(station_id.to_string()))?;

        self.vehicles[vehicle_index].ensure_can_connect()?;
        match self.stations[station_index].attach_vehicle(vehicle_id) {
            Ok(()) => {}
            Err(err) => {
                self.report_free_stations();
                return Err(err.into());
            }
        }
        self.vehicles[vehicle_index].attach(station_id);
        Ok(())
    }

    /// Unplugs a vehicle from its station.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] for an unknown id or a vehicle that is not
    /// connected.
    pub fn disconnect(&mut self, vehicle_id: &str) -> Result<(), GridError> {
        let vehicle_index = self
            .vehicle_index(vehicle_id)
            .ok_or_else(|| GridError::UnknownVehicle(vehicle_id.to_string()))?;

        let Some(station_id) = self.vehicles[vehicle_index].station_id().map(str::to_string)
        else {
            self.vehicles[vehicle_index].logger().log(
                LogLevel::Error,
                "Disconnection was unsuccessful: no charge station is connected.",
            );
            return Err(FleetError::NotConnected.into());
        };
        let station_index = self
            .station_index(&station_id)
            .ok_or_else(|| GridError::UnknownStation(station_id.clone()))?;

        self.stations[station_index].detach_vehicle(vehicle_id)?;
        self.vehicles[vehicle_index].detach();
        Ok(())
    }

    /// Logs which stations are currently free.
    fn report_free_stations(&self) {
        let free: Vec<&str> = self
            .stations
            .iter()
            .filter(|s| !s.is_occupied())
            .map(|s| s.grid_id())
            .collect();
        if self.stations.is_empty() {
            self.logger
                .log(LogLevel::Error, "No charge stations are available.");
        } else if free.is_empty() {
            self.logger
                .log(LogLevel::Warn, "No charge station is currently free.");
        } else {
            self.logger.log(
                LogLevel::Info,
                &format!(
                    "The charge stations with IDs [{}] are ready to be used.",
                    free.join(", ")
                ),
            );
        }
    }

    /// Executes one tick: refresh the snapshot at day boundaries, dispatch
    /// every vehicle by state, apply the allocation policy, and advance the
    /// clock.
    pub fn tick(&mut self) -> TickRecord {
        if self.snapshot.is_none() || self.snapshot_day != self.clock.days() {
            let snapshot = self.model.generate(&mut self.rng);
            self.logger.log(
                LogLevel::Info,
                &format!("Day {}: {}", self.clock.days(), snapshot.weather),
            );
            self.snapshot_day = self.clock.days();
            self.snapshot = Some(snapshot);
        }

        if self.clock.minutes() == 0 {
            self.logger.log(
                LogLevel::Info,
                &format!("{:02}:{:02}", self.clock.hours(), self.clock.minutes()),
            );
        }

        let tick_minutes = self.tick_minutes;
        let clock = self.clock;

        // Dispatch by state; connected vehicles land in priority buckets,
        // one per tier in ChargePriority::RANKED order.
        let mut buckets: [Vec<usize>; 5] = Default::default();
        let mut driving = 0;
        let mut towed = 0;
        let mut connected = 0;
        let mut stranded = 0;

        for index in 0..self.vehicles.len() {
            match self.vehicles[index].state().clone() {
                VehicleState::Driving { .. } => {
                    driving += 1;
                    self.vehicles[index].tick_drive(tick_minutes, &mut self.rng);
                    if matches!(self.vehicles[index].state(), VehicleState::BeingTowed { .. }) {
                        stranded += 1;
                    }
                }
                VehicleState::BeingTowed { .. } => {
                    towed += 1;
                    self.vehicles[index].tick_towed(tick_minutes);
                }
                VehicleState::Connected { station_id, .. } => {
                    connected += 1;
                    if let Some(station_index) = self.station_index(&station_id) {
                        let priority = self.vehicles[index].charging_priority(
                            &self.stations[station_index],
                            &clock,
                            tick_minutes,
                        );
                        buckets[priority.rank()].push(index);
                    }
                }
                VehicleState::Idle => {}
            }
        }

        // Allocation: the minute's snapshot decides whether connected
        // vehicles feed the grid or draw from it.
        let minute = self.clock.minute_of_day() as usize;
        let (production, consumption) = {
            let snapshot = self
                .snapshot
                .as_ref()
                .expect("snapshot generated at tick start");
            (snapshot.production_at(minute), snapshot.consumption_at(minute))
        };
        let deficit = consumption > production;

        // During a deficit the Immediate tier is protected from draining;
        // otherwise the most urgent vehicles are charged first.
        let candidates: Vec<usize> = if deficit {
            buckets[1..].iter().flatten().copied().collect()
        } else {
            buckets.iter().flatten().copied().collect()
        };

        let gap_pct = (production - consumption).abs();
        let gap_kwh =
            gap_pct as f32 / 100.0 * self.nominal_capacity_kw * tick_minutes as f32 / 60.0;

        let mut charged_kwh = 0.0f32;
        let mut discharged_kwh = 0.0f32;
        let mut transferred_kwh = 0.0f32;
        let mut served = vec![false; self.vehicles.len()];

        for &vehicle_index in &candidates {
            if transferred_kwh >= gap_kwh {
                break;
            }
            let Some(station_id) = self.vehicles[vehicle_index].station_id().map(str::to_string)
            else {
                continue;
            };
            let Some(station_index) = self.station_index(&station_id) else {
                continue;
            };

            let energy = if deficit {
                let credited = self.stations[station_index]
                    .tick_discharge(&mut self.vehicles[vehicle_index], tick_minutes);
                discharged_kwh += credited;
                credited
            } else {
                let drawn = self.stations[station_index]
                    .tick_charge(&mut self.vehicles[vehicle_index], tick_minutes);
                charged_kwh += drawn;
                drawn
            };
            transferred_kwh += energy;
            served[vehicle_index] = true;
        }

        // Whoever was not served sits idle on the plug this tick.
        for index in 0..self.vehicles.len() {
            if !served[index] {
                self.vehicles[index].idle_connection();
            }
        }

        let record = TickRecord {
            minute: self.clock.total_minutes(),
            time: self.clock,
            production_pct: production,
            consumption_pct: consumption,
            deficit,
            candidates: candidates.len(),
            energy_charged_kwh: charged_kwh,
            energy_discharged_kwh: discharged_kwh,
            driving,
            towed,
            connected,
            stranded,
        };

        self.clock.add_minutes(tick_minutes);
        record
    }

    /// Operates the grid until at least `minutes` simulated minutes have
    /// elapsed.
    pub fn operate(&mut self, minutes: u32) -> Vec<TickRecord> {
        let start = self.clock.total_minutes();
        let mut records = Vec::new();
        while self.clock.total_minutes() < start + u64::from(minutes) {
            records.push(self.tick());
        }
        records
    }
}
