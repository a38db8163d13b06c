//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;

use crate::energy::SourceMix;
use crate::fleet::{ChargingProfile, models};
use crate::logging::{LogLevel, LogSink};
use crate::sim::clock::GridClock;
use crate::sim::grid::GridSimulator;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Grid capacity parameters.
    #[serde(default)]
    pub grid: GridConfig,
    /// Energy source mix weights.
    #[serde(default)]
    pub mix: MixConfig,
    /// Charge station roster.
    #[serde(default)]
    pub stations: Vec<StationConfig>,
    /// Vehicle roster with optional start-of-run commands.
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulated minutes per tick (must be >= 1).
    pub tick_minutes: u32,
    /// Simulated minutes to run (must be >= 1).
    pub run_minutes: u32,
    /// Master random seed.
    pub seed: u64,
    /// Start time in `dd-hh:mm` form; malformed input falls back to the
    /// zero default with a warning.
    pub start_time: String,
    /// Grid verbosity: `none`, `error`, `warn`, `info`, or `all`.
    pub log_level: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_minutes: 1,
            run_minutes: 1440,
            seed: 42,
            start_time: "01-00:00".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Grid capacity parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Nominal capacity behind the snapshot percentages (kW, must be > 0).
    pub nominal_capacity_kw: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nominal_capacity_kw: 500.0,
        }
    }
}

/// Energy source mix weights: either all five per-source weights or the
/// two aggregate weights, never both.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MixConfig {
    pub wind: Option<i32>,
    pub solar: Option<i32>,
    pub hydro: Option<i32>,
    pub nuclear: Option<i32>,
    pub coal: Option<i32>,
    pub renewable: Option<i32>,
    pub nonrenewable: Option<i32>,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            wind: None,
            solar: None,
            hydro: None,
            nuclear: None,
            coal: None,
            renewable: Some(70),
            nonrenewable: Some(50),
        }
    }
}

impl MixConfig {
    /// Resolves the configured weights into a [`SourceMix`].
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the shape is ambiguous, incomplete, or
    /// a weight is rejected.
    pub fn to_source_mix(&self) -> Result<SourceMix, ConfigError> {
        let per_source = [self.wind, self.solar, self.hydro, self.nuclear, self.coal];
        let has_per_source = per_source.iter().any(Option::is_some);
        let has_aggregate = self.renewable.is_some() || self.nonrenewable.is_some();

        match (has_per_source, has_aggregate) {
            (true, true) => Err(ConfigError {
                field: "mix".into(),
                message: "per-source and aggregate weights are mutually exclusive".into(),
            }),
            (false, false) => Err(ConfigError {
                field: "mix".into(),
                message: "either per-source or aggregate weights are required".into(),
            }),
            (true, false) => {
                let [Some(wind), Some(solar), Some(hydro), Some(nuclear), Some(coal)] = per_source
                else {
                    return Err(ConfigError {
                        field: "mix".into(),
                        message: "per-source mix requires wind, solar, hydro, nuclear and coal"
                            .into(),
                    });
                };
                SourceMix::per_source(wind, solar, hydro, nuclear, coal).map_err(|e| ConfigError {
                    field: "mix".into(),
                    message: e.to_string(),
                })
            }
            (false, true) => {
                let (Some(renewable), Some(nonrenewable)) = (self.renewable, self.nonrenewable)
                else {
                    return Err(ConfigError {
                        field: "mix".into(),
                        message: "aggregate mix requires renewable and nonrenewable".into(),
                    });
                };
                SourceMix::aggregate(renewable, nonrenewable).map_err(|e| ConfigError {
                    field: "mix".into(),
                    message: e.to_string(),
                })
            }
        }
    }
}

/// One charge station.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationConfig {
    /// Charging rate (kW, must be > 0).
    pub charge_rate_kw: f32,
    /// Station verbosity.
    pub log_level: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            charge_rate_kw: 150.0,
            log_level: "warn".to_string(),
        }
    }
}

/// One vehicle, with optional start-of-run commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleConfig {
    pub owner: String,
    pub license_plate: String,
    /// Catalog key (`tesla_model_s`, `vw_e_up`, `renault_zoe`) or `random`.
    pub model: String,
    /// Charging profile: `default`, `work`, `safe`, or `full`.
    pub profile: String,
    /// Vehicle verbosity.
    pub log_level: String,
    /// Starts a trip of this length at the beginning of the run.
    pub route_km: Option<f32>,
    /// Connects to the 1-based station at the beginning of the run.
    pub station: Option<usize>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            owner: "Driver".to_string(),
            license_plate: "UNREGISTERED".to_string(),
            model: "random".to_string(),
            profile: "default".to_string(),
            log_level: "all".to_string(),
            route_km: None,
            station: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.tick_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: an aggregate 70/50 mix, two 150 kW
    /// stations, a Tesla Model S on a long trip and a VW e-up! commuting.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            grid: GridConfig::default(),
            mix: MixConfig::default(),
            stations: vec![StationConfig::default(), StationConfig::default()],
            vehicles: vec![
                VehicleConfig {
                    owner: "Simon Conrad".to_string(),
                    license_plate: "RUD SC 888".to_string(),
                    model: "tesla_model_s".to_string(),
                    route_km: Some(200.0),
                    ..VehicleConfig::default()
                },
                VehicleConfig {
                    owner: "Hans Peter".to_string(),
                    license_plate: "WI HP 193".to_string(),
                    model: "vw_e_up".to_string(),
                    profile: "work".to_string(),
                    log_level: "error".to_string(),
                    route_km: Some(100.0),
                    ..VehicleConfig::default()
                },
            ],
        }
    }

    /// Returns the renewable preset: wind/solar/hydro-heavy per-source mix
    /// and a cautious fleet parked on the plugs.
    pub fn renewable() -> Self {
        Self {
            simulation: SimulationConfig {
                run_minutes: 2880,
                ..SimulationConfig::default()
            },
            grid: GridConfig {
                nominal_capacity_kw: 350.0,
            },
            mix: MixConfig {
                wind: Some(40),
                solar: Some(35),
                hydro: Some(15),
                nuclear: Some(5),
                coal: Some(5),
                renewable: None,
                nonrenewable: None,
            },
            stations: vec![
                StationConfig::default(),
                StationConfig {
                    charge_rate_kw: 50.0,
                    ..StationConfig::default()
                },
                StationConfig {
                    charge_rate_kw: 22.0,
                    ..StationConfig::default()
                },
            ],
            vehicles: vec![
                VehicleConfig {
                    owner: "Maren Fischer".to_string(),
                    license_plate: "KI MF 404".to_string(),
                    model: "renault_zoe".to_string(),
                    profile: "safe".to_string(),
                    station: Some(1),
                    ..VehicleConfig::default()
                },
                VehicleConfig {
                    owner: "Jonas Weber".to_string(),
                    license_plate: "HH JW 112".to_string(),
                    model: "tesla_model_s".to_string(),
                    station: Some(2),
                    ..VehicleConfig::default()
                },
                VehicleConfig {
                    owner: "Leyla Aydin".to_string(),
                    license_plate: "B LA 730".to_string(),
                    model: "vw_e_up".to_string(),
                    profile: "safe".to_string(),
                    route_km: Some(60.0),
                    ..VehicleConfig::default()
                },
            ],
        }
    }

    /// Returns the depot preset: a bank of medium chargers with a fleet
    /// that must be ready for the next shift, on coarse 5-minute ticks.
    pub fn depot() -> Self {
        let driver = |owner: &str, plate: &str, station: usize| VehicleConfig {
            owner: owner.to_string(),
            license_plate: plate.to_string(),
            model: "renault_zoe".to_string(),
            profile: "work".to_string(),
            log_level: "warn".to_string(),
            station: Some(station),
            ..VehicleConfig::default()
        };

        Self {
            simulation: SimulationConfig {
                tick_minutes: 5,
                run_minutes: 1440,
                ..SimulationConfig::default()
            },
            grid: GridConfig {
                nominal_capacity_kw: 800.0,
            },
            mix: MixConfig {
                renewable: Some(40),
                nonrenewable: Some(80),
                ..MixConfig::default()
            },
            stations: (0..4)
                .map(|_| StationConfig {
                    charge_rate_kw: 50.0,
                    ..StationConfig::default()
                })
                .collect(),
            vehicles: vec![
                driver("Depot One", "D EP 001", 1),
                driver("Depot Two", "D EP 002", 2),
                driver("Depot Three", "D EP 003", 3),
                driver("Depot Four", "D EP 004", 4),
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "renewable", "depot"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "renewable" => Ok(Self::renewable()),
            "depot" => Ok(Self::depot()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. A malformed
    /// `start_time` is not an error; it falls back to the zero default at
    /// build time.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.tick_minutes < 1 {
            errors.push(ConfigError {
                field: "simulation.tick_minutes".into(),
                message: "must be >= 1".into(),
            });
        }
        if s.run_minutes < 1 {
            errors.push(ConfigError {
                field: "simulation.run_minutes".into(),
                message: "must be >= 1".into(),
            });
        }
        if LogLevel::from_name(&s.log_level).is_none() {
            errors.push(ConfigError {
                field: "simulation.log_level".into(),
                message: format!(
                    "must be one of none, error, warn, info, all; got \"{}\"",
                    s.log_level
                ),
            });
        }

        if self.grid.nominal_capacity_kw <= 0.0 {
            errors.push(ConfigError {
                field: "grid.nominal_capacity_kw".into(),
                message: "must be > 0".into(),
            });
        }

        if let Err(e) = self.mix.to_source_mix() {
            errors.push(e);
        }

        for (i, station) in self.stations.iter().enumerate() {
            if station.charge_rate_kw <= 0.0 {
                errors.push(ConfigError {
                    field: format!("stations[{i}].charge_rate_kw"),
                    message: "must be > 0".into(),
                });
            }
            if LogLevel::from_name(&station.log_level).is_none() {
                errors.push(ConfigError {
                    field: format!("stations[{i}].log_level"),
                    message: format!("unknown log level \"{}\"", station.log_level),
                });
            }
        }

        let mut claimed_stations = Vec::new();
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if vehicle.model != "random" && models::by_name(&vehicle.model).is_none() {
                errors.push(ConfigError {
                    field: format!("vehicles[{i}].model"),
                    message: format!(
                        "unknown model \"{}\", expected a catalog key or \"random\"",
                        vehicle.model
                    ),
                });
            }
            if ChargingProfile::from_name(&vehicle.profile).is_none() {
                errors.push(ConfigError {
                    field: format!("vehicles[{i}].profile"),
                    message: format!("unknown profile \"{}\"", vehicle.profile),
                });
            }
            if LogLevel::from_name(&vehicle.log_level).is_none() {
                errors.push(ConfigError {
                    field: format!("vehicles[{i}].log_level"),
                    message: format!("unknown log level \"{}\"", vehicle.log_level),
                });
            }
            if let Some(route_km) = vehicle.route_km {
                if route_km <= 0.0 {
                    errors.push(ConfigError {
                        field: format!("vehicles[{i}].route_km"),
                        message: "must be > 0".into(),
                    });
                }
            }
            if let Some(station) = vehicle.station {
                if station < 1 || station > self.stations.len() {
                    errors.push(ConfigError {
                        field: format!("vehicles[{i}].station"),
                        message: format!(
                            "must be a 1-based index into stations (1..={})",
                            self.stations.len()
                        ),
                    });
                } else if claimed_stations.contains(&station) {
                    errors.push(ConfigError {
                        field: format!("vehicles[{i}].station"),
                        message: "station is already claimed by another vehicle".into(),
                    });
                } else {
                    claimed_stations.push(station);
                }
            }
            if vehicle.route_km.is_some() && vehicle.station.is_some() {
                errors.push(ConfigError {
                    field: format!("vehicles[{i}]"),
                    message: "route_km and station are mutually exclusive".into(),
                });
            }
        }

        errors
    }

    /// Wires a [`GridSimulator`] from a validated scenario: registers the
    /// roster, applies the start time, and issues the start-of-run
    /// commands.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, or an error from an initial
    /// command.
    pub fn build(&self, sink: Rc<dyn LogSink>) -> Result<GridSimulator, ConfigError> {
        let mut errors = self.validate();
        if !errors.is_empty() {
            return Err(errors.remove(0));
        }

        let s = &self.simulation;
        let mix = self.mix.to_source_mix()?;
        let mut sim = GridSimulator::new(
            mix,
            s.tick_minutes,
            self.grid.nominal_capacity_kw,
            s.seed,
            Rc::clone(&sink),
        );

        let grid_level = LogLevel::from_name(&s.log_level).unwrap_or(LogLevel::Info);
        sim.set_log_level(grid_level);

        match GridClock::parse(&s.start_time) {
            Ok(clock) => sim.set_start_time(clock),
            Err(e) => {
                sink.emit(
                    "grid",
                    "master",
                    &format!("{e}; defaulting to 00-00:00"),
                    grid_level,
                    LogLevel::Warn,
                );
                sim.set_start_time(GridClock::default());
            }
        }

        let station_ids: Vec<String> = self
            .stations
            .iter()
            .map(|station| {
                let level = LogLevel::from_name(&station.log_level).unwrap_or(LogLevel::Warn);
                sim.register_station(station.charge_rate_kw, level)
            })
            .collect();

        let mut vehicle_ids = Vec::with_capacity(self.vehicles.len());
        for vehicle in &self.vehicles {
            let model = if vehicle.model == "random" {
                sim.draw_model()
            } else {
                models::by_name(&vehicle.model).ok_or_else(|| ConfigError {
                    field: "vehicles.model".into(),
                    message: format!("unknown model \"{}\"", vehicle.model),
                })?
            };
            let profile =
                ChargingProfile::from_name(&vehicle.profile).ok_or_else(|| ConfigError {
                    field: "vehicles.profile".into(),
                    message: format!("unknown profile \"{}\"", vehicle.profile),
                })?;
            let level = LogLevel::from_name(&vehicle.log_level).unwrap_or(LogLevel::All);
            vehicle_ids.push(sim.register_vehicle(
                &vehicle.owner,
                &vehicle.license_plate,
                model,
                profile,
                level,
            ));
        }

        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if let Some(route_km) = vehicle.route_km {
                sim.start_drive(&vehicle_ids[i], route_km)
                    .map_err(|e| ConfigError {
                        field: format!("vehicles[{i}].route_km"),
                        message: e.to_string(),
                    })?;
            }
            if let Some(station) = vehicle.station {
                sim.connect(&vehicle_ids[i], &station_ids[station - 1])
                    .map_err(|e| ConfigError {
                        field: format!("vehicles[{i}].station"),
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(sim)
    }
}
