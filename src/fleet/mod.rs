//! Electric vehicles, V2G charge stations, and charging policies.

use std::fmt;

/// Preset vehicle catalog.
pub mod models;
pub mod profile;
pub mod station;
pub mod vehicle;

pub use models::VehicleModel;
pub use profile::{ChargePriority, ChargingProfile};
pub use station::ChargeStation;
pub use vehicle::{ConnectionMode, Vehicle, VehicleState};

/// Recoverable fleet-level outcomes; the caller decides what happens next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetError {
    /// An operation that requires an idle vehicle found it busy.
    NotIdle { state: String },
    /// The vehicle is already connected to a station.
    AlreadyConnected { station_id: String },
    /// The station already holds another vehicle.
    StationOccupied {
        station_id: String,
        occupant: String,
    },
    /// The vehicle is not connected to any station.
    NotConnected,
    /// The vehicle is connected, but not to the addressed station.
    WrongStation { station_id: String },
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::NotIdle { state } => {
                write!(f, "vehicle is currently {state} and not idle")
            }
            FleetError::AlreadyConnected { station_id } => {
                write!(f, "vehicle is still connected to station {station_id}")
            }
            FleetError::StationOccupied {
                station_id,
                occupant,
            } => write!(
                f,
                "station {station_id} is already occupied by vehicle {occupant}"
            ),
            FleetError::NotConnected => write!(f, "vehicle is not connected to any station"),
            FleetError::WrongStation { station_id } => {
                write!(f, "vehicle is not connected to station {station_id}")
            }
        }
    }
}

impl std::error::Error for FleetError {}
