//! Preset vehicle catalog.

use rand::{Rng, rngs::StdRng};

/// Fixed technical data of one vehicle model. The horsepower, brand, and
/// model name are cosmetic; capacity, consumption, and charge rate drive
/// the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleModel {
    pub brand: &'static str,
    pub model: &'static str,
    pub horsepower: u32,
    pub capacity_kwh: f32,
    pub consumption_kwh_per_100km: f32,
    pub max_charge_rate_kw: f32,
}

pub const TESLA_MODEL_S: VehicleModel = VehicleModel {
    brand: "Tesla",
    model: "Model S",
    horsepower: 670,
    capacity_kwh: 85.0,
    consumption_kwh_per_100km: 18.9,
    max_charge_rate_kw: 225.0,
};

pub const VW_E_UP: VehicleModel = VehicleModel {
    brand: "Volkswagen",
    model: "e-up!",
    horsepower: 83,
    capacity_kwh: 18.7,
    consumption_kwh_per_100km: 12.9,
    max_charge_rate_kw: 3.6,
};

pub const RENAULT_ZOE: VehicleModel = VehicleModel {
    brand: "Renault",
    model: "Zoe",
    horsepower: 135,
    capacity_kwh: 52.0,
    consumption_kwh_per_100km: 13.7,
    max_charge_rate_kw: 22.0,
};

/// Catalog keys as accepted in scenario files.
pub const CATALOG: [(&str, &VehicleModel); 3] = [
    ("tesla_model_s", &TESLA_MODEL_S),
    ("vw_e_up", &VW_E_UP),
    ("renault_zoe", &RENAULT_ZOE),
];

/// Looks up a catalog model by its scenario-file key.
pub fn by_name(name: &str) -> Option<&'static VehicleModel> {
    CATALOG
        .iter()
        .find_map(|&(key, model)| (key == name).then_some(model))
}

/// Draws a random catalog model.
pub fn random(rng: &mut StdRng) -> &'static VehicleModel {
    CATALOG[rng.random_range(0..CATALOG.len())].1
}
