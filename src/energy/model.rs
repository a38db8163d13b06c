//! Synthetic daily production and consumption curves.
//!
//! Each source contributes 24 hourly anchor values which are expanded to
//! 1440 one-minute samples by linear interpolation, then combined under the
//! configured [`SourceMix`]. All values are percentages of nominal grid
//! capacity.

use rand::{Rng, rngs::StdRng};

use super::mix::SourceMix;
use super::weather::{Cloudiness, Weather, WindSpeed};

/// Samples in one daily curve.
pub const MINUTES_PER_DAY: usize = 24 * 60;

const HOURS_PER_DAY: usize = 24;

const NUCLEAR_BASELINE: i32 = 94;
const COAL_BASELINE: i32 = 80;

/// Hourly demand reference with the morning and evening peaks.
const REFERENCE_DEMAND: [i32; HOURS_PER_DAY] = [
    35, 32, 30, 30, 30, 32, 36, 50, 57, 54, 48, 48, 51, 57, 50, 45, 40, 50, 65, 80, 82, 65, 53, 45,
];

/// One day's per-minute production and consumption curves plus the weather
/// they were generated under. Immutable once built; the grid swaps in a
/// fresh snapshot at each day boundary.
#[derive(Debug, Clone)]
pub struct DaySnapshot {
    production: Vec<i32>,
    consumption: Vec<i32>,
    /// The day's weather draw.
    pub weather: Weather,
}

impl DaySnapshot {
    /// Production at a minute of day, as a percentage of nominal capacity.
    pub fn production_at(&self, minute: usize) -> i32 {
        self.production[minute]
    }

    /// Consumption at a minute of day, as a percentage of nominal capacity.
    pub fn consumption_at(&self, minute: usize) -> i32 {
        self.consumption[minute]
    }

    /// Production minus consumption at a minute of day; negative is a deficit.
    pub fn surplus_at(&self, minute: usize) -> i32 {
        self.production[minute] - self.consumption[minute]
    }

    /// The full production curve.
    pub fn production(&self) -> &[i32] {
        &self.production
    }

    /// The full consumption curve.
    pub fn consumption(&self) -> &[i32] {
        &self.consumption
    }
}

/// Generator for [`DaySnapshot`]s under a fixed source mix.
#[derive(Debug, Clone)]
pub struct DailyEnergyModel {
    mix: SourceMix,
}

impl DailyEnergyModel {
    /// Creates a model for the given (already validated) source mix.
    pub fn new(mix: SourceMix) -> Self {
        Self { mix }
    }

    /// Generates one day's snapshot with a fresh weather draw.
    pub fn generate(&self, rng: &mut StdRng) -> DaySnapshot {
        let weather = Weather::draw(rng);
        self.generate_with_weather(weather, rng)
    }

    /// Generates one day's snapshot for a fixed weather, useful for tests.
    pub fn generate_with_weather(&self, weather: Weather, rng: &mut StdRng) -> DaySnapshot {
        let wind = interpolate(&wind_farm(rng, weather.wind));
        let solar = interpolate(&solar_farm(rng, weather.cloudiness));
        let hydro = interpolate(&hydro_plant(rng, weather.cloudiness));
        let nuclear = interpolate(&thermal_plant(rng, NUCLEAR_BASELINE));
        let coal = interpolate(&thermal_plant(rng, COAL_BASELINE));

        let mut production = Vec::with_capacity(MINUTES_PER_DAY);
        for i in 0..MINUTES_PER_DAY {
            let combined = self
                .mix
                .combine(wind[i], solar[i], hydro[i], nuclear[i], coal[i]);
            // Expressed against nominal grid capacity, which is four times a
            // single source's full output.
            production.push(combined / 4);
        }

        let consumption = interpolate(&demand_curve(rng));

        DaySnapshot {
            production,
            consumption,
            weather,
        }
    }
}

/// Expands 24 hourly anchors to 1440 minutes by linear interpolation.
///
/// Each hour interpolates toward the next anchor; the last hour holds its
/// own value.
fn interpolate(hourly: &[i32; HOURS_PER_DAY]) -> Vec<i32> {
    let mut samples = Vec::with_capacity(MINUTES_PER_DAY);
    for hour in 0..HOURS_PER_DAY {
        let current = hourly[hour];
        let next = hourly[(hour + 1).min(HOURS_PER_DAY - 1)];
        let step = (next - current) as f32 / 60.0;
        for minute in 0..60 {
            samples.push(current + (step * minute as f32) as i32);
        }
    }
    samples
}

/// Bounded random walk scaled by the day's wind strength.
fn wind_farm(rng: &mut StdRng, wind: WindSpeed) -> [i32; HOURS_PER_DAY] {
    let mut values = [0i32; HOURS_PER_DAY];
    values[0] = 45;
    for hour in 1..HOURS_PER_DAY {
        values[hour] = (values[hour - 1] + rng.random_range(-5..=5)).clamp(0, 100);
    }

    let factor = wind.wind_factor();
    for value in &mut values {
        *value = ((*value as f32 * factor) as i32).min(100);
    }
    values
}

/// Triangular profile peaking at hour 13, scaled by cloudiness.
fn solar_farm(rng: &mut StdRng, cloudiness: Cloudiness) -> [i32; HOURS_PER_DAY] {
    let mut values = [0i32; HOURS_PER_DAY];
    for (hour, value) in values.iter_mut().enumerate() {
        let slope = 17 - rng.random_range(0..4);
        let distance_from_peak = (hour as i32 - 13).abs();
        *value = (100 - slope * distance_from_peak).max(0);
    }

    let factor = cloudiness.solar_factor();
    for value in &mut values {
        *value = (*value as f32 * factor) as i32;
    }
    values
}

/// Near-constant baseline with jitter, scaled by cloudiness.
fn hydro_plant(rng: &mut StdRng, cloudiness: Cloudiness) -> [i32; HOURS_PER_DAY] {
    let mut values = [0i32; HOURS_PER_DAY];
    for value in &mut values {
        *value = 70 + rng.random_range(0..15);
    }

    let factor = cloudiness.hydro_factor();
    for value in &mut values {
        *value = (*value as f32 * factor) as i32;
    }
    values
}

/// Weather-independent baseline with small jitter (nuclear and coal).
fn thermal_plant(rng: &mut StdRng, baseline: i32) -> [i32; HOURS_PER_DAY] {
    let mut values = [0i32; HOURS_PER_DAY];
    for value in &mut values {
        *value = baseline + rng.random_range(0..6);
    }
    values
}

/// Reference demand curve with per-hour jitter.
fn demand_curve(rng: &mut StdRng) -> [i32; HOURS_PER_DAY] {
    let mut values = REFERENCE_DEMAND;
    for value in &mut values {
        *value += rng.random_range(-5..=5);
    }
    values
}
