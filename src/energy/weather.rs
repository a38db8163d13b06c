//! Daily weather draw driving the production model.

use std::fmt;

use rand::{Rng, rngs::StdRng};

/// Sky condition for one simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cloudiness {
    Sunny,
    Clear,
    Cloudy,
    Rainy,
}

impl Cloudiness {
    const ALL: [Cloudiness; 4] = [
        Cloudiness::Sunny,
        Cloudiness::Clear,
        Cloudiness::Cloudy,
        Cloudiness::Rainy,
    ];

    /// Output multiplier for solar generation.
    pub fn solar_factor(self) -> f32 {
        match self {
            Cloudiness::Sunny => 1.5,
            Cloudiness::Clear => 1.0,
            Cloudiness::Cloudy => 0.5,
            Cloudiness::Rainy => 0.7,
        }
    }

    /// Output multiplier for hydro generation.
    pub fn hydro_factor(self) -> f32 {
        match self {
            Cloudiness::Sunny => 0.7,
            Cloudiness::Clear | Cloudiness::Cloudy => 1.0,
            Cloudiness::Rainy => 1.3,
        }
    }
}

impl fmt::Display for Cloudiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cloudiness::Sunny => "sunny",
            Cloudiness::Clear => "clear",
            Cloudiness::Cloudy => "cloudy",
            Cloudiness::Rainy => "rainy",
        };
        write!(f, "{name}")
    }
}

/// Wind strength for one simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindSpeed {
    Much,
    Normal,
    None,
}

impl WindSpeed {
    const ALL: [WindSpeed; 3] = [WindSpeed::Much, WindSpeed::Normal, WindSpeed::None];

    /// Output multiplier for wind generation.
    pub fn wind_factor(self) -> f32 {
        match self {
            WindSpeed::Much => 1.5,
            WindSpeed::Normal => 1.0,
            WindSpeed::None => 0.2,
        }
    }
}

impl fmt::Display for WindSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindSpeed::Much => "much",
            WindSpeed::Normal => "a normal amount of",
            WindSpeed::None => "no",
        };
        write!(f, "{name}")
    }
}

/// One day's weather: a cloudiness and a wind draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weather {
    pub cloudiness: Cloudiness,
    pub wind: WindSpeed,
}

impl Weather {
    /// Draws both components uniformly at random.
    pub fn draw(rng: &mut StdRng) -> Self {
        Self {
            cloudiness: Cloudiness::ALL[rng.random_range(0..Cloudiness::ALL.len())],
            wind: WindSpeed::ALL[rng.random_range(0..WindSpeed::ALL.len())],
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "It's a {} day with {} wind", self.cloudiness, self.wind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn draw_is_deterministic_for_same_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(Weather::draw(&mut a), Weather::draw(&mut b));
        }
    }

    #[test]
    fn draw_covers_all_variants_eventually() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen_cloud = [false; 4];
        let mut seen_wind = [false; 3];
        for _ in 0..200 {
            let w = Weather::draw(&mut rng);
            seen_cloud[Cloudiness::ALL.iter().position(|&c| c == w.cloudiness).unwrap()] = true;
            seen_wind[WindSpeed::ALL.iter().position(|&s| s == w.wind).unwrap()] = true;
        }
        assert!(seen_cloud.iter().all(|&s| s));
        assert!(seen_wind.iter().all(|&s| s));
    }

    #[test]
    fn display_reads_naturally() {
        let weather = Weather {
            cloudiness: Cloudiness::Sunny,
            wind: WindSpeed::Normal,
        };
        assert_eq!(
            weather.to_string(),
            "It's a sunny day with a normal amount of wind"
        );
    }

    #[test]
    fn factors_match_weather_severity() {
        assert!(WindSpeed::Much.wind_factor() > WindSpeed::None.wind_factor());
        assert!(Cloudiness::Sunny.solar_factor() > Cloudiness::Cloudy.solar_factor());
        assert!(Cloudiness::Rainy.hydro_factor() > Cloudiness::Sunny.hydro_factor());
    }
}
