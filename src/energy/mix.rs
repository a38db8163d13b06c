//! Energy source mix configuration.

use std::fmt;

/// Rejected source-mix weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixError {
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for MixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid source mix: {}", self.message)
    }
}

impl std::error::Error for MixError {}

/// Weighting of the five generation sources in the combined production curve.
///
/// Either five explicit weights, or the "weak" two-bucket form that treats
/// wind, solar, and hydro as one renewable bucket and nuclear plus coal as
/// the non-renewable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMix {
    PerSource {
        wind: i32,
        solar: i32,
        hydro: i32,
        nuclear: i32,
        coal: i32,
    },
    Aggregate {
        renewable: i32,
        nonrenewable: i32,
    },
}

impl SourceMix {
    /// Builds a five-weight mix.
    ///
    /// # Errors
    ///
    /// Returns a [`MixError`] if any weight is negative or all are zero.
    pub fn per_source(
        wind: i32,
        solar: i32,
        hydro: i32,
        nuclear: i32,
        coal: i32,
    ) -> Result<Self, MixError> {
        let weights = [wind, solar, hydro, nuclear, coal];
        check_weights(&weights)?;
        Ok(SourceMix::PerSource {
            wind,
            solar,
            hydro,
            nuclear,
            coal,
        })
    }

    /// Builds a renewable/non-renewable aggregate mix.
    ///
    /// # Errors
    ///
    /// Returns a [`MixError`] if a weight is negative or both are zero.
    pub fn aggregate(renewable: i32, nonrenewable: i32) -> Result<Self, MixError> {
        check_weights(&[renewable, nonrenewable])?;
        Ok(SourceMix::Aggregate {
            renewable,
            nonrenewable,
        })
    }

    /// Weighted average of one minute's per-source output percentages.
    pub(crate) fn combine(
        &self,
        wind_pct: i32,
        solar_pct: i32,
        hydro_pct: i32,
        nuclear_pct: i32,
        coal_pct: i32,
    ) -> i32 {
        match *self {
            SourceMix::PerSource {
                wind,
                solar,
                hydro,
                nuclear,
                coal,
            } => {
                (wind_pct * wind
                    + solar_pct * solar
                    + hydro_pct * hydro
                    + nuclear_pct * nuclear
                    + coal_pct * coal)
                    / (wind + solar + hydro + nuclear + coal)
            }
            SourceMix::Aggregate {
                renewable,
                nonrenewable,
            } => {
                ((wind_pct + solar_pct + hydro_pct) * renewable
                    + (nuclear_pct + coal_pct) * nonrenewable)
                    / (renewable + nonrenewable)
            }
        }
    }
}

fn check_weights(weights: &[i32]) -> Result<(), MixError> {
    if weights.iter().any(|&w| w < 0) {
        return Err(MixError {
            message: "every weight must be greater or equal to 0".to_string(),
        });
    }
    if weights.iter().sum::<i32>() == 0 {
        return Err(MixError {
            message: "at least one weight must be positive".to_string(),
        });
    }
    Ok(())
}
