//! Charging profiles and the per-tick charging priority.

use std::fmt;

/// User-selectable charging policy. The set is closed; each profile fixes a
/// contractual charge floor and, optionally, charge-by-deadline obligations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargingProfile {
    /// The grid decides when and how long the car is charged or discharged.
    Default,
    /// At least 80% whenever the workday starts (08:00) or ends (17:00).
    Work,
    /// Keeps a large reserve at all times.
    Safe,
    /// Charge at all times, always toward 100%.
    Full,
}

impl ChargingProfile {
    const WORK_DEADLINES: [u32; 2] = [8, 17];

    /// Minimal acceptable charge percentage; going at or below it makes the
    /// vehicle an immediate charging candidate.
    pub fn min_charge_status(self) -> i32 {
        match self {
            ChargingProfile::Default => 20,
            ChargingProfile::Work => 30,
            ChargingProfile::Safe => 70,
            ChargingProfile::Full => 100,
        }
    }

    /// Hours of day at which the contracted target has to be reached.
    pub fn contracted_times(self) -> Option<&'static [u32]> {
        match self {
            ChargingProfile::Work => Some(&Self::WORK_DEADLINES),
            _ => None,
        }
    }

    /// Charge percentage owed at each contracted time.
    pub fn contracted_target(self) -> Option<i32> {
        match self {
            ChargingProfile::Work => Some(80),
            _ => None,
        }
    }

    /// Parses a lowercase profile name as used in scenario files.
    pub fn from_name(name: &str) -> Option<ChargingProfile> {
        match name {
            "default" => Some(ChargingProfile::Default),
            "work" => Some(ChargingProfile::Work),
            "safe" => Some(ChargingProfile::Safe),
            "full" => Some(ChargingProfile::Full),
            _ => None,
        }
    }
}

impl Default for ChargingProfile {
    fn default() -> Self {
        ChargingProfile::Default
    }
}

impl fmt::Display for ChargingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChargingProfile::Default => "default",
            ChargingProfile::Work => "work",
            ChargingProfile::Safe => "safe",
            ChargingProfile::Full => "full",
        };
        write!(f, "{name}")
    }
}

/// How urgently a connected vehicle needs energy this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChargePriority {
    Immediate,
    Urgent,
    Normal,
    Weak,
    None,
}

impl ChargePriority {
    /// All tiers from most to least urgent, used for bucket iteration.
    pub const RANKED: [ChargePriority; 5] = [
        ChargePriority::Immediate,
        ChargePriority::Urgent,
        ChargePriority::Normal,
        ChargePriority::Weak,
        ChargePriority::None,
    ];

    /// Position in [`RANKED`](Self::RANKED); 0 is the most urgent.
    pub fn rank(self) -> usize {
        match self {
            ChargePriority::Immediate => 0,
            ChargePriority::Urgent => 1,
            ChargePriority::Normal => 2,
            ChargePriority::Weak => 3,
            ChargePriority::None => 4,
        }
    }
}

impl fmt::Display for ChargePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChargePriority::Immediate => "immediate",
            ChargePriority::Urgent => "urgent",
            ChargePriority::Normal => "normal",
            ChargePriority::Weak => "weak",
            ChargePriority::None => "none",
        };
        write!(f, "{name}")
    }
}
