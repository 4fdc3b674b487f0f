//! PM2.5 risk tiers and the cardiac-patient advisory catalog.
//!
//! Thresholds are inclusive upper bounds in µg/m³, in ascending order.

use crate::constants::{NO_ADVICE, UNKNOWN_TIER};

/// Air-quality health categories, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

const THRESHOLDS: [(f64, RiskTier); 5] = [
    (12.0, RiskTier::Good),
    (35.4, RiskTier::Moderate),
    (55.4, RiskTier::UnhealthyForSensitive),
    (150.4, RiskTier::Unhealthy),
    (250.4, RiskTier::VeryUnhealthy),
];

impl RiskTier {
    pub const ALL: [RiskTier; 6] = [
        RiskTier::Good,
        RiskTier::Moderate,
        RiskTier::UnhealthyForSensitive,
        RiskTier::Unhealthy,
        RiskTier::VeryUnhealthy,
        RiskTier::Hazardous,
    ];

    /// Display label, as returned in `risk_category`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Good => "Good",
            RiskTier::Moderate => "Moderate",
            RiskTier::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            RiskTier::Unhealthy => "Unhealthy",
            RiskTier::VeryUnhealthy => "Very Unhealthy",
            RiskTier::Hazardous => "Hazardous",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == label)
    }

    pub fn label_of(tier: Option<RiskTier>) -> &'static str {
        tier.map_or(UNKNOWN_TIER, |t| t.as_str())
    }
}

/// Maps a PM2.5 concentration to its tier.
///
/// Negative values classify as `Good`. Returns `None` only for NaN, which has
/// no place in the ordering; callers report that as the "Unknown" tier.
pub fn classify(pm25: f64) -> Option<RiskTier> {
    if pm25.is_nan() {
        return None;
    }
    let tier = THRESHOLDS
        .iter()
        .find(|(upper, _)| pm25 <= *upper)
        .map_or(RiskTier::Hazardous, |(_, tier)| *tier);
    Some(tier)
}

/// Static lookup from tier to guidance for heart patients.
pub struct AdvisoryCatalog;

impl AdvisoryCatalog {
    pub fn advise(tier: RiskTier) -> &'static str {
        match tier {
            RiskTier::Good => "Air quality is good. No specific precautions needed.",
            RiskTier::Moderate => {
                "Air quality is acceptable. Heart patients should consider limiting prolonged exertion."
            }
            RiskTier::UnhealthyForSensitive => {
                "Members of sensitive groups, including heart patients, may experience health effects. It's advisable to limit outdoor exertion."
            }
            RiskTier::Unhealthy => {
                "Everyone may begin to experience health effects. Heart patients should avoid outdoor exertion."
            }
            RiskTier::VeryUnhealthy => {
                "Health alert: everyone may experience more serious health effects. Heart patients should stay indoors and limit physical activity."
            }
            RiskTier::Hazardous => {
                "Health warning of emergency conditions. The entire population is likely to be affected. Heart patients should stay indoors and avoid physical activities."
            }
        }
    }

    /// Lookup by label. Unrecognized labels, "Unknown" included, get the sentinel.
    pub fn advise_label(label: &str) -> &'static str {
        RiskTier::from_label(label).map_or(NO_ADVICE, Self::advise)
    }

    pub fn advise_or_default(tier: Option<RiskTier>) -> &'static str {
        tier.map_or(NO_ADVICE, Self::advise)
    }
}
