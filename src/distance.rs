use serde::{Deserialize, Serialize};

use crate::constants::LIGHT_SPEED_KM_S;

/// Light-time unit chosen for a distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightUnit {
    LightSeconds,
    LightMinutes,
    LightHours,
    LightDays,
    LightYears,
}

impl LightUnit {
    /// Unit name as used in prose
    pub fn label(self) -> &'static str {
        match self {
            LightUnit::LightSeconds => "light seconds",
            LightUnit::LightMinutes => "light minutes",
            LightUnit::LightHours => "light hours",
            LightUnit::LightDays => "light days",
            LightUnit::LightYears => "light years",
        }
    }
}

/// A distance expressed as light travel time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDistance {
    pub value: f64,
    pub unit: LightUnit,
    pub string: String,
}

/// Converts a distance in kilometres to the largest light-time unit that stays under its rollover
pub fn convert_to_light_distance(distance_km: f64) -> LightDistance {
    let seconds = distance_km / LIGHT_SPEED_KM_S;
    if seconds < 60.0 {
        return light_distance(seconds, LightUnit::LightSeconds);
    }

    let minutes = seconds / 60.0;
    if minutes < 60.0 {
        return light_distance(minutes, LightUnit::LightMinutes);
    }

    let hours = minutes / 60.0;
    if hours < 24.0 {
        return light_distance(hours, LightUnit::LightHours);
    }

    let days = hours / 24.0;
    if days < 365.0 {
        return light_distance(days, LightUnit::LightDays);
    }

    light_distance(days / 365.25, LightUnit::LightYears)
}

fn light_distance(value: f64, unit: LightUnit) -> LightDistance {
    LightDistance {
        value: round_to(value, 2),
        unit,
        string: format!("{:.2} {} away", value, unit.label()),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
