//! Reduces a 7Timer ASTRO series into a single verdict for the evening window.

use serde::{Deserialize, Serialize};

use crate::distance::round_to;
use crate::models::ForecastSample;

/// Night sky quality, most favorable first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Unsuitable,
}

impl QualityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Excellent => "excellent",
            QualityTier::Good => "good",
            QualityTier::Fair => "fair",
            QualityTier::Poor => "poor",
            QualityTier::Unsuitable => "unsuitable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherVerdict {
    pub quality: QualityTier,
    pub score: u32,
    pub worth_observing: bool,
    pub avg_cloud_cover: u8,
    pub avg_seeing: f64,
    pub avg_transparency: f64,
    pub has_rain: bool,
    pub reasons: Vec<String>,
}

/// Stand-in reported when the weather source could not be used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherUnavailable {
    pub error: String,
    pub message: String,
}

/// Weather section of a night report. Serializes as the verdict, the error
/// placeholder, or `null` when no sample fell inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherOutlook {
    Forecast(WeatherVerdict),
    Unavailable(WeatherUnavailable),
    NoData,
}

impl WeatherOutlook {
    pub fn unavailable(message: impl Into<String>) -> Self {
        WeatherOutlook::Unavailable(WeatherUnavailable {
            error: "Weather data unavailable".to_string(),
            message: message.into(),
        })
    }
}

/// Wall-clock membership test for the evening window; wraps past midnight when `end <= start`
pub fn in_evening_window(hour: u32, start_hour: u8, end_hour: u8) -> bool {
    let (start, end) = (u32::from(start_hour), u32::from(end_hour));
    if end > start {
        hour >= start && hour <= end
    } else {
        hour >= start || hour <= end
    }
}

/// Interprets the samples falling inside the window. `None` when none do.
pub fn interpret_weather_conditions(
    series: &[ForecastSample],
    start_hour: u8,
    end_hour: u8,
) -> Option<WeatherVerdict> {
    tracing::debug!("Interpreting conditions for hours {}-{}", start_hour, end_hour);

    let evening: Vec<&ForecastSample> = series
        .iter()
        .filter(|s| in_evening_window(s.timepoint % 24, start_hour, end_hour))
        .collect();

    tracing::debug!("Found {} data points for evening hours", evening.len());

    if evening.is_empty() {
        tracing::info!("No evening weather data available");
        return None;
    }

    let count = evening.len() as f64;
    let mean = |f: fn(&ForecastSample) -> u8| {
        evening.iter().map(|s| f64::from(f(*s))).sum::<f64>() / count
    };
    let cloud_cover = mean(|s| s.cloudcover);
    let seeing = mean(|s| s.seeing);
    let transparency = mean(|s| s.transparency);
    let has_rain = evening.iter().any(|s| s.has_precipitation());

    let mut quality = QualityTier::Excellent;
    let mut score = 0;
    let mut reasons = Vec::new();

    // Each rule may only tighten what the previous ones decided.
    if cloud_cover >= 7.0 {
        score += 3;
        reasons.push("heavy cloud cover");
        quality = QualityTier::Poor;
    } else if cloud_cover >= 5.0 {
        score += 2;
        reasons.push("moderate cloud cover");
        if quality == QualityTier::Excellent {
            quality = QualityTier::Fair;
        }
    } else if cloud_cover >= 3.0 {
        score += 1;
        reasons.push("some clouds");
        if quality == QualityTier::Excellent {
            quality = QualityTier::Good;
        }
    } else {
        reasons.push("clear skies");
    }

    if seeing <= 3.0 {
        score += 2;
        reasons.push("poor atmospheric stability");
        if matches!(quality, QualityTier::Excellent | QualityTier::Good) {
            quality = QualityTier::Fair;
        }
    } else if seeing <= 5.0 {
        reasons.push("average atmospheric stability");
    } else {
        reasons.push("excellent atmospheric stability");
    }

    if transparency <= 3.0 {
        score += 1;
        reasons.push("reduced transparency");
    } else if transparency >= 6.0 {
        reasons.push("excellent transparency");
    }

    if has_rain {
        score += 4;
        reasons.push("precipitation expected");
        quality = QualityTier::Unsuitable;
    }

    let worth_observing =
        !matches!(quality, QualityTier::Unsuitable | QualityTier::Poor) && cloud_cover < 6.0;

    tracing::info!(
        "Weather quality: {}, cloud cover: {:.1}, seeing: {:.1}, transparency: {:.1}",
        quality.as_str(),
        cloud_cover,
        seeing,
        transparency
    );

    Some(WeatherVerdict {
        quality,
        score,
        worth_observing,
        avg_cloud_cover: cloud_cover.round() as u8,
        avg_seeing: round_to(seeing, 1),
        avg_transparency: round_to(transparency, 1),
        has_rain,
        reasons: reasons.into_iter().map(String::from).collect(),
    })
}
