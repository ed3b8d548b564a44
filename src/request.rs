//! Caller-side parameter checks run before the planner is invoked.

use serde::{Deserialize, Deserializer};

use crate::error::{AstroError, AstroResult};
use crate::rating::ViewingLevel;

/// Fallbacks for the optional request parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestDefaults {
    pub viewing_level: ViewingLevel,
    pub evening_start_hour: u8,
    pub evening_end_hour: u8,
}

/// A validated planner request
#[derive(Debug, Clone, PartialEq)]
pub struct ViewingRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub viewing_level: ViewingLevel,
    pub evening_start_hour: u8,
    pub evening_end_hour: u8,
}

impl ViewingRequest {
    pub fn new(
        latitude: f64,
        longitude: f64,
        elevation: f64,
        viewing_level: Option<&str>,
        evening_start_hour: Option<i64>,
        evening_end_hour: Option<i64>,
        defaults: &RequestDefaults,
    ) -> AstroResult<Self> {
        if !(latitude.is_finite() && longitude.is_finite() && elevation.is_finite()) {
            return Err(missing_coordinates());
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AstroError::invalid(
                "latitude",
                "latitude must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AstroError::invalid(
                "longitude",
                "longitude must be between -180 and 180",
            ));
        }

        let viewing_level = match viewing_level.map(str::trim).filter(|s| !s.is_empty()) {
            Some(level) => level.parse()?,
            None => defaults.viewing_level,
        };

        Ok(Self {
            latitude,
            longitude,
            elevation,
            viewing_level,
            evening_start_hour: hour_or(evening_start_hour, defaults.evening_start_hour, "eveningStartHour")?,
            evening_end_hour: hour_or(evening_end_hour, defaults.evening_end_hour, "eveningEndHour")?,
        })
    }
}

fn hour_or(hour: Option<i64>, default: u8, field: &str) -> AstroResult<u8> {
    match hour {
        None => Ok(default),
        Some(h) => u8::try_from(h)
            .ok()
            .filter(|h| *h <= 23)
            .ok_or_else(|| AstroError::invalid(field, format!("{} must be between 0 and 23", field))),
    }
}

fn missing_coordinates() -> AstroError {
    AstroError::invalid(
        "parameters",
        "latitude, longitude, and elevation are required and must be valid numbers",
    )
}

/// Raw query string of `GET /viewing-data`. Values are kept as text so the
/// same struct reads both `key=value` pairs and a JSON-encoded object.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingDataQuery {
    #[serde(default, deserialize_with = "text_or_number")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub elevation: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub viewing_level: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub evening_start_hour: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub evening_end_hour: Option<String>,
}

impl ViewingDataQuery {
    /// Some clients send the whole parameter set as one JSON object key,
    /// e.g. `?{"latitude":47.6,"longitude":-122.3,"elevation":50}`.
    /// Returns that key, still percent-encoded, when the raw query has that shape.
    pub fn json_encoded_key(raw: &str) -> Option<&str> {
        if raw.contains('&') {
            return None;
        }
        let key = raw.split_once('=').map_or(raw, |(key, _)| key);
        let lower = key.to_ascii_lowercase();
        (key.starts_with('{') || lower.starts_with("%7b")).then_some(key)
    }

    pub fn from_json_key(key: &str) -> AstroResult<Self> {
        let malformed = || {
            AstroError::invalid("parameters", "Failed to parse JSON-encoded query parameters")
        };

        let plus_decoded = key.replace('+', " ");
        let decoded = urlencoding::decode(&plus_decoded).map_err(|e| {
            tracing::warn!("Failed to decode JSON-encoded parameters: {}", e);
            malformed()
        })?;
        let query = serde_json::from_str(&decoded).map_err(|e| {
            tracing::warn!("Failed to parse JSON-encoded parameters: {}", e);
            malformed()
        })?;

        tracing::debug!("Detected JSON-encoded parameters");
        Ok(query)
    }

    pub fn into_request(self, defaults: &RequestDefaults) -> AstroResult<ViewingRequest> {
        let coordinate = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .ok_or_else(missing_coordinates)
        };
        let latitude = coordinate(&self.latitude)?;
        let longitude = coordinate(&self.longitude)?;
        let elevation = coordinate(&self.elevation)?;

        ViewingRequest::new(
            latitude,
            longitude,
            elevation,
            self.viewing_level.as_deref(),
            parse_hour(self.evening_start_hour.as_deref(), "eveningStartHour")?,
            parse_hour(self.evening_end_hour.as_deref(), "eveningEndHour")?,
            defaults,
        )
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

fn parse_hour(value: Option<&str>, field: &str) -> AstroResult<Option<i64>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AstroError::invalid(field, format!("{} must be between 0 and 23", field))),
    }
}
