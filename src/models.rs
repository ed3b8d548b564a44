use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// AstronomyAPI Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PositionResponse {
    pub data: PositionData,
}

#[derive(Debug, Deserialize)]
pub struct PositionData {
    pub table: PositionTable,
}

#[derive(Debug, Deserialize)]
pub struct PositionTable {
    pub rows: Vec<PositionRow>,
}

#[derive(Debug, Deserialize)]
pub struct PositionRow {
    pub cells: Vec<BodyCell>,
}

#[derive(Debug, Deserialize)]
pub struct BodyCell {
    pub id: String,
    pub name: String,
    pub distance: BodyCellDistance,
    pub position: BodyPosition,
    #[serde(rename = "extraInfo")]
    pub extra_info: ExtraInfo,
}

#[derive(Debug, Deserialize)]
pub struct BodyCellDistance {
    #[serde(rename = "fromEarth")]
    pub from_earth: BodyDistance,
}

/// Distance from Earth as reported upstream
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BodyDistance {
    #[serde(deserialize_with = "lenient_f64")]
    pub au: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub km: f64,
}

#[derive(Debug, Deserialize)]
pub struct BodyPosition {
    pub horizontal: HorizontalPosition,
    pub constellation: Constellation,
}

#[derive(Debug, Deserialize)]
pub struct HorizontalPosition {
    pub altitude: Angle,
    pub azimuth: Angle,
}

#[derive(Debug, Deserialize)]
pub struct Angle {
    #[serde(deserialize_with = "lenient_f64")]
    pub degrees: f64,
}

#[derive(Debug, Deserialize)]
pub struct Constellation {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtraInfo {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub magnitude: Option<f64>,
}

// ============================================================================
// 7Timer ASTRO Models
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SevenTimerResponse {
    pub dataseries: Vec<ForecastSample>,
}

/// One forecast sample; `timepoint` is hours after the forecast was issued
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastSample {
    pub timepoint: u32,
    pub cloudcover: u8,
    pub seeing: u8,
    pub transparency: u8,
    #[serde(default)]
    pub prec_type: String,
}

impl ForecastSample {
    pub fn has_precipitation(&self) -> bool {
        self.prec_type == "rain" || self.prec_type == "snow"
    }
}

// ============================================================================
// Nominatim Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
}

impl Address {
    /// Most specific populated place name
    pub fn place_name(&self) -> Option<&str> {
        [&self.city, &self.town, &self.village, &self.county]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !name.is_empty())
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetViewingPlanRequest {
    /// Observer latitude in degrees, -90 to 90
    pub latitude: f64,
    /// Observer longitude in degrees, -180 to 180
    pub longitude: f64,
    /// Observer elevation in metres
    pub elevation: f64,
    /// naked-eye, entry, intermediate or advanced
    pub viewing_level: Option<String>,
    /// First evening hour, 0-23
    pub evening_start_hour: Option<i64>,
    /// Last evening hour, 0-23
    pub evening_end_hour: Option<i64>,
}

// ============================================================================
// Lenient numbers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("expected a number, got {:?}", s))),
        }
    }
}

/// AstronomyAPI sends most numbers as strings
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_f64()
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_f64)
        .transpose()
}
