use serde::Serialize;

use crate::constants::EXCLUDED_BODY_IDS;
use crate::distance::{convert_to_light_distance, LightDistance};
use crate::error::{AstroError, AstroResult};
use crate::models::{BodyDistance, PositionResponse};
use crate::rating::{rate_body, RatingTier, ViewingLevel};

/// One body at one hour, rated for the active viewing level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyObservation {
    pub name: String,
    pub altitude: f64,
    pub azimuth: f64,
    pub magnitude: Option<f64>,
    pub constellation: String,
    pub distance: BodyDistance,
    pub light_distance: LightDistance,
    pub rating: RatingTier,
    pub reason: String,
}

/// Turns one hour's raw position table into rated observations.
///
/// Sun and Earth rows are skipped. A payload that does not match the
/// position table layout is an [`AstroError::UpstreamData`].
pub fn analyze_targets(
    raw: &serde_json::Value,
    level: ViewingLevel,
) -> AstroResult<Vec<BodyObservation>> {
    let response = PositionResponse::deserialize_from(raw)?;
    let profile = level.capabilities();

    let mut observations = Vec::with_capacity(response.data.table.rows.len());
    for row in response.data.table.rows {
        let cell = row.cells.into_iter().next().ok_or_else(|| {
            AstroError::UpstreamData("position row without cells".to_string())
        })?;
        if EXCLUDED_BODY_IDS.contains(&cell.id.to_lowercase().as_str()) {
            continue;
        }

        let altitude = cell.position.horizontal.altitude.degrees;
        let magnitude = cell.extra_info.magnitude;
        let rating = rate_body(altitude, magnitude, profile, level.is_naked_eye());

        observations.push(BodyObservation {
            name: cell.name,
            altitude,
            azimuth: cell.position.horizontal.azimuth.degrees,
            magnitude,
            constellation: cell.position.constellation.name,
            distance: cell.distance.from_earth,
            light_distance: convert_to_light_distance(cell.distance.from_earth.km),
            rating: rating.rating,
            reason: rating.reason,
        });
    }

    Ok(observations)
}

impl PositionResponse {
    fn deserialize_from(raw: &serde_json::Value) -> AstroResult<Self> {
        serde_json::from_value(raw.clone())
            .map_err(|e| AstroError::UpstreamData(format!("malformed position table: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// One AstronomyAPI row. Numbers are sent as strings, like the real service does.
    pub fn body_row(id: &str, name: &str, altitude: f64, azimuth: f64, magnitude: Option<f64>, km: f64) -> Value {
        json!({
            "entry": { "id": id, "name": name },
            "cells": [{
                "date": "2026-10-17T21:00:00.000Z",
                "id": id,
                "name": name,
                "distance": {
                    "fromEarth": { "au": (km / 149_597_870.7).to_string(), "km": km.to_string() }
                },
                "position": {
                    "horizontal": {
                        "altitude": { "degrees": altitude.to_string(), "string": "" },
                        "azimuth": { "degrees": azimuth.to_string(), "string": "" }
                    },
                    "equatorial": {},
                    "constellation": { "id": "leo", "short": "Leo", "name": "Leo" }
                },
                "extraInfo": { "elongation": 10.0, "magnitude": magnitude }
            }]
        })
    }

    pub fn position_table(rows: Vec<Value>) -> Value {
        json!({ "data": { "dates": {}, "observer": {}, "table": { "header": [], "rows": rows } } })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{body_row, position_table};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sun_and_earth_are_skipped() {
        let raw = position_table(vec![
            body_row("sun", "Sun", 10.0, 90.0, Some(-26.7), 149_600_000.0),
            body_row("earth", "Earth", 0.0, 0.0, None, 0.0),
            body_row("moon", "Moon", 50.0, 180.0, Some(-10.0), 384_400.0),
        ]);
        let observations = analyze_targets(&raw, ViewingLevel::NakedEye).unwrap();
        assert_eq!(observations.len(), 1);

        let moon = &observations[0];
        assert_eq!(moon.name, "Moon");
        assert_eq!(moon.altitude, 50.0);
        assert_eq!(moon.azimuth, 180.0);
        assert_eq!(moon.constellation, "Leo");
        assert_eq!(moon.rating, RatingTier::Excellent);
        assert_eq!(moon.reason, "High in sky, minimal atmospheric interference, very bright");
        assert_eq!(moon.light_distance.string, "1.28 light seconds away");
    }

    #[test]
    fn test_level_changes_rating() {
        let raw = position_table(vec![body_row("uranus", "Uranus", 40.0, 100.0, Some(5.7), 2.8e9)]);

        let naked = analyze_targets(&raw, ViewingLevel::NakedEye).unwrap();
        assert_eq!(naked[0].rating, RatingTier::Good);

        let faint = position_table(vec![body_row("neptune", "Neptune", 40.0, 100.0, Some(7.8), 4.3e9)]);
        let naked = analyze_targets(&faint, ViewingLevel::NakedEye).unwrap();
        assert_eq!(naked[0].rating, RatingTier::TooFaint);
        let entry = analyze_targets(&faint, ViewingLevel::Entry).unwrap();
        assert_eq!(entry[0].rating, RatingTier::Good);
    }

    #[test]
    fn test_malformed_table_is_upstream_data_error() {
        let err = analyze_targets(&json!({ "data": { "rows": [] } }), ViewingLevel::NakedEye).unwrap_err();
        assert!(matches!(err, AstroError::UpstreamData(_)));

        let err = analyze_targets(&position_table(vec![json!({ "cells": [] })]), ViewingLevel::NakedEye)
            .unwrap_err();
        assert!(matches!(err, AstroError::UpstreamData(_)));
    }

    #[test]
    fn test_empty_table_is_fine() {
        let observations = analyze_targets(&position_table(vec![]), ViewingLevel::Advanced).unwrap();
        assert!(observations.is_empty());
    }
}
