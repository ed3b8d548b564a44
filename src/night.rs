//! Night aggregation: fans out per-hour position lookups, merges them per body,
//! and ranks what is worth pointing at.

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::MAX_NIGHT_HOURS;
use crate::distance::{round_to, LightDistance};
use crate::error::{AstroError, AstroResult};
use crate::models::BodyDistance;
use crate::rating::{RatingTier, ViewingCapabilityProfile, ViewingLevel};
use crate::request::ViewingRequest;
use crate::sources::{GeocodingSource, PositionQuery, PositionSource, WeatherSource};
use crate::targets::{analyze_targets, BodyObservation};
use crate::weather::{interpret_weather_conditions, WeatherOutlook};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Magnitude assumed for bodies the position source reports without one
const UNKNOWN_MAGNITUDE: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObserverLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// One body across the whole evening window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightlyBodySummary {
    pub name: String,
    pub best_rating: RatingTier,
    pub reason: String,
    pub magnitude: Option<f64>,
    pub constellation: String,
    pub peak_altitude: f64,
    pub peak_hour: u8,
    pub peak_azimuth: f64,
    pub peak_direction: &'static str,
    pub visible_hours: usize,
    pub total_hours: usize,
    pub distance: BodyDistance,
    pub light_distance: LightDistance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Targets {
    pub excellent: Vec<NightlyBodySummary>,
    pub good: Vec<NightlyBodySummary>,
    pub fair: Vec<NightlyBodySummary>,
}

impl Targets {
    pub fn len(&self) -> usize {
        self.excellent.len() + self.good.len() + self.fair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightReport {
    pub date: String,
    pub location: ObserverLocation,
    pub viewing_level: ViewingLevel,
    pub viewing_capabilities: &'static ViewingCapabilityProfile,
    pub weather: WeatherOutlook,
    pub targets: Targets,
}

/// Hours to sample, starting at `start` and stepping through midnight to `end` inclusive.
/// Never more than [`MAX_NIGHT_HOURS`], so `start == end` cannot run away.
pub fn evening_hours(start: u8, end: u8) -> Vec<u8> {
    let stop = (end % 24 + 1) % 24;
    let mut hours = Vec::with_capacity(MAX_NIGHT_HOURS);
    let mut current = start % 24;
    for _ in 0..MAX_NIGHT_HOURS {
        hours.push(current);
        current = (current + 1) % 24;
        if current == stop {
            break;
        }
    }
    hours
}

/// `HH:00:00`
pub fn format_time(hour: u8) -> String {
    format!("{:02}:00:00", hour)
}

/// 16-point compass bearing for an azimuth in degrees
pub fn compass_direction(azimuth: f64) -> &'static str {
    let index = (azimuth / 22.5).round().rem_euclid(16.0) as usize;
    COMPASS_POINTS[index % 16]
}

/// Lower is easier to spot. Used to order bodies within a rating tier.
pub fn viewability_score(summary: &NightlyBodySummary) -> f64 {
    let mut score = summary.magnitude.unwrap_or(UNKNOWN_MAGNITUDE);
    score -= (summary.peak_altitude / 10.0).min(5.0);

    score -= match summary.name.to_lowercase().as_str() {
        "moon" => 15.0,
        "saturn" => 3.0,
        "jupiter" => 2.0,
        "mars" => 1.0,
        _ => 0.0,
    };

    score
}

#[derive(Debug, Clone)]
struct HourlySample {
    hour: u8,
    altitude: f64,
    azimuth: f64,
    rating: RatingTier,
    reason: String,
}

#[derive(Debug)]
struct BodyAccumulator {
    name: String,
    magnitude: Option<f64>,
    constellation: String,
    distance: BodyDistance,
    light_distance: LightDistance,
    hourly: Vec<HourlySample>,
}

impl BodyAccumulator {
    fn new(observation: &BodyObservation) -> Self {
        Self {
            name: observation.name.clone(),
            magnitude: observation.magnitude,
            constellation: observation.constellation.clone(),
            distance: observation.distance,
            light_distance: observation.light_distance.clone(),
            hourly: Vec::new(),
        }
    }

    /// `None` when the body never rose or never rated better than `poor`
    fn summarize(self) -> Option<NightlyBodySummary> {
        let visible: Vec<&HourlySample> = self.hourly.iter().filter(|h| h.altitude > 0.0).collect();

        // Strict comparisons keep the earliest hour on ties
        let peak = visible
            .iter()
            .copied()
            .reduce(|best, current| if current.altitude > best.altitude { current } else { best })?;
        let best = visible
            .iter()
            .copied()
            .reduce(|best, current| if current.rating < best.rating { current } else { best })?;

        if !best.rating.is_recommended() {
            return None;
        }

        Some(NightlyBodySummary {
            best_rating: best.rating,
            reason: best.reason.clone(),
            peak_altitude: round_to(peak.altitude, 1),
            peak_hour: peak.hour,
            peak_azimuth: round_to(peak.azimuth, 1),
            peak_direction: compass_direction(peak.azimuth),
            visible_hours: visible.len(),
            total_hours: self.hourly.len(),
            name: self.name,
            magnitude: self.magnitude,
            constellation: self.constellation,
            distance: self.distance,
            light_distance: self.light_distance,
        })
    }
}

/// Merges per-hour observations (already in hour order) into ranked tiers
pub fn summarize_night(hourly: Vec<(u8, Vec<BodyObservation>)>) -> Targets {
    let mut by_name: BTreeMap<String, BodyAccumulator> = BTreeMap::new();

    for (hour, observations) in hourly {
        for observation in observations {
            let entry = by_name
                .entry(observation.name.clone())
                .or_insert_with(|| BodyAccumulator::new(&observation));
            entry.hourly.push(HourlySample {
                hour,
                altitude: observation.altitude,
                azimuth: observation.azimuth,
                rating: observation.rating,
                reason: observation.reason,
            });
        }
    }

    tracing::info!("Tracked {} unique celestial bodies", by_name.len());

    let mut summaries: Vec<NightlyBodySummary> = by_name
        .into_values()
        .filter_map(BodyAccumulator::summarize)
        .collect();

    summaries.sort_by(|a, b| {
        a.best_rating
            .cmp(&b.best_rating)
            .then_with(|| viewability_score(a).total_cmp(&viewability_score(b)))
    });

    let mut targets = Targets::default();
    for summary in summaries {
        match summary.best_rating {
            RatingTier::Excellent => targets.excellent.push(summary),
            RatingTier::Good => targets.good.push(summary),
            RatingTier::Fair => targets.fair.push(summary),
            _ => {}
        }
    }
    targets
}

/// Builds night reports from the three upstream sources
#[derive(Clone)]
pub struct ViewingPlanner {
    positions: Arc<dyn PositionSource>,
    weather: Arc<dyn WeatherSource>,
    geocoder: Arc<dyn GeocodingSource>,
    upstream_timeout: Duration,
}

impl ViewingPlanner {
    pub fn new(
        positions: Arc<dyn PositionSource>,
        weather: Arc<dyn WeatherSource>,
        geocoder: Arc<dyn GeocodingSource>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            positions,
            weather,
            geocoder,
            upstream_timeout,
        }
    }

    /// Report for tonight (today's UTC date)
    pub async fn get_viewing_data(&self, request: &ViewingRequest) -> NightReport {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        self.get_viewing_data_on(&date, request).await
    }

    /// Report for the given `YYYY-MM-DD` date. Upstream failures degrade the
    /// report instead of failing it.
    pub async fn get_viewing_data_on(&self, date: &str, request: &ViewingRequest) -> NightReport {
        tracing::info!(
            "Starting analysis for lat={}, lon={}, elevation={}, level={}, hours {}:00-{}:00, date {}",
            request.latitude,
            request.longitude,
            request.elevation,
            request.viewing_level,
            request.evening_start_hour,
            request.evening_end_hour,
            date
        );

        let hours = evening_hours(request.evening_start_hour, request.evening_end_hour);
        tracing::info!("Analyzing {} hours: {:?}", hours.len(), hours);

        let (location_name, weather, hourly) = tokio::join!(
            self.geocoder.location_name(request.latitude, request.longitude),
            self.weather_outlook(request),
            self.hourly_observations(date, &hours, request),
        );

        let targets = summarize_night(hourly);
        tracing::info!(
            "Results: {} excellent, {} good, {} fair targets",
            targets.excellent.len(),
            targets.good.len(),
            targets.fair.len()
        );

        NightReport {
            date: date.to_string(),
            location: ObserverLocation {
                name: location_name,
                latitude: request.latitude,
                longitude: request.longitude,
                elevation: request.elevation,
            },
            viewing_level: request.viewing_level,
            viewing_capabilities: request.viewing_level.capabilities(),
            weather,
            targets,
        }
    }

    async fn weather_outlook(&self, request: &ViewingRequest) -> WeatherOutlook {
        let forecast = self
            .with_timeout(self.weather.forecast(request.latitude, request.longitude))
            .await;

        match forecast {
            Ok(series) => interpret_weather_conditions(
                &series,
                request.evening_start_hour,
                request.evening_end_hour,
            )
            .map_or(WeatherOutlook::NoData, WeatherOutlook::Forecast),
            Err(e) => {
                tracing::warn!("Weather data error: {}", e);
                WeatherOutlook::unavailable(e.to_string())
            }
        }
    }

    /// One lookup per hour, issued together. Failed hours are logged and
    /// dropped; the rest come back in `hours` order.
    async fn hourly_observations(
        &self,
        date: &str,
        hours: &[u8],
        request: &ViewingRequest,
    ) -> Vec<(u8, Vec<BodyObservation>)> {
        let lookups = hours.iter().map(|&hour| async move {
            let query = PositionQuery {
                latitude: request.latitude,
                longitude: request.longitude,
                elevation: request.elevation,
                date: date.to_string(),
                time: format_time(hour),
            };
            let result = self
                .with_timeout(self.positions.positions(&query))
                .await
                .and_then(|raw| analyze_targets(&raw, request.viewing_level));
            (hour, query.time, result)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(hour, time, result)| match result {
                Ok(observations) => {
                    tracing::debug!("Found {} celestial bodies for {}", observations.len(), time);
                    Some((hour, observations))
                }
                Err(e) => {
                    tracing::warn!("Error fetching data for {}: {}", time, e);
                    None
                }
            })
            .collect()
    }

    async fn with_timeout<T>(
        &self,
        call: impl std::future::Future<Output = AstroResult<T>>,
    ) -> AstroResult<T> {
        tokio::time::timeout(self.upstream_timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(AstroError::UpstreamUnavailable(format!(
                    "no response within {:?}",
                    self.upstream_timeout
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastSample;
    use crate::targets::fixtures::{body_row, position_table};
    use crate::weather::QualityTier;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;

    /// Serves a fixed table per `HH:00:00`; hours without a table fail
    struct FakePositions {
        tables: HashMap<String, Value>,
        delay_hour: Option<(String, Duration)>,
    }

    impl FakePositions {
        fn new(tables: Vec<(u8, Value)>) -> Self {
            Self {
                tables: tables
                    .into_iter()
                    .map(|(hour, table)| (format_time(hour), table))
                    .collect(),
                delay_hour: None,
            }
        }
    }

    #[async_trait]
    impl PositionSource for FakePositions {
        async fn positions(&self, query: &PositionQuery) -> AstroResult<Value> {
            if let Some((time, delay)) = &self.delay_hour {
                if *time == query.time {
                    tokio::time::sleep(*delay).await;
                }
            }
            self.tables
                .get(&query.time)
                .cloned()
                .ok_or_else(|| AstroError::UpstreamUnavailable(format!("no table for {}", query.time)))
        }
    }

    struct FakeWeather(Option<Vec<ForecastSample>>);

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn forecast(&self, _latitude: f64, _longitude: f64) -> AstroResult<Vec<ForecastSample>> {
            self.0
                .clone()
                .ok_or_else(|| AstroError::UpstreamUnavailable("status 503".to_string()))
        }
    }

    struct FakeGeocoder;

    #[async_trait]
    impl GeocodingSource for FakeGeocoder {
        async fn location_name(&self, _latitude: f64, _longitude: f64) -> String {
            "Seattle".to_string()
        }
    }

    fn clear_night() -> Vec<ForecastSample> {
        [21, 24]
            .into_iter()
            .map(|timepoint| ForecastSample {
                timepoint,
                cloudcover: 1,
                seeing: 7,
                transparency: 7,
                prec_type: "none".to_string(),
            })
            .collect()
    }

    fn planner(positions: FakePositions, weather: FakeWeather) -> ViewingPlanner {
        ViewingPlanner::new(
            Arc::new(positions),
            Arc::new(weather),
            Arc::new(FakeGeocoder),
            Duration::from_millis(500),
        )
    }

    fn request(level: ViewingLevel, start: u8, end: u8) -> ViewingRequest {
        ViewingRequest {
            latitude: 47.6,
            longitude: -122.3,
            elevation: 50.0,
            viewing_level: level,
            evening_start_hour: start,
            evening_end_hour: end,
        }
    }

    fn observation(name: &str, altitude: f64, azimuth: f64, magnitude: Option<f64>) -> BodyObservation {
        let rating = crate::rating::rate_body(
            altitude,
            magnitude,
            ViewingLevel::NakedEye.capabilities(),
            true,
        );
        BodyObservation {
            name: name.to_string(),
            altitude,
            azimuth,
            magnitude,
            constellation: "Leo".to_string(),
            distance: BodyDistance { au: 1.0, km: 149_597_870.7 },
            light_distance: crate::distance::convert_to_light_distance(149_597_870.7),
            rating: rating.rating,
            reason: rating.reason,
        }
    }

    #[test]
    fn test_evening_hours_wrap_midnight() {
        assert_eq!(evening_hours(21, 2), vec![21, 22, 23, 0, 1, 2]);
        assert_eq!(evening_hours(18, 22), vec![18, 19, 20, 21, 22]);
        assert_eq!(evening_hours(5, 5), vec![5]);
    }

    #[test]
    fn test_evening_hours_capped() {
        // 10 -> 9 would be 24 hours
        let hours = evening_hours(10, 9);
        assert_eq!(hours.len(), MAX_NIGHT_HOURS);
        assert_eq!(hours[0], 10);
        assert_eq!(hours[12], 22);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(21), "21:00:00");
    }

    #[test]
    fn test_compass_direction() {
        assert_eq!(compass_direction(0.0), "N");
        assert_eq!(compass_direction(11.2), "N");
        assert_eq!(compass_direction(11.25), "NNE");
        assert_eq!(compass_direction(90.0), "E");
        assert_eq!(compass_direction(200.0), "SSW");
        assert_eq!(compass_direction(355.0), "N");
    }

    #[test]
    fn test_peak_and_best_rating_keep_earliest_hour() {
        let hourly = vec![
            (21, vec![observation("Jupiter", 40.0, 100.0, Some(-2.5))]),
            (22, vec![observation("Jupiter", 55.0, 120.0, Some(-2.5))]),
            (23, vec![observation("Jupiter", 55.0, 140.0, Some(-2.5))]),
            (0, vec![observation("Jupiter", 48.0, 160.0, Some(-2.5))]),
        ];
        let targets = summarize_night(hourly);
        assert_eq!(targets.excellent.len(), 1);

        let jupiter = &targets.excellent[0];
        assert_eq!(jupiter.peak_hour, 22);
        assert_eq!(jupiter.peak_altitude, 55.0);
        assert_eq!(jupiter.peak_azimuth, 120.0);
        assert_eq!(jupiter.peak_direction, "ESE");
        assert_eq!(jupiter.visible_hours, 4);
        assert_eq!(jupiter.total_hours, 4);
        assert_eq!(jupiter.best_rating, RatingTier::Excellent);
    }

    #[test]
    fn test_bodies_never_rated_fair_are_dropped() {
        let hourly = vec![
            (
                21,
                vec![
                    observation("Neptune", 50.0, 90.0, Some(7.8)),
                    observation("Venus", -10.0, 270.0, Some(-4.0)),
                    observation("Mercury", 12.0, 250.0, Some(0.1)),
                ],
            ),
            (22, vec![observation("Mercury", 5.0, 255.0, Some(0.1))]),
        ];
        let targets = summarize_night(hourly);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_visible_hours_exclude_horizon() {
        let hourly = vec![
            (21, vec![observation("Mars", 0.0, 90.0, Some(1.0))]),
            (22, vec![observation("Mars", 25.0, 100.0, Some(1.0))]),
            (23, vec![observation("Mars", -3.0, 110.0, Some(1.0))]),
        ];
        let targets = summarize_night(hourly);
        let mars = &targets.fair[0];
        assert_eq!(mars.visible_hours, 1);
        assert_eq!(mars.total_hours, 3);
        assert_eq!(mars.reason, "Viewable but lower in sky");
    }

    #[test]
    fn test_viewability_orders_within_tier() {
        let hourly = vec![(
            21,
            vec![
                observation("Vega", 60.0, 300.0, Some(0.0)),
                observation("Saturn", 60.0, 180.0, Some(0.8)),
                observation("Mystery", 60.0, 10.0, None),
                observation("Moon", 50.0, 120.0, Some(-10.0)),
            ],
        )];
        let targets = summarize_night(hourly);
        let names: Vec<&str> = targets.excellent.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Moon", "Saturn", "Vega", "Mystery"]);
        assert!(viewability_score(&targets.excellent[0]) <= -20.0);
    }

    #[test]
    fn test_tier_beats_viewability() {
        let hourly = vec![(
            21,
            vec![
                observation("Moon", 35.0, 120.0, Some(-10.0)),
                observation("Deneb", 70.0, 20.0, Some(1.3)),
            ],
        )];
        let targets = summarize_night(hourly);
        assert_eq!(targets.excellent[0].name, "Deneb");
        assert_eq!(targets.good[0].name, "Moon");
    }

    #[tokio::test]
    async fn test_moon_leads_excellent_targets() {
        let positions = FakePositions::new(vec![(
            21,
            position_table(vec![
                body_row("sun", "Sun", -30.0, 300.0, Some(-26.7), 149_600_000.0),
                body_row("earth", "Earth", 0.0, 0.0, None, 0.0),
                body_row("jupiter", "Jupiter", 60.0, 140.0, Some(-2.5), 750_000_000.0),
                body_row("moon", "Moon", 50.0, 180.0, Some(-10.0), 384_400.0),
            ]),
        )]);
        let planner = planner(positions, FakeWeather(Some(clear_night())));

        let report = planner
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 21, 21))
            .await;

        assert_eq!(report.date, "2026-10-17");
        assert_eq!(report.location.name, "Seattle");
        assert_eq!(report.viewing_capabilities.max_magnitude, 6.0);
        let names: Vec<&str> = report.targets.excellent.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Moon", "Jupiter"]);
        assert_eq!(report.targets.excellent[0].peak_direction, "S");
        match report.weather {
            WeatherOutlook::Forecast(verdict) => assert_eq!(verdict.quality, QualityTier::Excellent),
            other => panic!("expected a forecast, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_hour_does_not_sink_the_night() {
        // 23:00 has no table and fails; 00:00 and 01:00 succeed
        let positions = FakePositions::new(vec![
            (0, position_table(vec![body_row("mars", "Mars", 35.0, 150.0, Some(0.9), 1.0e8)])),
            (1, position_table(vec![body_row("mars", "Mars", 42.0, 170.0, Some(0.9), 1.0e8)])),
        ]);
        let planner = planner(positions, FakeWeather(Some(clear_night())));

        let report = planner
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 23, 1))
            .await;

        assert_eq!(report.targets.good.len(), 1);
        let mars = &report.targets.good[0];
        assert_eq!(mars.peak_hour, 1);
        assert_eq!(mars.total_hours, 2);
    }

    #[tokio::test]
    async fn test_malformed_hour_is_skipped() {
        let positions = FakePositions::new(vec![
            (21, serde_json::json!({ "unexpected": true })),
            (22, position_table(vec![body_row("saturn", "Saturn", 31.0, 200.0, Some(0.6), 1.3e9)])),
        ]);
        let planner = planner(positions, FakeWeather(Some(clear_night())));

        let report = planner
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 21, 22))
            .await;
        assert_eq!(report.targets.good[0].name, "Saturn");
        assert_eq!(report.targets.good[0].total_hours, 1);
    }

    #[tokio::test]
    async fn test_slow_hour_times_out() {
        let mut positions = FakePositions::new(vec![
            (21, position_table(vec![body_row("vega", "Vega", 70.0, 280.0, Some(0.0), 2.4e14)])),
            (22, position_table(vec![body_row("vega", "Vega", 65.0, 290.0, Some(0.0), 2.4e14)])),
        ]);
        positions.delay_hour = Some((format_time(22), Duration::from_secs(5)));
        let planner = planner(positions, FakeWeather(Some(clear_night())));

        let report = planner
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 21, 22))
            .await;
        let vega = &report.targets.excellent[0];
        assert_eq!(vega.total_hours, 1);
        assert_eq!(vega.peak_hour, 21);
    }

    #[tokio::test]
    async fn test_late_first_hour_still_wins_ties() {
        let mut positions = FakePositions::new(vec![
            (21, position_table(vec![body_row("jupiter", "Jupiter", 50.0, 100.0, Some(-2.0), 6.3e8)])),
            (22, position_table(vec![body_row("jupiter", "Jupiter", 50.0, 200.0, Some(-2.0), 6.3e8)])),
        ]);
        // 21:00 completes after 22:00 but inside the timeout
        positions.delay_hour = Some((format_time(21), Duration::from_millis(200)));
        let planner = planner(positions, FakeWeather(Some(clear_night())));

        let report = planner
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 21, 22))
            .await;
        let jupiter = &report.targets.excellent[0];
        assert_eq!(jupiter.total_hours, 2);
        assert_eq!(jupiter.peak_hour, 21);
        assert_eq!(jupiter.peak_azimuth, 100.0);
        assert_eq!(jupiter.peak_direction, "E");
    }

    #[tokio::test]
    async fn test_weather_outage_becomes_placeholder() {
        let positions = FakePositions::new(vec![(
            21,
            position_table(vec![body_row("moon", "Moon", 50.0, 180.0, Some(-10.0), 384_400.0)]),
        )]);
        let planner = planner(positions, FakeWeather(None));

        let report = planner
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 21, 21))
            .await;

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["weather"]["error"], "Weather data unavailable");
        assert!(json["weather"]["message"].as_str().unwrap().contains("503"));
        assert_eq!(json["targets"]["excellent"][0]["name"], "Moon");
    }

    #[tokio::test]
    async fn test_weather_without_window_samples_is_null() {
        let positions = FakePositions::new(vec![]);
        let planner = planner(positions, FakeWeather(Some(clear_night())));

        let report = planner
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 3, 5))
            .await;
        assert_eq!(report.weather, WeatherOutlook::NoData);
        assert!(report.targets.is_empty());
    }

    #[tokio::test]
    async fn test_replay_is_deterministic() {
        let tables = || {
            vec![
                (
                    21,
                    position_table(vec![
                        body_row("altair", "Altair", 50.0, 200.0, Some(0.8), 1.6e14),
                        body_row("vega", "Vega", 50.0, 280.0, Some(0.8), 2.4e14),
                        body_row("deneb", "Deneb", 50.0, 300.0, Some(0.8), 2.5e16),
                    ]),
                ),
                (
                    22,
                    position_table(vec![
                        body_row("vega", "Vega", 45.0, 285.0, Some(0.8), 2.4e14),
                        body_row("altair", "Altair", 40.0, 210.0, Some(0.8), 1.6e14),
                    ]),
                ),
            ]
        };

        let first = planner(FakePositions::new(tables()), FakeWeather(Some(clear_night())))
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 21, 22))
            .await;
        let second = planner(FakePositions::new(tables()), FakeWeather(Some(clear_night())))
            .get_viewing_data_on("2026-10-17", &request(ViewingLevel::NakedEye, 21, 22))
            .await;

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_report_json_shape() {
        let targets = summarize_night(vec![(21, vec![observation("Moon", 50.0, 180.0, Some(-10.0))])]);
        let json = serde_json::to_value(&targets).unwrap();
        let moon = &json["excellent"][0];
        assert_eq!(moon["bestRating"], "excellent");
        assert_eq!(moon["peakDirection"], "S");
        assert_eq!(moon["visibleHours"], 1);
        assert_eq!(moon["lightDistance"]["unit"], "light-minutes");
        assert_eq!(moon["distance"]["au"], 1.0);
    }
}
