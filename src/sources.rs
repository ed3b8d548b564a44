//! Upstream collaborators: body positions, seeing forecast, reverse geocoding.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{
    ASTRONOMY_API_BASE, NOMINATIM_API_BASE, SEVEN_TIMER_API_BASE, UNKNOWN_LOCATION, USER_AGENT,
};
use crate::error::{AstroError, AstroResult};
use crate::models::{ForecastSample, ReverseGeocodeResponse, SevenTimerResponse};

/// Observer position and instant for a position lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PositionQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
}

#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Raw per-body position table for one instant
    async fn positions(&self, query: &PositionQuery) -> AstroResult<serde_json::Value>;
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Hourly-ish forecast samples indexed by hours after issue
    async fn forecast(&self, latitude: f64, longitude: f64) -> AstroResult<Vec<ForecastSample>>;
}

#[async_trait]
pub trait GeocodingSource: Send + Sync {
    /// Best-effort place name; never fails
    async fn location_name(&self, latitude: f64, longitude: f64) -> String;
}

/// AstronomyAPI account credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
}

/// Shared reqwest client used by all upstream sources
#[derive(Clone)]
pub struct UpstreamClient {
    client: Arc<Client>,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> AstroResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AstroError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Sends the request and deserializes the JSON body
    async fn make_request<T: DeserializeOwned>(&self, request: RequestBuilder) -> AstroResult<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AstroError::UpstreamUnavailable(format!(
                "request failed with status {}: {}",
                status, body
            )));
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

/// AstronomyAPI `bodies/positions`, authenticated with HTTP basic auth
pub struct AstronomyApi {
    http: UpstreamClient,
    credentials: Credentials,
    base_url: String,
}

impl AstronomyApi {
    pub fn new(http: UpstreamClient, credentials: Credentials) -> Self {
        Self {
            http,
            credentials,
            base_url: ASTRONOMY_API_BASE.to_string(),
        }
    }
}

#[async_trait]
impl PositionSource for AstronomyApi {
    async fn positions(&self, query: &PositionQuery) -> AstroResult<serde_json::Value> {
        tracing::debug!("Fetching positions for {} {}", query.date, query.time);

        let url = format!("{}/bodies/positions", self.base_url);
        let request = self
            .http
            .client
            .get(&url)
            .basic_auth(&self.credentials.app_id, Some(&self.credentials.app_secret))
            .query(&[
                ("latitude", query.latitude.to_string()),
                ("longitude", query.longitude.to_string()),
                ("elevation", query.elevation.to_string()),
                ("from_date", query.date.clone()),
                ("to_date", query.date.clone()),
                ("time", query.time.clone()),
            ]);

        self.http.make_request::<serde_json::Value>(request).await
    }
}

/// 7Timer ASTRO product
pub struct SevenTimer {
    http: UpstreamClient,
    base_url: String,
}

impl SevenTimer {
    pub fn new(http: UpstreamClient) -> Self {
        Self {
            http,
            base_url: SEVEN_TIMER_API_BASE.to_string(),
        }
    }
}

#[async_trait]
impl WeatherSource for SevenTimer {
    async fn forecast(&self, latitude: f64, longitude: f64) -> AstroResult<Vec<ForecastSample>> {
        tracing::debug!("Fetching seeing forecast for {}, {}", latitude, longitude);

        let url = format!("{}/astro.php", self.base_url);
        let request = self.http.client.get(&url).query(&[
            ("lon", longitude.to_string()),
            ("lat", latitude.to_string()),
            ("ac", "0".to_string()),
            ("lang", "en".to_string()),
            ("unit", "imperial".to_string()),
            ("output", "json".to_string()),
            ("tzshift", "0".to_string()),
        ]);

        let response = self.http.make_request::<SevenTimerResponse>(request).await?;
        tracing::debug!("Received {} forecast samples", response.dataseries.len());
        Ok(response.dataseries)
    }
}

/// Nominatim reverse geocoding
pub struct Nominatim {
    http: UpstreamClient,
    base_url: String,
}

impl Nominatim {
    pub fn new(http: UpstreamClient) -> Self {
        Self {
            http,
            base_url: NOMINATIM_API_BASE.to_string(),
        }
    }

    async fn lookup(&self, latitude: f64, longitude: f64) -> AstroResult<Option<String>> {
        let url = format!("{}/reverse", self.base_url);
        let request = self.http.client.get(&url).query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "json".to_string()),
        ]);

        let response = self.http.make_request::<ReverseGeocodeResponse>(request).await?;
        Ok(response
            .address
            .as_ref()
            .and_then(|address| address.place_name())
            .map(str::to_string))
    }
}

#[async_trait]
impl GeocodingSource for Nominatim {
    async fn location_name(&self, latitude: f64, longitude: f64) -> String {
        match self.lookup(latitude, longitude).await {
            Ok(Some(name)) => {
                tracing::debug!("Resolved location: {}", name);
                name
            }
            Ok(None) => UNKNOWN_LOCATION.to_string(),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}
