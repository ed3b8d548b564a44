use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_EVENING_END_HOUR, DEFAULT_EVENING_START_HOUR, DOTENV_FILE,
};
use crate::error::{AstroError, AstroResult};
use crate::rating::ViewingLevel;
use crate::request::{RequestDefaults, ViewingRequest};
use crate::sources::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub astronomy_api_app_id: Option<String>,

    #[serde(default)]
    pub astronomy_api_app_secret: Option<String>,

    #[serde(default = "default_viewing_level")]
    pub viewing_level: ViewingLevel,

    #[serde(default = "default_evening_start_hour")]
    pub evening_start_hour: u8,

    #[serde(default = "default_evening_end_hour")]
    pub evening_end_hour: u8,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Observer used by the one-shot report
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub elevation: Option<f64>,
}

fn default_viewing_level() -> ViewingLevel {
    ViewingLevel::NakedEye
}

fn default_evening_start_hour() -> u8 {
    DEFAULT_EVENING_START_HOUR
}

fn default_evening_end_hour() -> u8 {
    DEFAULT_EVENING_END_HOUR
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            astronomy_api_app_id: None,
            astronomy_api_app_secret: None,
            viewing_level: default_viewing_level(),
            evening_start_hour: default_evening_start_hour(),
            evening_end_hour: default_evening_end_hour(),
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            latitude: None,
            longitude: None,
            elevation: None,
        }
    }
}

impl AppConfig {
    /// Optional TOML file named by `ASTRONOMY_BUDDY_CONFIG`, then environment overrides.
    /// A `.env` file in the working directory fills in variables the process environment lacks.
    pub fn load() -> AstroResult<Self> {
        let dotenv = Self::env_file_values(Path::new(DOTENV_FILE))?;
        let lookup = |key: &str| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned());

        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// `KEY=value` pairs from a dotenv file; a missing file yields none
    pub fn env_file_values(path: &Path) -> AstroResult<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let invalid =
            |e: dotenvy::Error| AstroError::Configuration(format!("cannot read {}: {}", path.display(), e));

        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(invalid)? {
            let (key, value) = item.map_err(invalid)?;
            values.insert(key, value);
        }
        tracing::debug!("Loaded {} variables from {}", values.len(), path.display());
        Ok(values)
    }

    pub fn from_file(path: &str) -> AstroResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AstroError::Configuration(format!("cannot read {}: {}", path, e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AstroResult<Self> {
        toml::from_str(content).map_err(|e| AstroError::Configuration(e.to_string()))
    }

    /// Applies `KEY=value` overrides from `lookup`; empty values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AstroResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ASTRONOMY_API_APP_ID") {
            self.astronomy_api_app_id = Some(v);
        }
        if let Some(v) = get("ASTRONOMY_API_APP_SECRET") {
            self.astronomy_api_app_secret = Some(v);
        }
        if let Some(v) = get("VIEWING_LEVEL") {
            self.viewing_level = v
                .parse()
                .map_err(|e: AstroError| AstroError::Configuration(format!("VIEWING_LEVEL: {}", e)))?;
        }
        if let Some(v) = get("EVENING_START_HOUR") {
            self.evening_start_hour = parse_env("EVENING_START_HOUR", &v)?;
        }
        if let Some(v) = get("EVENING_END_HOUR") {
            self.evening_end_hour = parse_env("EVENING_END_HOUR", &v)?;
        }
        if let Some(v) = get("HOST") {
            self.host = v;
        }
        if let Some(v) = get("PORT") {
            self.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = get("LATITUDE") {
            self.latitude = Some(parse_env("LATITUDE", &v)?);
        }
        if let Some(v) = get("LONGITUDE") {
            self.longitude = Some(parse_env("LONGITUDE", &v)?);
        }
        if let Some(v) = get("ELEVATION") {
            self.elevation = Some(parse_env("ELEVATION", &v)?);
        }
        Ok(())
    }

    fn validate(&self) -> AstroResult<()> {
        if self.evening_start_hour > 23 || self.evening_end_hour > 23 {
            return Err(AstroError::Configuration(
                "evening hours must be between 0 and 23".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AstroError::Configuration(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// AstronomyAPI credentials; every entry point checks these before going upstream
    pub fn credentials(&self) -> AstroResult<Credentials> {
        match (
            self.astronomy_api_app_id.as_deref().filter(|s| !s.is_empty()),
            self.astronomy_api_app_secret.as_deref().filter(|s| !s.is_empty()),
        ) {
            (Some(app_id), Some(app_secret)) => Ok(Credentials {
                app_id: app_id.to_string(),
                app_secret: app_secret.to_string(),
            }),
            _ => Err(AstroError::Configuration(
                "ASTRONOMY_API_APP_ID and ASTRONOMY_API_APP_SECRET must be set".to_string(),
            )),
        }
    }

    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            viewing_level: self.viewing_level,
            evening_start_hour: self.evening_start_hour,
            evening_end_hour: self.evening_end_hour,
        }
    }

    /// Request for the configured observer, used by the one-shot report
    pub fn default_request(&self) -> AstroResult<ViewingRequest> {
        match (self.latitude, self.longitude, self.elevation) {
            (Some(latitude), Some(longitude), Some(elevation)) => ViewingRequest::new(
                latitude,
                longitude,
                elevation,
                None,
                None,
                None,
                &self.request_defaults(),
            ),
            _ => Err(AstroError::Configuration(
                "LATITUDE, LONGITUDE, and ELEVATION must be set".to_string(),
            )),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> AstroResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AstroError::Configuration(format!("{} has an invalid value: {}", key, value)))
}
