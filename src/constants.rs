/// User agent string for HTTP requests
pub const USER_AGENT: &str = "astronomy-buddy/0.1.0";

/// AstronomyAPI base URL (body positions)
pub const ASTRONOMY_API_BASE: &str = "https://api.astronomyapi.com/api/v2";

/// 7Timer base URL (ASTRO seeing forecast)
pub const SEVEN_TIMER_API_BASE: &str = "https://www.7timer.info/bin";

/// Nominatim base URL (reverse geocoding)
pub const NOMINATIM_API_BASE: &str = "https://nominatim.openstreetmap.org";

/// Place name reported when reverse geocoding yields nothing
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Speed of light in km/s
pub const LIGHT_SPEED_KM_S: f64 = 299_792.458;

/// Default evening window, wall-clock hours
pub const DEFAULT_EVENING_START_HOUR: u8 = 21;
pub const DEFAULT_EVENING_END_HOUR: u8 = 2;

/// Upper bound on hours analysed per night; stops an equal start/end window from spinning
pub const MAX_NIGHT_HOURS: usize = 13;

/// Body ids skipped by the hourly analyzer
pub const EXCLUDED_BODY_IDS: [&str; 2] = ["sun", "earth"];

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "ASTRONOMY_BUDDY_CONFIG";
pub const DOTENV_FILE: &str = ".env";
