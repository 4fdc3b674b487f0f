/// User agent string for HTTP requests
pub const USER_AGENT: &str = "pm25-advisor/0.1.0";

/// OpenWeatherMap current-conditions API base URL
pub const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// City used to pre-populate the index view
pub const DEFAULT_CITY: &str = "Delhi";

/// Unit system requested from the weather provider
pub const DEFAULT_UNITS: &str = "metric";

/// Weather request timeout in seconds
pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 5;

/// JSON regression model artifact loaded at startup
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// SQLite file holding the prediction audit log
pub const DEFAULT_DB_PATH: &str = "predictions.db";

/// Address the HTTP server listens on
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Returned when no advisory exists for a tier label
pub const NO_ADVICE: &str = "No advice available";

/// Tier label used when classification could not be performed
pub const UNKNOWN_TIER: &str = "Unknown";

/// Feature names in the order the regression model was trained on
pub const FEATURE_NAMES: [&str; 8] = [
    "temperature",
    "max_temperature",
    "min_temperature",
    "sea_level_pressure",
    "humidity",
    "visibility_km",
    "wind_speed",
    "max_wind_gust",
];
