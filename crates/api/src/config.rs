use domain::services::BookingRules;
use persistence::db::DatabaseConfig as PoolConfig;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; an empty list allows any origin (dev posture).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Booking policy and reconciler knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_slot_size")]
    pub slot_size_minutes: i64,

    #[serde(default = "default_no_show_grace")]
    pub no_show_grace_minutes: i64,

    /// Advance horizon for individuals, in days.
    #[serde(default = "default_max_horizon")]
    pub max_horizon_days: i64,

    /// Extended advance horizon for registered clubs, in days.
    #[serde(default = "default_club_horizon")]
    pub club_horizon_days: i64,

    #[serde(default = "default_min_session")]
    pub min_session_minutes: i64,

    #[serde(default = "default_full_day_threshold")]
    pub full_day_threshold_hours: i64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Advisory-lock key guarding the singleton reconciler.
    #[serde(default = "default_cleanup_lock_id")]
    pub cleanup_lock_id: i64,

    /// Closed set of clubs allowed to make club bookings.
    #[serde(default = "default_registered_clubs")]
    pub registered_clubs: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_slot_size() -> i64 {
    30
}
fn default_no_show_grace() -> i64 {
    15
}
fn default_max_horizon() -> i64 {
    7
}
fn default_club_horizon() -> i64 {
    30
}
fn default_min_session() -> i64 {
    30
}
fn default_full_day_threshold() -> i64 {
    8
}
fn default_cleanup_interval() -> u64 {
    60
}
fn default_cleanup_lock_id() -> i64 {
    1001
}
fn default_registered_clubs() -> Vec<String> {
    [
        "Roobooru",
        "Argonaut Rowing",
        "Chess Circle",
        "Drama Guild",
        "Astronomy Society",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FB").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid socket address")
    }
}

impl DatabaseConfig {
    /// The pool-builder view of this section.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

impl BookingConfig {
    /// The policy evaluator's view of this section.
    pub fn rules(&self) -> BookingRules {
        BookingRules {
            slot_size_minutes: self.slot_size_minutes,
            no_show_grace_minutes: self.no_show_grace_minutes,
            max_horizon_days: self.max_horizon_days,
            club_horizon_days: self.club_horizon_days,
            min_session_minutes: self.min_session_minutes,
            full_day_threshold_hours: self.full_day_threshold_hours,
        }
    }

    pub fn is_registered_club(&self, club_name: &str) -> bool {
        self.registered_clubs.iter().any(|c| c == club_name)
    }
}
