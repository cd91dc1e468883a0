use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub market: MarketConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) if !raw.trim().is_empty() => LogFormat::parse(&raw)
                .ok_or(ConfigError::InvalidSetting {
                    name: "APP_LOG_FORMAT",
                    value: raw,
                })?,
            _ if environment == AppEnvironment::Production => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            market: MarketConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Shape of emitted log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Thresholds driving the inclusive-potential recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotentialLimits {
    pub reservation: u32,
    pub lot: u32,
    pub clause: u32,
    pub eco_dependency: u32,
}

impl Default for PotentialLimits {
    fn default() -> Self {
        Self {
            reservation: 20,
            lot: 10,
            clause: 1,
            eco_dependency: 20,
        }
    }
}

/// Business tunables shared by the catalog, search, tender and potential modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    pub potential: PotentialLimits,
    pub stale_draft_days: i64,
    pub super_badge_completion_threshold: u8,
    pub search_page_size: usize,
    pub reminder_days_since_contact_click: i64,
    pub digest_days_since_sent: i64,
    pub digest_top_k: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            potential: PotentialLimits::default(),
            stale_draft_days: 10,
            super_badge_completion_threshold: 80,
            search_page_size: 20,
            reminder_days_since_contact_click: 2,
            digest_days_since_sent: 1,
            digest_top_k: 5,
        }
    }
}

impl MarketConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            potential: PotentialLimits {
                reservation: read_var("LIMIT_RESERVATION", defaults.potential.reservation)?,
                lot: read_var("LIMIT_LOT", defaults.potential.lot)?,
                clause: read_var("LIMIT_CLAUSE", defaults.potential.clause)?,
                eco_dependency: read_var(
                    "LIMIT_ECO_DEPENDENCY",
                    defaults.potential.eco_dependency,
                )?,
            },
            stale_draft_days: read_var("STALE_DRAFT_DAYS", defaults.stale_draft_days)?,
            super_badge_completion_threshold: read_var(
                "SUPER_BADGE_COMPLETION_THRESHOLD",
                defaults.super_badge_completion_threshold,
            )?,
            search_page_size: read_var("SEARCH_PAGE_SIZE", defaults.search_page_size)?,
            reminder_days_since_contact_click: read_var(
                "REMINDER_DAYS_SINCE_CONTACT_CLICK",
                defaults.reminder_days_since_contact_click,
            )?,
            digest_days_since_sent: read_var(
                "DIGEST_DAYS_SINCE_SENT",
                defaults.digest_days_since_sent,
            )?,
            digest_top_k: read_var("DIGEST_TOP_K", defaults.digest_top_k)?,
        })
    }
}

fn read_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidSetting { name, value: raw }),
        _ => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSetting { name, value } => {
                write!(f, "{name} has an invalid value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidSetting { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
