use std::env;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Settings {
    runtime: RuntimeSettings,
    database: DatabaseSettings,
    exam: ExamSettings,
    admin: AdminSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub database_url: String,
}

#[derive(Debug, Clone)]
pub struct ExamSettings {
    pub time_limit_minutes: u64,
    pub violation_limit: u32,
    pub access_code_length: usize,
    pub access_code_ttl_hours: u64,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub admin_login: String,
    pub admin_password: String,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(env_optional("CHSB_ENV"));

        let database_url = env_or_default("DATABASE_URL", "sqlite://chsb_exam.db");

        let time_limit_minutes =
            parse_u64("EXAM_TIME_LIMIT_MINUTES", env_or_default("EXAM_TIME_LIMIT_MINUTES", "90"))?;
        let violation_limit =
            parse_u32("EXAM_VIOLATION_LIMIT", env_or_default("EXAM_VIOLATION_LIMIT", "3"))?;
        let access_code_length =
            parse_u64("ACCESS_CODE_LENGTH", env_or_default("ACCESS_CODE_LENGTH", "6"))? as usize;
        let access_code_ttl_hours =
            parse_u64("ACCESS_CODE_TTL_HOURS", env_or_default("ACCESS_CODE_TTL_HOURS", "24"))?;
        let tick_interval_ms =
            parse_u64("EXAM_TICK_INTERVAL_MS", env_or_default("EXAM_TICK_INTERVAL_MS", "1000"))?;

        let admin_login = env_or_default("ADMIN_LOGIN", "admin");
        let admin_password = env_or_default("ADMIN_PASSWORD", "admin123");

        let log_level = env_or_default("CHSB_LOG_LEVEL", "info");
        let json = env_optional("CHSB_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        Ok(Self {
            runtime: RuntimeSettings { environment },
            database: DatabaseSettings { database_url },
            exam: ExamSettings {
                time_limit_minutes,
                violation_limit,
                access_code_length,
                access_code_ttl_hours,
                tick_interval_ms,
            },
            admin: AdminSettings { admin_login, admin_password },
            telemetry: TelemetrySettings { log_level, json },
        })
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub fn exam(&self) -> &ExamSettings {
        &self.exam
    }

    pub fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }
}

impl ExamSettings {
    pub fn time_limit(&self) -> time::Duration {
        time::Duration::minutes(self.time_limit_minutes as i64)
    }

    pub fn access_code_ttl(&self) -> time::Duration {
        time::Duration::hours(self.access_code_ttl_hours as i64)
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_environment(raw: Option<String>) -> Environment {
    match raw.as_deref() {
        Some("production") => Environment::Production,
        Some("test") => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u32(field: &'static str, value: String) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue { field, value })
}
