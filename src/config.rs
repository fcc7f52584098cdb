use std::time::Duration;

use sqlx::mysql::MySqlConnectOptions;

pub const DEFAULT_SERVICE_NAME: &str = "userbase";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_PASSWORD: &str = "password";
pub const DEFAULT_DB_NAME: &str = "sample_db";
pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct AppConfig {
    /// Reported by `GET /health`.
    pub service_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

/// Connection settings for the MySQL server backing the user table.
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Upper bound on open connections; further acquirers wait in line.
    pub pool_size: u32,
    /// How long a queued acquirer waits before the query fails.
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            database: DEFAULT_DB_NAME.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl DbConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    /// `host:port/database`, safe to log (no credentials).
    pub fn display_target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}
