use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Background order lifecycle sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// awaiting_payment orders older than this are cancelled
    #[serde(default = "default_pending_payment_timeout_secs")]
    pub pending_payment_timeout_secs: i64,
    /// shipped orders untouched for this long are confirmed
    #[serde(default = "default_shipped_confirm_timeout_secs")]
    pub shipped_confirm_timeout_secs: i64,
    /// Actor recorded on sweeper transitions. Falls back to the first active super admin.
    #[serde(default)]
    pub system_actor_id: Option<i64>,
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    60
}

fn default_pending_payment_timeout_secs() -> i64 {
    3600
}

fn default_shipped_confirm_timeout_secs() -> i64 {
    7 * 24 * 3600
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            pending_payment_timeout_secs: default_pending_payment_timeout_secs(),
            shipped_confirm_timeout_secs: default_shipped_confirm_timeout_secs(),
            system_actor_id: None,
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8000u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                    },
                    sweeper: SweeperConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }

        // Sweeper
        if let Ok(v) = env::var("SWEEPER_ENABLED")
            && let Ok(b) = v.parse()
        {
            self.sweeper.enabled = b;
        }
        if let Ok(v) = env::var("SWEEPER_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.sweeper.interval_secs = n;
        }
        if let Ok(v) = env::var("SWEEPER_PENDING_PAYMENT_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            self.sweeper.pending_payment_timeout_secs = n;
        }
        if let Ok(v) = env::var("SWEEPER_SHIPPED_CONFIRM_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            self.sweeper.shipped_confirm_timeout_secs = n;
        }
        if let Ok(v) = env::var("SWEEPER_SYSTEM_ACTOR_ID")
            && let Ok(id) = v.parse()
        {
            self.sweeper.system_actor_id = Some(id);
        }
    }
}
