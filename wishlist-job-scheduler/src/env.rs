use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub static CONF: Lazy<Config> = Lazy::new(|| match Config::from_env() {
    Ok(c) => c,
    Err(e) => {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
});

const DB_PATH_VAR: &str = "WISHLIST_DB_PATH";
const DB_MAX_CONNECTIONS_VAR: &str = "WISHLIST_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "WISHLIST_DB_IDLE_TIMEOUT_SECS";
const DB_BUSY_TIMEOUT_MS_VAR: &str = "WISHLIST_DB_BUSY_TIMEOUT_MS";

const RUNNER_UPDATE_FREQUENCY_SECS_VAR: &str = "WISHLIST_RUNNER_UPDATE_FREQUENCY_SECS";
const RUNNER_WORKER_THREADS_VAR: &str = "WISHLIST_RUNNER_WORKER_THREADS";

const CLEAR_EXPIRED_SESSIONS_JOB_FREQUENCY_SECS_VAR: &str =
    "WISHLIST_CLEAR_EXPIRED_SESSIONS_JOB_FREQUENCY_SECS";
const CLEAR_EXPIRED_INVITE_CODES_JOB_FREQUENCY_SECS_VAR: &str =
    "WISHLIST_CLEAR_EXPIRED_INVITE_CODES_JOB_FREQUENCY_SECS";

const LOG_LEVEL_VAR: &str = "WISHLIST_LOG_LEVEL";

pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub db_idle_timeout: Duration,
    pub db_busy_timeout: Duration,

    pub update_frequency: Duration,
    pub worker_threads: usize,

    pub clear_expired_sessions_job_frequency: Duration,
    pub clear_expired_invite_codes_job_frequency: Duration,

    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let worker_threads = env_var_or(RUNNER_WORKER_THREADS_VAR, 1);

        if worker_threads == 0 {
            return Err(ConfigError::InvalidVar(RUNNER_WORKER_THREADS_VAR));
        }

        Ok(Config {
            db_path: env_var_or(DB_PATH_VAR, String::from("./wishlist.db")),
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 4),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),
            db_busy_timeout: Duration::from_millis(env_var_or(DB_BUSY_TIMEOUT_MS_VAR, 5000)),

            update_frequency: Duration::from_secs(env_var_or(
                RUNNER_UPDATE_FREQUENCY_SECS_VAR,
                60,
            )),
            worker_threads,

            clear_expired_sessions_job_frequency: Duration::from_secs(env_var_or(
                CLEAR_EXPIRED_SESSIONS_JOB_FREQUENCY_SECS_VAR,
                3600,
            )),
            clear_expired_invite_codes_job_frequency: Duration::from_secs(env_var_or(
                CLEAR_EXPIRED_INVITE_CODES_JOB_FREQUENCY_SECS_VAR,
                86400,
            )),

            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        })
    }
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    InvalidVar(&'static str),
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
