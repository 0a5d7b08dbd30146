use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use once_cell::sync::Lazy;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;
use zeroize::{Zeroize, Zeroizing};

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

const HASHING_KEY_VAR: &str = "WISHLIST_HASHING_KEY_B64";
#[cfg_attr(test, allow(dead_code))]
const ADMIN_KEY_VAR: &str = "WISHLIST_ADMIN_KEY";

const HASH_LENGTH_VAR: &str = "WISHLIST_HASH_LENGTH";
const HASH_ITERATIONS_VAR: &str = "WISHLIST_HASH_ITERATIONS";
const HASH_MEM_COST_KIB_VAR: &str = "WISHLIST_HASH_MEM_COST_KIB";
const HASH_THREADS_VAR: &str = "WISHLIST_HASH_THREADS";
const HASH_SALT_LENGTH_VAR: &str = "WISHLIST_HASH_SALT_LENGTH";

const SESSION_LIFETIME_DAYS_VAR: &str = "WISHLIST_SESSION_LIFETIME_DAYS";
const INVITE_CODE_LIFETIME_DAYS_VAR: &str = "WISHLIST_INVITE_CODE_LIFETIME_DAYS";

const ACTIX_WORKER_COUNT_VAR: &str = "WISHLIST_ACTIX_WORKER_COUNT";
const SHUTDOWN_TIMEOUT_SECS_VAR: &str = "WISHLIST_SHUTDOWN_TIMEOUT_SECS";

const LOG_LEVEL_VAR: &str = "WISHLIST_LOG_LEVEL";

const HASHING_KEY_SIZE: usize = 32;

#[cfg(test)]
pub const TEST_ADMIN_KEY: &str = "test-admin-key-7c1d9e";

#[derive(Zeroize)]
pub struct ConfigInner {
    #[zeroize(skip)]
    pub db_path: String,
    #[zeroize(skip)]
    pub db_max_connections: u32,
    #[zeroize(skip)]
    pub db_idle_timeout: Duration,
    #[zeroize(skip)]
    pub db_busy_timeout: Duration,

    pub hashing_key: [u8; HASHING_KEY_SIZE],
    pub admin_key: Option<String>,

    pub hash_length: u32,
    pub hash_iterations: u32,
    pub hash_mem_cost_kib: u32,
    pub hash_threads: u32,
    pub hash_salt_length: u32,

    #[zeroize(skip)]
    pub session_lifetime: Duration,
    #[zeroize(skip)]
    pub invite_code_lifetime: Duration,

    #[zeroize(skip)]
    pub actix_worker_count: usize,
    #[zeroize(skip)]
    pub shutdown_timeout: Duration,

    #[zeroize(skip)]
    pub log_level: String,
}

pub struct Config {
    inner: UnsafeCell<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        // Safe as long as `unsafe Config::zeroize()` hasn't been called
        unsafe { &*self.inner.get() }
    }
}

// Safe to be shared across threads as long as `unsafe Config::zeroize()` hasn't been called
unsafe impl Sync for Config {}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let hashing_key = if cfg!(test) {
            [7u8; HASHING_KEY_SIZE]
        } else {
            let decoded = Zeroizing::new(
                b64.decode(env_var::<String>(HASHING_KEY_VAR)?.as_bytes())
                    .map_err(|_| ConfigError::InvalidVar(HASHING_KEY_VAR))?,
            );

            if decoded.len() < HASHING_KEY_SIZE {
                return Err(ConfigError::InvalidVar(HASHING_KEY_VAR));
            }

            decoded[..HASHING_KEY_SIZE]
                .try_into()
                .map_err(|_| ConfigError::InvalidVar(HASHING_KEY_VAR))?
        };

        #[cfg(test)]
        let admin_key = Some(String::from(TEST_ADMIN_KEY));
        #[cfg(not(test))]
        let admin_key = std::env::var(ADMIN_KEY_VAR).ok().filter(|k| !k.is_empty());

        // Verification reads the parameters back out of the hash string
        let (hash_iterations, hash_mem_cost_kib) = if cfg!(test) {
            (1, 8)
        } else {
            (
                env_var_or(HASH_ITERATIONS_VAR, 2),
                env_var_or(HASH_MEM_COST_KIB_VAR, 65536),
            )
        };

        let inner = ConfigInner {
            db_path: env_var_or(DB_PATH_VAR, String::from("./wishlist.db")),
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, num_cpus::get() as u32 * 4),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),
            db_busy_timeout: Duration::from_millis(env_var_or(DB_BUSY_TIMEOUT_MS_VAR, 5000)),

            hashing_key,
            admin_key,

            hash_length: env_var_or(HASH_LENGTH_VAR, 32),
            hash_iterations,
            hash_mem_cost_kib,
            hash_threads: env_var_or(HASH_THREADS_VAR, 1),
            hash_salt_length: env_var_or(HASH_SALT_LENGTH_VAR, 16),

            session_lifetime: Duration::from_secs(
                env_var_or(SESSION_LIFETIME_DAYS_VAR, 7) * 86400,
            ),
            invite_code_lifetime: Duration::from_secs(
                env_var_or(INVITE_CODE_LIFETIME_DAYS_VAR, 30) * 86400,
            ),

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),
            shutdown_timeout: Duration::from_secs(env_var_or(SHUTDOWN_TIMEOUT_SECS_VAR, 10)),

            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        };

        Ok(Config {
            inner: UnsafeCell::new(inner),
        })
    }

    /// # Safety
    ///
    /// Safe only if the Config isn't being used by other threads or across an async
    /// boundary. Generally, this should only be used at the end of the main function once
    /// all threads have been joined.
    pub unsafe fn zeroize(&self) {
        unsafe {
            (*self.inner.get()).zeroize();
        }
    }
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
