use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::fmt;
use std::time::Duration;

pub mod comment;
pub mod invite;
pub mod job_registry;
pub mod session;
pub mod user;
pub mod wishlist;

pub type DbThreadPool = diesel::r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
struct ConnectionPragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; \
             PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_db_thread_pool(
    database_path: &str,
    max_db_connections: u32,
    idle_timeout: Duration,
    busy_timeout: Duration,
) -> Result<DbThreadPool, r2d2::Error> {
    diesel::r2d2::Pool::builder()
        .max_size(max_db_connections)
        .idle_timeout(Some(idle_timeout))
        .connection_customizer(Box::new(ConnectionPragmas { busy_timeout }))
        .build(ConnectionManager::<SqliteConnection>::new(database_path))
}

pub fn run_migrations(db_thread_pool: &DbThreadPool) -> Result<usize, DaoError> {
    let mut conn = db_thread_pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DaoError::MigrationFailure(e.to_string()))?;

    Ok(applied.len())
}

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
    MigrationFailure(String),
    OutOfDate { current_seq: i64 },
    CannotRunQuery(&'static str),
    WontRunQuery, // This error indicates that the DAO refuses to run a query
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::MigrationFailure(e) => {
                write!(f, "DaoError: Failed to run migrations: {e}")
            }
            DaoError::OutOfDate { current_seq } => {
                write!(f, "DaoError: Sequence number was out of date (current is {current_seq})")
            }
            DaoError::CannotRunQuery(msg) => {
                write!(f, "DaoError: Cannot run query: {msg}")
            }
            DaoError::WontRunQuery => {
                write!(f, "DaoError: DAO will not run query")
            }
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}
