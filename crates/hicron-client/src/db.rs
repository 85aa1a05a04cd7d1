use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;

use crate::error::JobError;

pub mod almanac;
pub mod ticket;

const POOL_SIZE: u32 = 4;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

const CREATE_TABLES: [&str; 2] = [
    r#"CREATE TABLE IF NOT EXISTS almanac (
        "current_date" TEXT NOT NULL PRIMARY KEY,
        suitable TEXT NOT NULL,
        taboo TEXT NOT NULL,
        good_luck TEXT NOT NULL,
        ferocious TEXT NOT NULL,
        created_time TIMESTAMP NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS ticket (
        phase TEXT NOT NULL PRIMARY KEY,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        qianqu TEXT NOT NULL,
        houqu TEXT NOT NULL,
        created_time TIMESTAMP NOT NULL
    )"#,
];

/// Existence check and insert for one record type, keyed by its natural key.
pub trait RecordStore<R> {
    fn exists(&self, key: &str) -> Result<bool, JobError>;

    /// Insert one record. A duplicate key is a [`JobError::Constraint`].
    fn create(&self, record: &R) -> Result<(), JobError>;
}

#[derive(Debug)]
struct SqliteConnectionCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query("PRAGMA busy_timeout = 30000;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        // using WAL mode for better concurrency
        diesel::sql_query("PRAGMA journal_mode = WAL;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        // ! may lost last transaction on crash
        diesel::sql_query("PRAGMA synchronous = NORMAL;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        diesel::sql_query("PRAGMA foreign_keys = ON;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        Ok(())
    }
}

/// SQLite-backed store for both record types.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl SqliteStore {
    /// Build the pool and create missing tables.
    pub fn open(database_url: &str) -> Result<Self, JobError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .min_idle(Some(1))
            .connection_timeout(std::time::Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .connection_customizer(Box::new(SqliteConnectionCustomizer))
            .build(manager)
            .map_err(|e| {
                let err_message = format!("Error connecting to {database_url}: {e}");
                log::error!("{err_message}");
                JobError::Store(err_message)
            })?;

        let store = Self { pool };
        store.ensure_schema()?;
        log::debug!("Database ready at {database_url}");
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<(), JobError> {
        let mut conn = self.connection()?;
        for statement in CREATE_TABLES {
            diesel::sql_query(statement).execute(&mut conn)?;
        }
        Ok(())
    }

    pub(crate) fn connection(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, JobError> {
        Ok(self.pool.get()?)
    }
}

/// A single-row insert must report exactly one affected row.
fn expect_one_row(count: usize, what: &str) -> Result<(), JobError> {
    if count == 1 {
        Ok(())
    } else {
        Err(JobError::Store(format!(
            "Expected to insert exactly one {what}, but inserted {count}"
        )))
    }
}
