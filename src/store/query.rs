use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rusqlite::OpenFlags;
use rusqlite::types::ValueRef;
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::error::StoreError;

use super::types::{MEASUREMENTS_TABLE, Measurement};

const TABLE_CHECK_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1";
const SELECT_RECENT_SQL: &str = "SELECT website, timestamp, ttfb, loading_delay
     FROM measurements
     WHERE website LIKE ?1
     ORDER BY timestamp DESC
     LIMIT ?2";
const KNOWN_SITES_SQL: &str = "SELECT DISTINCT website FROM measurements LIMIT 10";

/// Handle on the collector's database. Holds no connection; every lookup
/// opens its own read-only connection and closes it before returning.
#[derive(Debug, Clone)]
pub struct MeasurementStore {
    db_path: PathBuf,
    limit: u32,
}

impl MeasurementStore {
    #[must_use]
    pub const fn new(db_path: PathBuf, limit: u32) -> Self {
        Self { db_path, limit }
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the most recent measurements whose site contains `site`,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing which precondition or step failed.
    pub async fn recent_for_site(&self, site: &str) -> Result<Vec<Measurement>, StoreError> {
        let conn = self.open_validated().await?;
        let result = select_recent(&conn, site, self.limit).await;
        match result.as_ref() {
            Ok(rows) if rows.is_empty() => {
                debug!("No measurements matched '%{}%'", site);
                log_known_sites(&conn).await;
            }
            Ok(rows) => {
                debug!("Found {} measurements for '{}'", rows.len(), site);
            }
            Err(err) => {
                warn!("Measurement query failed: {}", err);
            }
        }
        close_quietly(conn).await;
        result
    }

    /// Checks the file, opens it read-only and verifies the table exists.
    /// The connection is closed again on every failure path.
    pub(super) async fn open_validated(&self) -> Result<Connection, StoreError> {
        self.inspect_file().await?;

        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .await
        .map_err(|err| StoreError::Open {
            path: self.db_path.clone(),
            source: err,
        })?;

        match has_measurements_table(&conn).await {
            Ok(true) => {
                debug!("Opened {} read-only", self.db_path.display());
                Ok(conn)
            }
            Ok(false) => {
                info!(
                    "Database {} has no {} table",
                    self.db_path.display(),
                    MEASUREMENTS_TABLE
                );
                close_quietly(conn).await;
                Err(StoreError::SchemaMissing {
                    path: self.db_path.clone(),
                    table: MEASUREMENTS_TABLE,
                })
            }
            Err(err) => {
                close_quietly(conn).await;
                Err(StoreError::Open {
                    path: self.db_path.clone(),
                    source: err,
                })
            }
        }
    }

    async fn inspect_file(&self) -> Result<(), StoreError> {
        match tokio::fs::metadata(&self.db_path).await {
            Ok(metadata) if metadata.len() == 0 => Err(StoreError::Empty {
                path: self.db_path.clone(),
            }),
            Ok(metadata) => {
                debug!(
                    "Database {} exists ({} bytes)",
                    self.db_path.display(),
                    metadata.len()
                );
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                path: self.db_path.clone(),
            }),
            Err(err) => Err(StoreError::FileSystem {
                path: self.db_path.clone(),
                source: err,
            }),
        }
    }
}

async fn has_measurements_table(conn: &Connection) -> Result<bool, tokio_rusqlite::Error> {
    conn.call(|conn| {
        let mut stmt = conn.prepare(TABLE_CHECK_SQL)?;
        let exists = stmt.exists([MEASUREMENTS_TABLE])?;
        Ok(exists)
    })
    .await
}

async fn select_recent(
    conn: &Connection,
    site: &str,
    limit: u32,
) -> Result<Vec<Measurement>, StoreError> {
    let pattern = format!("%{}%", site);
    conn.call(move |conn| {
        let mut stmt = conn.prepare(SELECT_RECENT_SQL)?;
        let rows = stmt.query_map(rusqlite::params![pattern, limit], measurement_from_row)?;
        let mut measurements = Vec::new();
        for row in rows {
            measurements.push(row?);
        }
        Ok(measurements)
    })
    .await
    .map_err(|err| StoreError::Query {
        site: site.to_owned(),
        source: err,
    })
}

fn measurement_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Measurement> {
    let site: Option<String> = row.get(0)?;
    let timestamp = timestamp_text(row.get_ref(1)?);
    Ok(Measurement {
        site: site.unwrap_or_default(),
        timestamp,
        ttfb: row.get(2)?,
        loading_delay: row.get(3)?,
    })
}

/// The collector stores timestamps as text, but SQLite's loose typing lets
/// other storage classes through.
fn timestamp_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
    }
}

async fn log_known_sites(conn: &Connection) {
    let sites = conn
        .call(|conn| {
            let mut stmt = conn.prepare(KNOWN_SITES_SQL)?;
            let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;
            let mut sites = Vec::new();
            for row in rows {
                if let Some(site) = row? {
                    sites.push(site);
                }
            }
            Ok(sites)
        })
        .await;
    match sites {
        Ok(sites) => debug!("Sites present in database: {:?}", sites),
        Err(err) => debug!("Failed to list sites present in database: {}", err),
    }
}

pub(super) async fn close_quietly(conn: Connection) {
    if let Err(err) = conn.close().await {
        warn!("Failed to close database connection: {}", err);
    }
}
