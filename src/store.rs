use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection as SqliteConnection};

use crate::error::StoreError;
use crate::family::DatabaseFamily;
use crate::profile::ConnectionProfile;

/// The persistence boundary for saved profiles.
///
/// The store is the sole source of truth; callers hold only transient
/// cached copies of its listing and reconcile by re-listing.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a profile, or replace the one already saved under its id
    async fn save(&self, profile: &ConnectionProfile) -> Result<(), StoreError>;

    /// All saved profiles, in insertion order
    async fn list(&self) -> Result<Vec<ConnectionProfile>, StoreError>;

    /// Remove a profile. Deleting an id that is not present succeeds.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// SQLite-based profile store
pub struct SqliteProfileStore {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl SqliteProfileStore {
    /// Open the store at the platform-default location
    pub fn open_default() -> Result<Self, StoreError> {
        let data_dir = dirs::data_local_dir().ok_or(StoreError::DataDir)?;
        Self::open(data_dir.join("switchboard").join("profiles.db"))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(SqliteConnection::open(path)?)
    }

    /// In-memory store, mostly useful in tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(SqliteConnection::open_in_memory()?)
    }

    fn from_connection(conn: SqliteConnection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                db_type TEXT NOT NULL,
                details TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn save(&self, profile: &ConnectionProfile) -> Result<(), StoreError> {
        let details = serde_json::to_string(&profile.details)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO profiles (id, name, db_type, details)
             VALUES (?1, ?2, ?3, ?4)",
            params![profile.id, profile.name, profile.family.id(), details],
        )?;
        tracing::info!(name = %profile.name, family = %profile.family, "profile saved");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConnectionProfile>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, name, db_type, details FROM profiles ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut profiles = Vec::new();
        for row in rows {
            let (id, name, db_type, details) = row?;
            // A record written by an unknown build should not take the
            // whole listing down with it.
            let Some(family) = DatabaseFamily::parse(&db_type) else {
                tracing::warn!(%id, %db_type, "skipping profile with unknown family");
                continue;
            };
            match serde_json::from_str(&details) {
                Ok(details) => profiles.push(ConnectionProfile {
                    id,
                    name,
                    family,
                    details,
                }),
                Err(e) => tracing::warn!(%id, error = %e, "skipping undecodable profile record"),
            }
        }

        Ok(profiles)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        // No existence check: deleting an absent id is not an error
        conn.execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
        Ok(())
    }
}
