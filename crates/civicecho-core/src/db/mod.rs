// ============================================================================
// PortalDb - Embedded Local Store (redb)
// ============================================================================
// Client-side persistence for the signed-in identity record.
// Default path: ~/.civicecho/portal.redb (override via CIVICECHO_DB_PATH)
// ============================================================================

use anyhow::{anyhow, Result};
use redb::{Database, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::session::IdentityStore;

// Table definitions
const SESSION: TableDefinition<&str, &[u8]> = TableDefinition::new("session");

/// Well-known key the single identity record lives under.
const SESSION_KEY: &str = "session:current";

/// Embedded database backing the persisted session.
pub struct PortalDb {
    db: Database,
    path: PathBuf,
}

impl PortalDb {
    /// Open (or create) the database at the given path.
    /// If `path` is None, uses CIVICECHO_DB_PATH env var or
    /// ~/.civicecho/portal.redb
    pub fn open(path: Option<&str>) -> Result<Self> {
        let db_path = if let Some(p) = path {
            PathBuf::from(p)
        } else if let Ok(env_path) = std::env::var("CIVICECHO_DB_PATH") {
            PathBuf::from(env_path)
        } else {
            let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
            let dir = home.join(".civicecho");
            std::fs::create_dir_all(&dir)
                .map_err(|e| anyhow!("Failed to create .civicecho directory: {}", e))?;
            dir.join("portal.redb")
        };

        info!("Opening local store at: {}", db_path.display());

        let db = Database::create(&db_path)
            .map_err(|e| anyhow!("Failed to open local store: {}", e))?;

        // Ensure the table exists by doing a write transaction
        let write_txn = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let _ = write_txn
                .open_table(SESSION)
                .map_err(|e| anyhow!("Failed to create session table: {}", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit init: {}", e))?;

        Ok(Self { db, path: db_path })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn
            .open_table(SESSION)
            .map_err(|e| anyhow!("Failed to open session table: {}", e))?;

        match table
            .get(key)
            .map_err(|e| anyhow!("Failed to read record: {}", e))?
        {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let mut table = write_txn
                .open_table(SESSION)
                .map_err(|e| anyhow!("Failed to open session table: {}", e))?;
            table
                .insert(key, value)
                .map_err(|e| anyhow!("Failed to insert record: {}", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit: {}", e))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        let removed;
        {
            let mut table = write_txn
                .open_table(SESSION)
                .map_err(|e| anyhow!("Failed to open session table: {}", e))?;
            removed = table
                .remove(key)
                .map_err(|e| anyhow!("Failed to remove record: {}", e))?
                .is_some();
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit delete: {}", e))?;
        Ok(removed)
    }
}

impl IdentityStore for PortalDb {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        self.get(SESSION_KEY)
    }

    fn save(&self, raw: &[u8]) -> Result<()> {
        self.put(SESSION_KEY, raw)?;
        debug!("Persisted identity record");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.delete(SESSION_KEY)? {
            debug!("Cleared identity record");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempDb {
        db: PortalDb,
        path: PathBuf,
    }

    impl TempDb {
        fn new(tag: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "civicecho-test-{}-{}.redb",
                tag,
                std::process::id()
            ));
            let _ = std::fs::remove_file(&path);
            let db = PortalDb::open(path.to_str()).expect("open temp db");
            Self { db, path }
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[test]
    fn test_identity_record_roundtrip() {
        let tmp = TempDb::new("roundtrip");
        assert!(tmp.db.load().unwrap().is_none());

        tmp.db.save(br#"{"nid":"BD1","role":"Citizen"}"#).unwrap();
        let raw = tmp.db.load().unwrap().expect("record stored");
        assert_eq!(raw, br#"{"nid":"BD1","role":"Citizen"}"#.to_vec());

        tmp.db.clear().unwrap();
        assert!(tmp.db.load().unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let tmp = TempDb::new("overwrite");
        tmp.db.save(b"first").unwrap();
        tmp.db.save(b"second").unwrap();
        assert_eq!(tmp.db.load().unwrap().unwrap(), b"second".to_vec());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let tmp = TempDb::new("idempotent");
        tmp.db.clear().unwrap();
        tmp.db.clear().unwrap();
        assert!(tmp.db.load().unwrap().is_none());
    }
}
