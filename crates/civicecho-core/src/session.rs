//! ============================================================================
//! Session Manager - Authenticated Identity & Persistence
//! ============================================================================
//! Single source of truth for "who is using this client right now":
//! - Restores the persisted identity record at startup, discarding (and
//!   deleting) a corrupted record instead of surfacing an error
//! - Derives the role from the stored numeric role id in exactly one place
//! - Writes the record through to the store before any redirect is decided,
//!   so a restart immediately after login/logout observes the new state
//! ============================================================================

use std::fmt;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::access::{home_route, Route};

/// Backend role id for citizens.
pub const ROLE_ID_CITIZEN: i64 = 1;
/// Backend role id for government officials.
pub const ROLE_ID_OFFICIAL: i64 = 2;

/// Role attached to an identity. Unrecognized raw values are carried through
/// untouched; the portal never validates roles against an allow-list, so
/// whatever was last persisted stays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Citizen,
    GovernmentOfficial,
    Other(String),
}

impl Role {
    /// Role string as the backend spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Citizen => "Citizen",
            Role::GovernmentOfficial => "Government Official",
            Role::Other(raw) => raw,
        }
    }

    /// The fixed role_id to role mapping (1 = Citizen, 2 = Government
    /// Official). Everything else is unmapped.
    pub fn from_role_id(role_id: i64) -> Option<Role> {
        match role_id {
            ROLE_ID_CITIZEN => Some(Role::Citizen),
            ROLE_ID_OFFICIAL => Some(Role::GovernmentOfficial),
            _ => None,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Citizen" => Role::Citizen,
            "Government Official" | "GovernmentOfficial" => Role::GovernmentOfficial,
            _ => Role::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the effective role from a role id, falling back to the raw role
/// value when the id is absent or unmapped. This is the only place the
/// derivation happens; every comparison elsewhere uses the enum.
pub fn normalize_role(role_id: Option<i64>, fallback: Option<&str>) -> Role {
    role_id
        .and_then(Role::from_role_id)
        .unwrap_or_else(|| Role::from(fallback.unwrap_or_default().to_string()))
}

/// The authenticated user held by the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub nid: String,
    #[serde(default)]
    pub role_id: Option<i64>,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial identity handed to `login`: at least a nid plus a role id or a
/// raw role.
#[derive(Debug, Clone, Default)]
pub struct LoginIdentity {
    pub nid: String,
    pub role_id: Option<i64>,
    pub role: Option<Role>,
    pub name: Option<String>,
}

impl LoginIdentity {
    fn normalize(self) -> Identity {
        let role = normalize_role(self.role_id, self.role.as_ref().map(Role::as_str));
        Identity {
            nid: self.nid,
            role_id: self.role_id,
            role,
            name: self.name,
        }
    }
}

/// Loose shape of the persisted record: the role may be present as a raw
/// string, a numeric id, or both; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct StoredRecord {
    nid: String,
    #[serde(default)]
    role_id: Option<i64>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl StoredRecord {
    fn normalize(self) -> Identity {
        let role = normalize_role(self.role_id, self.role.as_deref());
        Identity {
            nid: self.nid,
            role_id: self.role_id,
            role,
            name: self.name,
        }
    }
}

/// Persistence port for the single identity record. The session manager owns
/// encoding, decoding, and corruption handling; implementations just move
/// bytes. Swappable with `MemoryIdentityStore` in tests.
pub trait IdentityStore {
    fn load(&self) -> Result<Option<Vec<u8>>>;
    fn save(&self, raw: &[u8]) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// In-memory identity store used by tests and one-shot tooling.
#[derive(Default)]
pub struct MemoryIdentityStore {
    record: Mutex<Option<Vec<u8>>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, handy for exercising `restore`.
    pub fn with_record(raw: impl Into<Vec<u8>>) -> Self {
        Self {
            record: Mutex::new(Some(raw.into())),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        let record = self.record.lock().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(record.clone())
    }

    fn save(&self, raw: &[u8]) -> Result<()> {
        let mut record = self.record.lock().map_err(|_| anyhow!("store lock poisoned"))?;
        *record = Some(raw.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut record = self.record.lock().map_err(|_| anyhow!("store lock poisoned"))?;
        *record = None;
        Ok(())
    }
}

/// Holds the at-most-one session per running client and keeps it in sync
/// with the persisted record.
pub struct SessionManager {
    store: Box<dyn IdentityStore>,
    current: Option<Identity>,
}

impl SessionManager {
    pub fn new(store: Box<dyn IdentityStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// Restore the persisted identity at startup. A record that fails to
    /// parse is deleted and treated as "nobody signed in"; the caller never
    /// sees an error for corruption.
    pub fn restore(&mut self) -> Option<&Identity> {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read persisted session: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<StoredRecord>(&raw) {
            Ok(record) => {
                let identity = record.normalize();
                info!("Restored session for {} ({})", identity.nid, identity.role);
                self.current = Some(identity);
                self.current.as_ref()
            }
            Err(e) => {
                warn!("Discarding corrupted session record: {}", e);
                if let Err(e) = self.store.clear() {
                    warn!("Failed to clear corrupted session record: {}", e);
                }
                None
            }
        }
    }

    /// Sign in. The record is persisted before the redirect is returned, so
    /// any navigation decided afterwards sees the new identity. Storage
    /// write failures are best-effort: logged, never surfaced as a login
    /// failure.
    pub fn login(&mut self, partial: LoginIdentity) -> Route {
        let identity = partial.normalize();

        match serde_json::to_vec(&identity) {
            Ok(raw) => {
                if let Err(e) = self.store.save(&raw) {
                    warn!("Failed to persist session record: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode session record: {}", e),
        }

        info!("Signed in as {} ({})", identity.nid, identity.role);
        let home = home_route(Some(&identity));
        self.current = Some(identity);
        home
    }

    /// Sign out: clear the in-memory session and the persisted record, then
    /// send the caller back to the login view.
    pub fn logout(&mut self) -> Route {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
        if let Some(identity) = self.current.take() {
            info!("Signed out {}", identity.nid);
        }
        Route::Login
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(raw: &str) -> SessionManager {
        SessionManager::new(Box::new(MemoryIdentityStore::with_record(raw.as_bytes())))
    }

    #[test]
    fn test_role_id_mapping() {
        assert_eq!(Role::from_role_id(1), Some(Role::Citizen));
        assert_eq!(Role::from_role_id(2), Some(Role::GovernmentOfficial));
        assert_eq!(Role::from_role_id(0), None);
        assert_eq!(Role::from_role_id(7), None);
    }

    #[test]
    fn test_normalize_role_prefers_mapped_id() {
        assert_eq!(normalize_role(Some(1), Some("Government Official")), Role::Citizen);
        assert_eq!(normalize_role(Some(2), None), Role::GovernmentOfficial);
    }

    #[test]
    fn test_normalize_role_falls_back_to_raw_value() {
        assert_eq!(
            normalize_role(Some(9), Some("Moderator")),
            Role::Other("Moderator".to_string())
        );
        assert_eq!(normalize_role(None, Some("Citizen")), Role::Citizen);
    }

    #[test]
    fn test_restore_normalizes_role_id() {
        let mut manager = manager_with(r#"{"nid":"BD1","role_id":1}"#);
        let identity = manager.restore().expect("identity restored");
        assert_eq!(identity.nid, "BD1");
        assert_eq!(identity.role, Role::Citizen);
    }

    #[test]
    fn test_restore_keeps_raw_role_for_unmapped_id() {
        let mut manager = manager_with(r#"{"nid":"BD2","role_id":5,"role":"Auditor"}"#);
        let identity = manager.restore().expect("identity restored");
        assert_eq!(identity.role, Role::Other("Auditor".to_string()));
    }

    #[test]
    fn test_restore_clears_corrupted_record() {
        let store = MemoryIdentityStore::with_record("{not json".as_bytes());
        let mut manager = SessionManager::new(Box::new(store));
        assert!(manager.restore().is_none());
        assert!(manager.identity().is_none());
        // The corrupted record must be gone: a second restore finds nothing.
        assert!(manager.restore().is_none());
    }

    #[test]
    fn test_restore_rejects_record_without_nid() {
        let mut manager = manager_with(r#"{"role":"Citizen"}"#);
        assert!(manager.restore().is_none());
    }

    #[test]
    fn test_login_persists_before_redirect() {
        let mut manager = SessionManager::new(Box::new(MemoryIdentityStore::new()));
        let home = manager.login(LoginIdentity {
            nid: "BD1".to_string(),
            role_id: Some(1),
            ..Default::default()
        });
        assert_eq!(home, Route::CitizensDashboard);

        // A fresh manager over the same bytes sees the session: emulate a
        // reload by restoring from the serialized record.
        let raw = serde_json::to_vec(manager.identity().expect("signed in")).unwrap();
        let mut reloaded = SessionManager::new(Box::new(MemoryIdentityStore::with_record(raw)));
        let identity = reloaded.restore().expect("restored after reload");
        assert_eq!(identity.nid, "BD1");
        assert_eq!(identity.role, Role::Citizen);
    }

    #[test]
    fn test_login_official_redirects_to_government_dashboard() {
        let mut manager = SessionManager::new(Box::new(MemoryIdentityStore::new()));
        let home = manager.login(LoginIdentity {
            nid: "GOV9".to_string(),
            role: Some(Role::GovernmentOfficial),
            ..Default::default()
        });
        assert_eq!(home, Route::GovernmentDashboard);
    }

    #[test]
    fn test_logout_clears_session_and_store() {
        let mut manager = SessionManager::new(Box::new(MemoryIdentityStore::new()));
        manager.login(LoginIdentity {
            nid: "BD1".to_string(),
            role: Some(Role::Citizen),
            ..Default::default()
        });
        assert!(manager.identity().is_some());

        assert_eq!(manager.logout(), Route::Login);
        assert!(manager.identity().is_none());
        assert!(manager.restore().is_none());
    }

    #[test]
    fn test_role_wire_strings() {
        assert_eq!(Role::Citizen.as_str(), "Citizen");
        assert_eq!(Role::GovernmentOfficial.as_str(), "Government Official");
        assert_eq!(Role::from("GovernmentOfficial".to_string()), Role::GovernmentOfficial);
        assert_eq!(
            serde_json::to_string(&Role::GovernmentOfficial).unwrap(),
            "\"Government Official\""
        );
    }
}
