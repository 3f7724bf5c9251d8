//! # Sessions
//!
//! The signed-in identity and its two durable slots.
//!
//! ```text
//! ┌──────────────────┐   login / register   ┌─────────────────────────────┐
//! │  SessionManager  │ ───────────────────► │ SessionSlots                │
//! │  watch<Session?> │                      │   customer: UserProfile JSON│
//! │                  │ ◄─────────────────── │   staff:    {username, role}│
//! └──────────────────┘   restore (startup)  └─────────────────────────────┘
//! ```
//!
//! Restoring never contacts the store. Logout clears memory and both slots
//! whatever state they are in.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use volta_core::{Role, UserProfile};

use crate::error::{ShopError, ShopResult};

// =============================================================================
// Session
// =============================================================================

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Session {
    /// A registered customer or technician.
    Customer { profile: UserProfile },
    /// A configured staff account (admin or pos).
    Staff { username: String, role: Role },
}

impl Session {
    pub fn role(&self) -> Role {
        match self {
            Session::Customer { profile } => profile.role,
            Session::Staff { role, .. } => *role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Admin or the counter account.
    pub fn can_sell(&self) -> bool {
        matches!(self.role(), Role::Admin | Role::Pos)
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Session::Customer { profile } => Some(profile),
            Session::Staff { .. } => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StaffSlot {
    username: String,
    role: Role,
}

// =============================================================================
// Slots
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Customer,
    Staff,
}

impl Slot {
    fn file_name(self) -> &'static str {
        match self {
            Slot::Customer => "customer-session.json",
            Slot::Staff => "staff-session.json",
        }
    }
}

/// Durable key-value storage for the two session slots.
pub trait SessionSlots: Send + Sync {
    fn read(&self, slot: Slot) -> ShopResult<Option<String>>;
    fn write(&self, slot: Slot, value: &str) -> ShopResult<()>;
    fn clear(&self, slot: Slot) -> ShopResult<()>;
}

/// One file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileSessionSlots {
    dir: PathBuf,
}

impl FileSessionSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSessionSlots { dir: dir.into() }
    }
}

impl SessionSlots for FileSessionSlots {
    fn read(&self, slot: Slot) -> ShopResult<Option<String>> {
        match fs::read_to_string(self.dir.join(slot.file_name())) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShopError::Session(e.to_string())),
        }
    }

    fn write(&self, slot: Slot, value: &str) -> ShopResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ShopError::Session(e.to_string()))?;
        fs::write(self.dir.join(slot.file_name()), value)
            .map_err(|e| ShopError::Session(e.to_string()))
    }

    fn clear(&self, slot: Slot) -> ShopResult<()> {
        match fs::remove_file(self.dir.join(slot.file_name())) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShopError::Session(e.to_string())),
        }
    }
}

/// Slots that live as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionSlots {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemorySessionSlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionSlots for MemorySessionSlots {
    fn read(&self, slot: Slot) -> ShopResult<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slots.get(&slot).cloned())
    }

    fn write(&self, slot: Slot, value: &str) -> ShopResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.insert(slot, value.to_string());
        Ok(())
    }

    fn clear(&self, slot: Slot) -> ShopResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.remove(&slot);
        Ok(())
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Holds the current session and keeps the slots in step with it.
pub struct SessionManager {
    slots: Box<dyn SessionSlots>,
    current: watch::Sender<Option<Session>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("current", &*self.current.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Restores whatever the slots hold. A staff slot wins over a customer
    /// slot; unreadable slots are ignored.
    pub fn restore(slots: Box<dyn SessionSlots>) -> Self {
        let session = Self::read_staff(slots.as_ref()).or_else(|| Self::read_customer(slots.as_ref()));
        match &session {
            Some(s) => info!(role = %s.role(), "Session restored"),
            None => debug!("No stored session"),
        }
        SessionManager {
            slots,
            current: watch::channel(session).0,
        }
    }

    fn read_staff(slots: &dyn SessionSlots) -> Option<Session> {
        let raw = slots
            .read(Slot::Staff)
            .inspect_err(|err| warn!(%err, "Could not read staff session slot"))
            .ok()??;
        match serde_json::from_str::<StaffSlot>(&raw) {
            Ok(slot) if matches!(slot.role, Role::Admin | Role::Pos) => Some(Session::Staff {
                username: slot.username,
                role: slot.role,
            }),
            Ok(slot) => {
                warn!(role = %slot.role, "Ignoring staff slot with a non-staff role");
                None
            }
            Err(err) => {
                warn!(%err, "Ignoring malformed staff session slot");
                None
            }
        }
    }

    fn read_customer(slots: &dyn SessionSlots) -> Option<Session> {
        let raw = slots
            .read(Slot::Customer)
            .inspect_err(|err| warn!(%err, "Could not read customer session slot"))
            .ok()??;
        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Some(Session::Customer { profile }),
            Err(err) => {
                warn!(%err, "Ignoring malformed customer session slot");
                None
            }
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// Makes `session` current and persists it in its slot. The other slot
    /// is cleared so a restart restores the same identity.
    pub fn establish(&self, session: Session) -> ShopResult<()> {
        let (slot, other, raw) = match &session {
            Session::Customer { profile } => (
                Slot::Customer,
                Slot::Staff,
                serde_json::to_string(profile).map_err(|e| ShopError::Session(e.to_string()))?,
            ),
            Session::Staff { username, role } => (
                Slot::Staff,
                Slot::Customer,
                serde_json::to_string(&StaffSlot {
                    username: username.clone(),
                    role: *role,
                })
                .map_err(|e| ShopError::Session(e.to_string()))?,
            ),
        };
        self.slots.write(slot, &raw)?;
        if let Err(err) = self.slots.clear(other) {
            warn!(%err, "Could not clear stale session slot");
        }
        info!(role = %session.role(), "Session established");
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Clears memory and both slots. Slot errors are logged, never returned.
    pub fn logout(&self) {
        self.current.send_replace(None);
        for slot in [Slot::Customer, Slot::Staff] {
            if let Err(err) = self.slots.clear(slot) {
                warn!(?slot, %err, "Could not clear session slot");
            }
        }
        info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn profile() -> UserProfile {
        UserProfile {
            uid: "01711000000".to_string(),
            account_id: "GE-C-12345".to_string(),
            role: Role::Customer,
            name: "Rahim".to_string(),
            email: None,
            address: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Shares one slot store between "process runs".
    struct Shared(Arc<MemorySessionSlots>);

    impl SessionSlots for Shared {
        fn read(&self, slot: Slot) -> ShopResult<Option<String>> {
            self.0.read(slot)
        }
        fn write(&self, slot: Slot, value: &str) -> ShopResult<()> {
            self.0.write(slot, value)
        }
        fn clear(&self, slot: Slot) -> ShopResult<()> {
            self.0.clear(slot)
        }
    }

    #[test]
    fn test_session_survives_restart() {
        let slots = Arc::new(MemorySessionSlots::new());
        let first = SessionManager::restore(Box::new(Shared(slots.clone())));
        assert!(first.current().is_none());
        first
            .establish(Session::Customer { profile: profile() })
            .unwrap();

        let second = SessionManager::restore(Box::new(Shared(slots)));
        assert_eq!(second.current().unwrap().profile().unwrap().uid, "01711000000");
    }

    #[test]
    fn test_logout_clears_both_slots() {
        let slots = Arc::new(MemorySessionSlots::new());
        slots.write(Slot::Customer, "{not json").unwrap();
        let manager = SessionManager::restore(Box::new(Shared(slots.clone())));
        assert!(manager.current().is_none());

        manager
            .establish(Session::Staff {
                username: "counter".to_string(),
                role: Role::Pos,
            })
            .unwrap();
        assert!(manager.current().unwrap().can_sell());

        manager.logout();
        assert!(manager.current().is_none());
        assert!(slots.read(Slot::Customer).unwrap().is_none());
        assert!(slots.read(Slot::Staff).unwrap().is_none());
    }

    #[test]
    fn test_file_slots() {
        let dir = std::env::temp_dir().join(format!("volta-session-{}", uuid::Uuid::new_v4()));
        let slots = FileSessionSlots::new(&dir);
        assert!(slots.read(Slot::Staff).unwrap().is_none());

        slots.write(Slot::Staff, r#"{"username":"admin","role":"admin"}"#).unwrap();
        let manager = SessionManager::restore(Box::new(slots.clone()));
        assert!(manager.current().unwrap().is_admin());

        manager.logout();
        assert!(slots.read(Slot::Staff).unwrap().is_none());
        slots.clear(Slot::Staff).unwrap();
        let _ = fs::remove_dir_all(dir);
    }
}
