//! # Authentication
//!
//! Login, registration and profile edits.
//!
//! ## Login Resolution
//! ```text
//! login(identifier, password)
//!   │
//!   ├─1─► configured staff username (case-insensitive) + hash verifies
//!   │       └──► Staff session, no store read
//!   │
//!   ├─2─► users/{identifier}                     (phone, verbatim)
//!   ├─3─► users where accountId == identifier
//!   ├─4─► users where email == lowercase(identifier)
//!   │
//!   └─5─► credentials/{uid} hash verifies?
//!           ├── yes ──► Customer session
//!           └── no  ──► Ok(None)
//! ```
//! An unknown identifier and a wrong password both end in `Ok(None)`.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use volta_core::ids::{account_id, MAX_ID_ATTEMPTS};
use volta_core::validation::{normalize_email, normalize_phone, validate_password, validate_text};
use volta_core::{ProfileUpdate, Role, UserProfile, ValidationError};
use volta_store::{encode, Query, Write};

use crate::config::StaffAccount;
use crate::error::{ShopError, ShopResult};
use crate::password::{hash_password, verify_password};
use crate::remote::collections::{CREDENTIALS, USERS};
use crate::remote::Remote;
use crate::session::{Session, SessionManager};

/// Registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub phone: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credentials {
    uid: String,
    password_hash: String,
}

pub struct AuthService {
    remote: Remote,
    staff: Vec<StaffAccount>,
    sessions: Arc<SessionManager>,
}

impl AuthService {
    pub fn new(remote: Remote, staff: Vec<StaffAccount>, sessions: Arc<SessionManager>) -> Self {
        AuthService {
            remote,
            staff,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn current(&self) -> Option<Session> {
        self.sessions.current()
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Signs in and establishes the session. `Ok(None)` means no role matched.
    pub async fn login(&self, identifier: &str, password: &str) -> ShopResult<Option<Session>> {
        debug!(identifier, "Login attempt");

        if let Some(session) = self.staff_login(identifier, password) {
            self.sessions.establish(session.clone())?;
            return Ok(Some(session));
        }

        let Some(profile) = self.find_user(identifier).await? else {
            info!("Login failed");
            return Ok(None);
        };

        let verified = match self.remote.get(CREDENTIALS, &profile.uid).await? {
            Some(data) => match serde_json::from_value::<Credentials>(data) {
                Ok(creds) => verify_password(password, &creds.password_hash),
                Err(err) => {
                    warn!(uid = %profile.uid, %err, "Malformed credentials document");
                    false
                }
            },
            None => false,
        };
        if !verified {
            info!("Login failed");
            return Ok(None);
        }

        let session = Session::Customer { profile };
        self.sessions.establish(session.clone())?;
        Ok(Some(session))
    }

    fn staff_login(&self, identifier: &str, password: &str) -> Option<Session> {
        self.staff
            .iter()
            .find(|account| {
                account.username.eq_ignore_ascii_case(identifier)
                    && verify_password(password, &account.password_hash)
            })
            .map(|account| Session::Staff {
                username: account.username.clone(),
                role: account.role,
            })
    }

    async fn find_user(&self, identifier: &str) -> ShopResult<Option<UserProfile>> {
        if identifier.is_empty() {
            return Ok(None);
        }

        if let Some(data) = self.remote.get(USERS, identifier).await? {
            return Ok(decode_profile(data));
        }

        let by_account = Query::collection(USERS).where_eq("accountId", identifier).limit(1);
        if let Some(doc) = self.remote.query(&by_account).await?.into_iter().next() {
            return Ok(decode_profile(doc.data));
        }

        let by_email = Query::collection(USERS)
            .where_eq("email", identifier.to_lowercase())
            .limit(1);
        Ok(self
            .remote
            .query(&by_email)
            .await?
            .into_iter()
            .next()
            .and_then(|doc| decode_profile(doc.data)))
    }

    pub fn logout(&self) {
        self.sessions.logout();
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Creates a customer or technician account and signs it in.
    ///
    /// Nothing is written when validation fails or the phone or email is
    /// taken; an existing profile is never overwritten.
    pub async fn register(
        &self,
        form: &Registration,
        password: &str,
        role: Role,
    ) -> ShopResult<UserProfile> {
        if !role.can_register() {
            return Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["customer".to_string(), "technician".to_string()],
            }
            .into());
        }
        let phone = normalize_phone(&form.phone)?;
        validate_text("name", &form.name, 100)?;
        let email = match form.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Some(normalize_email(email)?),
            _ => None,
        };
        validate_password(password)?;

        if self.remote.get(USERS, &phone).await?.is_some() {
            return Err(ShopError::AlreadyRegistered { phone });
        }
        if let Some(email) = &email {
            self.ensure_email_free(email, None).await?;
        }

        let password_hash = hash_password(password)?;
        let credentials = encode(&Credentials {
            uid: phone.clone(),
            password_hash,
        })?;

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let Some(account) = account_id(role, &mut rand::thread_rng()) else {
                return Err(ShopError::PermissionDenied);
            };
            let taken = Query::collection(USERS).where_eq("accountId", account.as_str()).limit(1);
            if !self.remote.query(&taken).await?.is_empty() {
                debug!(attempt, account_id = %account, "Account id collision");
                continue;
            }

            let profile = UserProfile {
                uid: phone.clone(),
                account_id: account,
                role,
                name: form.name.trim().to_string(),
                email: email.clone(),
                address: form.address.trim().to_string(),
                created_at: Utc::now(),
            };
            let writes = vec![
                Write::create(USERS, phone.as_str(), encode(&profile)?),
                Write::create(CREDENTIALS, phone.as_str(), credentials.clone()),
            ];
            match self.remote.commit(writes).await {
                Ok(()) => {}
                Err(ShopError::Store(err)) if err.is_conflict() => {
                    return Err(ShopError::AlreadyRegistered { phone });
                }
                Err(err) => return Err(err),
            }

            info!(account_id = %profile.account_id, role = %role, "Account registered");
            self.sessions.establish(Session::Customer {
                profile: profile.clone(),
            })?;
            return Ok(profile);
        }

        Err(ShopError::IdsExhausted {
            prefix: role.account_prefix().unwrap_or_default().to_string(),
        })
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<&str>) -> ShopResult<()> {
        let query = Query::collection(USERS).where_eq("email", email);
        let in_use = self
            .remote
            .query(&query)
            .await?
            .iter()
            .any(|doc| Some(doc.id.as_str()) != owner);
        if in_use {
            return Err(ShopError::EmailInUse {
                email: email.to_string(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Merges `update` into the signed-in customer's profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ShopResult<UserProfile> {
        let Some(Session::Customer { profile }) = self.sessions.current() else {
            return Err(ShopError::PermissionDenied);
        };

        let mut patch = serde_json::Map::new();
        let mut updated = profile.clone();
        if let Some(name) = &update.name {
            validate_text("name", name, 100)?;
            updated.name = name.trim().to_string();
            patch.insert("name".to_string(), json!(updated.name));
        }
        if let Some(email) = &update.email {
            let email = normalize_email(email)?;
            if profile.email.as_deref() != Some(email.as_str()) {
                self.ensure_email_free(&email, Some(&profile.uid)).await?;
            }
            patch.insert("email".to_string(), json!(email));
            updated.email = Some(email);
        }
        if let Some(address) = &update.address {
            validate_text("address", address, 300)?;
            updated.address = address.trim().to_string();
            patch.insert("address".to_string(), json!(updated.address));
        }
        if patch.is_empty() {
            return Ok(profile);
        }

        self.remote
            .commit(vec![Write::merge(USERS, profile.uid.as_str(), Value::Object(patch))])
            .await?;
        info!(uid = %profile.uid, "Profile updated");
        self.sessions.establish(Session::Customer {
            profile: updated.clone(),
        })?;
        Ok(updated)
    }
}

fn decode_profile(data: Value) -> Option<UserProfile> {
    serde_json::from_value(data)
        .inspect_err(|err| warn!(%err, "Skipping malformed user profile"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionSlots;
    use volta_store::{DocumentStore, MemoryStore};

    fn service(store: Arc<MemoryStore>) -> AuthService {
        let admin = StaffAccount {
            username: "Admin".to_string(),
            password_hash: hash_password("admin-pass").unwrap(),
            role: Role::Admin,
        };
        let sessions = Arc::new(SessionManager::restore(Box::new(MemorySessionSlots::new())));
        AuthService::new(Remote::new(store), vec![admin], sessions)
    }

    fn form() -> Registration {
        Registration {
            phone: "+880 1711-000000".to_string(),
            name: "Rahim Uddin".to_string(),
            email: Some("Rahim@Example.com".to_string()),
            address: "Mirpur 10".to_string(),
        }
    }

    #[tokio::test]
    async fn test_staff_login_needs_no_store() {
        let store = Arc::new(MemoryStore::new());
        let auth = service(store.clone());

        let session = auth.login("admin", "admin-pass").await.unwrap().unwrap();
        assert!(session.is_admin());
        assert_eq!(store.read_count(), 0);
    }

    #[tokio::test]
    async fn test_register_then_login_by_every_identifier() {
        let store = Arc::new(MemoryStore::new());
        let auth = service(store.clone());

        let profile = auth.register(&form(), "secret1", Role::Customer).await.unwrap();
        assert_eq!(profile.uid, "01711000000");
        assert!(profile.account_id.starts_with("GE-C-"));
        assert_eq!(profile.email.as_deref(), Some("rahim@example.com"));
        assert!(auth.current().is_some());

        auth.logout();
        for identifier in ["01711000000", profile.account_id.as_str(), "RAHIM@example.com"] {
            let session = auth.login(identifier, "secret1").await.unwrap();
            assert_eq!(session.unwrap().profile().unwrap().uid, "01711000000");
        }

        assert!(auth.login("01711000000", "wrong-1").await.unwrap().is_none());
        assert!(auth.login("01999999999", "secret1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_does_not_overwrite() {
        let store = Arc::new(MemoryStore::new());
        let auth = service(store.clone());
        auth.register(&form(), "secret1", Role::Customer).await.unwrap();
        let before = store.get(USERS, "01711000000").await.unwrap();

        let mut again = form();
        again.name = "Someone Else".to_string();
        again.email = None;
        let err = auth.register(&again, "secret2", Role::Technician).await.unwrap_err();
        assert!(matches!(err, ShopError::AlreadyRegistered { .. }));
        assert_eq!(store.get(USERS, "01711000000").await.unwrap(), before);

        let mut other_phone = form();
        other_phone.phone = "01811000000".to_string();
        let err = auth.register(&other_phone, "secret2", Role::Customer).await.unwrap_err();
        assert!(matches!(err, ShopError::EmailInUse { .. }));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let store = Arc::new(MemoryStore::new());
        let auth = service(store.clone());

        assert!(auth.register(&form(), "12345", Role::Customer).await.is_err());
        assert!(auth.register(&form(), "secret1", Role::Admin).await.is_err());
        let mut bad = form();
        bad.phone = "12345".to_string();
        assert!(auth.register(&bad, "secret1", Role::Customer).await.is_err());
        assert!(store.scan(USERS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_merges() {
        let store = Arc::new(MemoryStore::new());
        let auth = service(store.clone());
        assert!(matches!(
            auth.update_profile(&ProfileUpdate::default()).await,
            Err(ShopError::PermissionDenied)
        ));

        auth.register(&form(), "secret1", Role::Customer).await.unwrap();
        let updated = auth
            .update_profile(&ProfileUpdate {
                address: Some("Uttara 7".to_string()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.address, "Uttara 7");
        assert_eq!(updated.name, "Rahim Uddin");

        let stored = store.get(USERS, "01711000000").await.unwrap().unwrap();
        assert_eq!(stored["address"], "Uttara 7");
        assert_eq!(stored["name"], "Rahim Uddin");
    }
}
