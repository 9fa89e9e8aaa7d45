//! Session store: authentication lifecycle and token publication.
//!
//! The store owns the only copy of the credential. Dependents never read
//! storage directly; they subscribe to [`Session`] snapshots and react to
//! token changes.

use anyhow::{Context, Result};
use expensetrack_types::UserProfile;
use tokio::sync::watch;

use crate::api::ApiClient;
use crate::storage::KeyValueStore;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key for the serialized user profile.
pub const USER_KEY: &str = "auth_user";
/// Storage key for the role string.
pub const ROLE_KEY: &str = "auth_role";

const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, USER_KEY, ROLE_KEY];

/// Credential plus the identity it belongs to. Token and user only exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub token: String,
    pub user: UserProfile,
    pub role: Option<String>,
}

/// Read-only view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    identity: Option<Identity>,
    is_loading: bool,
}

impl Session {
    fn uninitialized() -> Self {
        Self {
            identity: None,
            is_loading: true,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|id| id.token.as_str())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.identity.as_ref().map(|id| &id.user)
    }

    pub fn role(&self) -> Option<&str> {
        self.identity.as_ref().and_then(|id| id.role.as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// True until the stored session has been read.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

/// What `restore` found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A stored session was loaded.
    Restored,
    /// Nothing usable was stored.
    NoSession,
    /// Stored data could not be read; the session starts unauthenticated.
    Corrupted { reason: String },
    /// `restore` already ran for this store.
    AlreadyRestored,
}

/// Owns the authentication state and its persisted copy.
pub struct SessionStore {
    storage: Box<dyn KeyValueStore>,
    api: ApiClient,
    state: watch::Sender<Session>,
    restored: bool,
}

impl SessionStore {
    pub fn new(storage: impl KeyValueStore + 'static, api: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::uninitialized());
        Self {
            storage: Box::new(storage),
            api,
            state,
            restored: false,
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Loads the persisted session, once.
    ///
    /// Read or parse failures are logged and leave the session
    /// unauthenticated. Loading always ends.
    pub fn restore(&mut self) -> RestoreOutcome {
        if self.restored {
            return RestoreOutcome::AlreadyRestored;
        }
        self.restored = true;

        let (identity, outcome) = match read_identity(self.storage.as_ref()) {
            Ok(Some(identity)) => {
                tracing::info!(user_id = identity.user.id, "Restored session");
                (Some(identity), RestoreOutcome::Restored)
            }
            Ok(None) => (None, RestoreOutcome::NoSession),
            Err(err) => {
                let reason = format!("{err:#}");
                tracing::warn!(error = %reason, "Failed to restore session");
                (None, RestoreOutcome::Corrupted { reason })
            }
        };

        self.state.send_modify(|session| {
            session.identity = identity;
            session.is_loading = false;
        });
        outcome
    }

    /// Authenticates, persists the result, then publishes the new identity.
    ///
    /// On any failure the session is left exactly as it was.
    ///
    /// # Errors
    /// Returns the [`crate::api::ApiError`] from the server, or a storage
    /// error if the session could not be persisted.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let response = self.api.login(email, password).await?;

        let user_json =
            serde_json::to_string(&response.user).context("Failed to serialize user profile")?;
        let role = response.role.filter(|role| !role.is_empty());
        self.storage
            .set_many(&[
                (TOKEN_KEY, response.token.clone()),
                (USER_KEY, user_json),
                (ROLE_KEY, role.clone().unwrap_or_default()),
            ])
            .context("Failed to persist session")?;

        tracing::info!(user_id = response.user.id, "Logged in");

        let identity = Identity {
            token: response.token,
            user: response.user,
            role,
        };
        self.restored = true;
        self.state.send_modify(|session| {
            session.identity = Some(identity);
            session.is_loading = false;
        });
        Ok(())
    }

    /// Clears the session. Returns whether a session was active.
    ///
    /// The in-memory session is cleared and published before storage is
    /// touched, so a storage failure cannot leave an authenticated view.
    ///
    /// # Errors
    /// Returns an error if the stored keys could not be removed.
    pub fn logout(&mut self) -> Result<bool> {
        let was_authenticated = self.state.borrow().is_authenticated();
        self.state.send_modify(|session| {
            session.identity = None;
            session.is_loading = false;
        });

        self.storage
            .remove_many(&SESSION_KEYS)
            .context("Failed to remove stored session")?;

        tracing::info!(was_authenticated, "Logged out");
        Ok(was_authenticated)
    }
}

fn read_identity(storage: &dyn KeyValueStore) -> Result<Option<Identity>> {
    let token = non_empty(storage.get(TOKEN_KEY)?);
    let user = non_empty(storage.get(USER_KEY)?);
    let role = non_empty(storage.get(ROLE_KEY)?);

    let (Some(token), Some(user)) = (token, user) else {
        return Ok(None);
    };

    let user: UserProfile =
        serde_json::from_str(&user).context("Stored user profile is not valid")?;

    Ok(Some(Identity { token, user, role }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Shortens a token for display, never showing it in full.
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 8 {
        return "****".to_string();
    }
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}...")
}
