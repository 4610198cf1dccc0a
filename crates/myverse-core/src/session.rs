//! Single source of truth for the signed-in identity.
//!
//! The store keeps the token and user record in memory and mirrors them into
//! a [`KeyValueStore`]. All mutation goes through [`SessionStore::dispatch`];
//! observers subscribe to [`SessionSnapshot`] changes.
//!
//! Every transition that changes the credential bumps the session *epoch*.
//! Requests are tagged with the epoch they were issued under, so an
//! authorization failure can only expire the session it belongs to.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::models::{User, UserPreferences};
use crate::routes::Route;
use crate::storage::{KeyValueStore, PREFERENCES_KEY, REDIRECT_KEY, TOKEN_KEY, USER_KEY};

/// Read-only view of the session published to subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub loading: bool,
    pub epoch: u64,
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// A credential as attached to an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub epoch: u64,
}

/// Everything that can change the session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Persisted token found at startup; not yet validated.
    Restored { token: String },
    /// The restored token was accepted by the server.
    Validated(User),
    /// Startup finished (successfully or not).
    Loaded,
    SignedIn { token: String, user: User },
    UserUpdated(User),
    PreferencesUpdated(UserPreferences),
    SignedOut,
    /// The restored token could not be confirmed; drop it quietly.
    Invalidated,
    /// The server rejected a credential issued under `epoch`.
    Expired { epoch: u64 },
}

/// What a dispatched event did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub changed: bool,
    pub navigate: Option<Route>,
}

#[derive(Default)]
struct Inner {
    token: Option<String>,
    user: Option<User>,
    loading: bool,
    epoch: u64,
    signed_in_at: Option<DateTime<Utc>>,
}

impl Inner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            loading: self.loading,
            epoch: self.epoch,
            signed_in_at: self.signed_in_at,
        }
    }
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    inner: RwLock<Inner>,
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    /// Create a store in the loading state. Call [`SessionStore::persisted`]
    /// and dispatch the startup events to finish initialization.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let inner = Inner {
            loading: true,
            ..Default::default()
        };
        let (tx, _rx) = watch::channel(inner.snapshot());
        Self {
            storage,
            inner: RwLock::new(inner),
            tx,
        }
    }

    pub fn read(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Token to attach to the next request, tagged with the current epoch.
    pub fn credential(&self) -> Option<Credential> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.token.as_ref().map(|token| Credential {
            token: token.clone(),
            epoch: inner.epoch,
        })
    }

    /// Persisted token and user record, if both are present and readable.
    pub fn persisted(&self) -> Option<(String, User)> {
        let token = self.load_key(TOKEN_KEY)?;
        let user_json = self.load_key(USER_KEY)?;
        match serde_json::from_str::<User>(&user_json) {
            Ok(user) => Some((token, user)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted user record");
                None
            }
        }
    }

    /// Cached preferences from the third storage slot. A record belonging
    /// to anyone but the signed-in user is never returned.
    pub fn preferences(&self) -> Option<UserPreferences> {
        let user_id = self
            .inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .user
            .as_ref()?
            .id;
        let json = self.load_key(PREFERENCES_KEY)?;
        let prefs: UserPreferences = serde_json::from_str(&json).ok()?;
        if prefs.user_id != user_id {
            tracing::debug!(
                cached_for = prefs.user_id,
                user_id,
                "ignoring preferences cached for another user"
            );
            return None;
        }
        Some(prefs)
    }

    /// Remember where a signed-out visitor was headed.
    pub fn remember_redirect(&self, route: &Route) {
        self.store_key(REDIRECT_KEY, &route.path());
    }

    /// Take (and forget) the remembered destination.
    pub fn take_redirect(&self) -> Option<Route> {
        let path = self.load_key(REDIRECT_KEY)?;
        self.remove_key(REDIRECT_KEY);
        Some(Route::parse(&path))
    }

    /// Apply an event, mirror it to storage and notify subscribers.
    pub fn dispatch(&self, event: SessionEvent) -> Transition {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let transition = match event {
            SessionEvent::Restored { token } => {
                inner.token = Some(token);
                Transition::changed()
            }
            SessionEvent::Validated(user) => {
                self.store_user(&user);
                inner.user = Some(user);
                inner.signed_in_at = Some(Utc::now());
                Transition::changed()
            }
            SessionEvent::Loaded => {
                inner.loading = false;
                Transition::changed()
            }
            SessionEvent::SignedIn { token, user } => {
                self.store_key(TOKEN_KEY, &token);
                self.store_user(&user);
                self.store_preferences(user.preferences.as_ref());
                tracing::info!(user = %user.username, "signed in");
                inner.token = Some(token);
                inner.user = Some(user);
                inner.loading = false;
                inner.epoch += 1;
                inner.signed_in_at = Some(Utc::now());
                Transition::changed()
            }
            SessionEvent::UserUpdated(user) => {
                if inner.token.is_none() {
                    Transition::default()
                } else {
                    self.store_user(&user);
                    inner.user = Some(user);
                    Transition::changed()
                }
            }
            SessionEvent::PreferencesUpdated(prefs) => {
                self.store_preferences(Some(&prefs));
                if let Some(user) = inner.user.as_mut() {
                    user.preferences = Some(prefs);
                }
                Transition::changed()
            }
            SessionEvent::SignedOut => {
                self.remove_key(TOKEN_KEY);
                self.remove_key(USER_KEY);
                self.remove_key(PREFERENCES_KEY);
                if inner.user.is_some() {
                    tracing::info!("signed out");
                }
                clear(&mut inner);
                Transition {
                    changed: true,
                    navigate: Some(Route::Landing),
                }
            }
            SessionEvent::Invalidated => {
                self.remove_key(TOKEN_KEY);
                self.remove_key(USER_KEY);
                self.remove_key(PREFERENCES_KEY);
                clear(&mut inner);
                Transition::changed()
            }
            SessionEvent::Expired { epoch } => {
                if epoch != inner.epoch || inner.token.is_none() {
                    tracing::debug!(
                        request_epoch = epoch,
                        current_epoch = inner.epoch,
                        "ignoring authorization failure from a stale session"
                    );
                    Transition::default()
                } else {
                    tracing::warn!("session expired; clearing credentials");
                    self.remove_key(TOKEN_KEY);
                    self.remove_key(USER_KEY);
                    self.remove_key(PREFERENCES_KEY);
                    clear(&mut inner);
                    Transition {
                        changed: true,
                        navigate: Some(Route::Login),
                    }
                }
            }
        };

        if transition.changed {
            self.tx.send_replace(inner.snapshot());
        }
        transition
    }

    fn store_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.store_key(USER_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize user record"),
        }
    }

    /// Replace the cached preferences; `None` drops whatever was there.
    fn store_preferences(&self, prefs: Option<&UserPreferences>) {
        match prefs.map(serde_json::to_string) {
            Some(Ok(json)) => self.store_key(PREFERENCES_KEY, &json),
            Some(Err(e)) => tracing::warn!(error = %e, "failed to serialize preferences"),
            None => self.remove_key(PREFERENCES_KEY),
        }
    }

    // Storage failures are logged, never propagated: the in-memory session
    // remains authoritative for the running process.

    fn load_key(&self, key: &str) -> Option<String> {
        self.storage.get(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "session storage read failed");
            None
        })
    }

    fn store_key(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "session storage write failed");
        }
    }

    fn remove_key(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!(key, error = %e, "session storage delete failed");
        }
    }
}

impl Transition {
    fn changed() -> Self {
        Self {
            changed: true,
            navigate: None,
        }
    }
}

fn clear(inner: &mut Inner) {
    inner.token = None;
    inner.user = None;
    inner.loading = false;
    inner.signed_in_at = None;
    inner.epoch += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn demo_user() -> User {
        serde_json::from_str(r#"{"id":1,"username":"demo","email":"demo@myverse.com"}"#).unwrap()
    }

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let storage = Arc::new(MemoryStore::new());
        let session = SessionStore::new(storage.clone());
        (storage, session)
    }

    #[test]
    fn test_sign_in_persists_and_publishes() {
        let (storage, session) = store();
        let mut rx = session.subscribe();
        assert!(session.read().loading);

        session.dispatch(SessionEvent::SignedIn {
            token: "abc".into(),
            user: demo_user(),
        });

        assert!(rx.has_changed().unwrap());
        let snap = rx.borrow_and_update().clone();
        assert!(snap.is_authenticated());
        assert!(!snap.loading);
        assert_eq!(snap.username(), Some("demo"));
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert!(storage.get(USER_KEY).unwrap().unwrap().contains("\"demo\""));
        assert_eq!(session.credential().unwrap().token, "abc");
    }

    #[test]
    fn test_sign_out_clears_all_three_keys() {
        let (storage, session) = store();
        session.dispatch(SessionEvent::SignedIn {
            token: "abc".into(),
            user: demo_user(),
        });
        storage.set(PREFERENCES_KEY, "{}").unwrap();

        let t = session.dispatch(SessionEvent::SignedOut);
        assert_eq!(t.navigate, Some(Route::Landing));
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(storage.get(PREFERENCES_KEY).unwrap(), None);
        assert!(!session.read().is_authenticated());
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_expiry_from_current_epoch_clears_session() {
        let (storage, session) = store();
        session.dispatch(SessionEvent::SignedIn {
            token: "abc".into(),
            user: demo_user(),
        });
        let epoch = session.credential().unwrap().epoch;

        let t = session.dispatch(SessionEvent::Expired { epoch });
        assert_eq!(t.navigate, Some(Route::Login));
        assert!(!session.read().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_stale_expiry_is_ignored_after_relogin() {
        let (_storage, session) = store();
        session.dispatch(SessionEvent::SignedIn {
            token: "old".into(),
            user: demo_user(),
        });
        let stale = session.credential().unwrap().epoch;
        session.dispatch(SessionEvent::SignedOut);
        session.dispatch(SessionEvent::SignedIn {
            token: "new".into(),
            user: demo_user(),
        });

        let t = session.dispatch(SessionEvent::Expired { epoch: stale });
        assert_eq!(t, Transition::default());
        assert!(session.read().is_authenticated());
        assert_eq!(session.credential().unwrap().token, "new");
    }

    #[test]
    fn test_persisted_requires_token_and_user() {
        let (storage, session) = store();
        storage.set(TOKEN_KEY, "abc").unwrap();
        assert!(session.persisted().is_none());

        storage.set(USER_KEY, "not json").unwrap();
        assert!(session.persisted().is_none());

        storage
            .set(USER_KEY, r#"{"id":1,"username":"demo"}"#)
            .unwrap();
        let (token, user) = session.persisted().unwrap();
        assert_eq!(token, "abc");
        assert_eq!(user.id, 1);
    }

    fn user(id: i64, username: &str) -> User {
        serde_json::from_value(serde_json::json!({"id": id, "username": username})).unwrap()
    }

    fn prefs(user_id: i64, genres: &[&str]) -> UserPreferences {
        serde_json::from_value(serde_json::json!({
            "id": user_id,
            "user_id": user_id,
            "categories": ["movies"],
            "genres": genres,
        }))
        .unwrap()
    }

    #[test]
    fn test_preferences_do_not_survive_expiry_into_next_account() {
        let (storage, session) = store();
        session.dispatch(SessionEvent::SignedIn {
            token: "alice-token".into(),
            user: user(1, "alice"),
        });
        session.dispatch(SessionEvent::PreferencesUpdated(prefs(1, &["Horror"])));
        assert_eq!(session.preferences().unwrap().genres, vec!["Horror"]);

        let epoch = session.credential().unwrap().epoch;
        session.dispatch(SessionEvent::Expired { epoch });
        assert_eq!(storage.get(PREFERENCES_KEY).unwrap(), None);

        session.dispatch(SessionEvent::SignedIn {
            token: "bob-token".into(),
            user: user(2, "bob"),
        });
        assert!(session.preferences().is_none());
    }

    #[test]
    fn test_sign_in_replaces_cached_preferences() {
        let (storage, session) = store();
        session.dispatch(SessionEvent::SignedIn {
            token: "alice-token".into(),
            user: user(1, "alice"),
        });
        session.dispatch(SessionEvent::PreferencesUpdated(prefs(1, &["Horror"])));

        let mut bob = user(2, "bob");
        bob.preferences = Some(prefs(2, &["Comedy"]));
        session.dispatch(SessionEvent::SignedIn {
            token: "bob-token".into(),
            user: bob,
        });
        assert_eq!(session.preferences().unwrap().genres, vec!["Comedy"]);

        session.dispatch(SessionEvent::SignedIn {
            token: "carol-token".into(),
            user: user(3, "carol"),
        });
        assert_eq!(storage.get(PREFERENCES_KEY).unwrap(), None);
        assert!(session.preferences().is_none());
    }

    #[test]
    fn test_preferences_of_another_user_are_ignored() {
        let (storage, session) = store();
        storage
            .set(PREFERENCES_KEY, &serde_json::to_string(&prefs(1, &["Horror"])).unwrap())
            .unwrap();
        assert!(session.preferences().is_none());

        session.dispatch(SessionEvent::Restored {
            token: "bob-token".into(),
        });
        session.dispatch(SessionEvent::Validated(user(2, "bob")));
        assert!(session.preferences().is_none());
    }

    #[test]
    fn test_invalidated_drops_preferences() {
        let (storage, session) = store();
        storage.set(PREFERENCES_KEY, "{}").unwrap();
        session.dispatch(SessionEvent::Restored {
            token: "stale".into(),
        });
        session.dispatch(SessionEvent::Invalidated);
        assert_eq!(storage.get(PREFERENCES_KEY).unwrap(), None);
    }

    #[test]
    fn test_user_update_ignored_when_signed_out() {
        let (_storage, session) = store();
        let t = session.dispatch(SessionEvent::UserUpdated(demo_user()));
        assert!(!t.changed);
        assert!(session.read().user.is_none());
    }

    #[test]
    fn test_redirect_is_taken_once() {
        let (_storage, session) = store();
        session.remember_redirect(&Route::ForumTopic(4));
        assert_eq!(session.take_redirect(), Some(Route::ForumTopic(4)));
        assert_eq!(session.take_redirect(), None);
    }
}
