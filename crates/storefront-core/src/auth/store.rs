//! The session store: single owner of the authentication state.
//!
//! `SessionStore` is a cheap-to-clone handle. Every clone sees the same state,
//! and every mutation is broadcast to subscribers through a
//! `tokio::sync::watch` channel and then persisted. Mutations are applied and
//! written one at a time, so the stored record always matches memory.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiError;

use super::session::{AuthenticatedUser, Credentials, SessionState, AUTH_FALLBACK_MESSAGE, STORE_NAME};
use super::storage::{KeyValueStorage, StorageError};

/// Anything that can exchange credentials for a profile and token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedUser, ApiError>;
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<SessionState>,
    /// Held across apply + write so writes land in mutation order.
    commit_lock: Mutex<()>,
    authenticator: Arc<dyn Authenticator>,
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Create a store with an empty session, ignoring anything persisted.
    pub fn new(authenticator: Arc<dyn Authenticator>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_state(authenticator, storage, SessionState::default())
    }

    /// Create a store from whatever was persisted under the store name.
    pub fn rehydrate(
        authenticator: Arc<dyn Authenticator>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self, StorageError> {
        let state = match storage.get_item(STORE_NAME)? {
            Some(raw) => SessionState::from_persisted(&raw)?,
            None => SessionState::default(),
        };
        debug!(authenticated = state.is_authenticated(), "Session rehydrated");
        Ok(Self::with_state(authenticator, storage, state))
    }

    fn with_state(
        authenticator: Arc<dyn Authenticator>,
        storage: Arc<dyn KeyValueStorage>,
        state: SessionState,
    ) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            inner: Arc::new(Inner {
                state: tx,
                commit_lock: Mutex::new(()),
                authenticator,
                storage,
            }),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    /// Log in with the given credentials.
    ///
    /// Authentication failures never surface here: they land in
    /// `SessionState::error`. The returned error is only ever a failure to
    /// persist the new state, which is still applied in memory.
    ///
    /// Concurrent calls are not cancelled; whichever finishes last decides
    /// the final state, both in memory and in storage.
    pub async fn login(&self, credentials: Credentials) -> Result<(), StorageError> {
        let started = self.commit(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let outcome = self.inner.authenticator.authenticate(&credentials).await;

        let committed = match outcome {
            Ok(AuthenticatedUser { profile, token }) => {
                info!(user_id = profile.id, username = %credentials.username, "Login successful");
                self.commit(move |state| {
                    state.user = Some(profile);
                    state.token = Some(token);
                    state.error = None;
                    state.is_loading = false;
                })
            }
            Err(e) => {
                warn!(error = %e, username = %credentials.username, "Login failed");
                let message = e
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| AUTH_FALLBACK_MESSAGE.to_string());
                self.commit(move |state| {
                    state.error = Some(message);
                    state.is_loading = false;
                })
            }
        };

        started.and(committed)
    }

    /// Forget the signed-in user. Never fails to clear the in-memory state.
    pub fn logout(&self) -> Result<(), StorageError> {
        info!("Logging out");
        self.commit(|state| {
            state.user = None;
            state.token = None;
        })
    }

    /// Apply a mutation, notify subscribers, then persist the resulting state.
    fn commit(&self, mutate: impl FnOnce(&mut SessionState)) -> Result<(), StorageError> {
        // A poisoned lock only means another commit panicked mid-write
        let _guard = self
            .inner
            .commit_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.inner.state.send_modify(mutate);
        let raw = self.inner.state.borrow().to_persisted()?;
        self.persist(&raw)
    }

    fn persist(&self, raw: &str) -> Result<(), StorageError> {
        self.inner.storage.set_item(STORE_NAME, raw).map_err(|e| {
            warn!(error = %e, "Failed to persist session");
            e
        })
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::{FlakyStorage, StubAuthenticator};
    use super::*;
    use crate::auth::MemoryStorage;

    fn store_with(auth: StubAuthenticator, storage: Arc<dyn KeyValueStorage>) -> SessionStore {
        SessionStore::new(Arc::new(auth), storage)
    }

    fn stub() -> StubAuthenticator {
        StubAuthenticator::new().with_account("emilys", "emilyspass", 1)
    }

    #[tokio::test]
    async fn test_login_success_sets_user_and_token() {
        let store = store_with(stub(), Arc::new(MemoryStorage::new()));

        store.login(Credentials::new("emilys", "emilyspass")).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.user.as_ref().map(|u| u.id), Some(1));
        assert_eq!(state.token.as_deref(), Some("token-1"));
        assert_eq!(state.error, None);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_login_rejected_keeps_session_and_sets_server_message() {
        let store = store_with(
            stub().rejecting_with("Erro de autenticação."),
            Arc::new(MemoryStorage::new()),
        );

        store.login(Credentials::new("bad", "bad")).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.user, None);
        assert_eq!(state.token, None);
        assert_eq!(state.error.as_deref(), Some("Erro de autenticação."));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_login_rejected_without_message_uses_fallback() {
        let store = store_with(stub().without_message(), Arc::new(MemoryStorage::new()));

        store.login(Credentials::new("bad", "bad")).await.unwrap();
        assert_eq!(store.snapshot().error.as_deref(), Some(AUTH_FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_existing_session_untouched() {
        let store = store_with(stub(), Arc::new(MemoryStorage::new()));
        store.login(Credentials::new("emilys", "emilyspass")).await.unwrap();

        store.login(Credentials::new("emilys", "wrong")).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.token.as_deref(), Some("token-1"));
        assert!(state.user.is_some());
        assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_next_attempt_clears_previous_error() {
        let store = store_with(stub(), Arc::new(MemoryStorage::new()));
        store.login(Credentials::new("bad", "bad")).await.unwrap();
        assert!(store.snapshot().error.is_some());

        store.login(Credentials::new("emilys", "emilyspass")).await.unwrap();
        assert_eq!(store.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_login_marks_loading_while_in_flight() {
        let store = store_with(stub(), Arc::new(MemoryStorage::new()));
        let mut rx = store.subscribe();

        let handle = {
            let store = store.clone();
            tokio::spawn(async move { store.login(Credentials::new("emilys", "emilyspass")).await })
        };

        rx.changed().await.unwrap();
        let first = rx.borrow_and_update().clone();
        // The first notification is either the loading flag or, if the login
        // already completed, the final state
        assert!(first.is_loading || first.token.is_some());

        handle.await.unwrap().unwrap();
        assert!(!store.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_logout_clears_and_is_idempotent() {
        let store = store_with(stub(), Arc::new(MemoryStorage::new()));
        store.login(Credentials::new("emilys", "emilyspass")).await.unwrap();

        store.logout().unwrap();
        let once = store.snapshot();
        assert_eq!(once.user, None);
        assert_eq!(once.token, None);

        store.logout().unwrap();
        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn test_logout_on_empty_session() {
        let store = store_with(stub(), Arc::new(MemoryStorage::new()));
        store.logout().unwrap();
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_rehydrate_round_trip() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let store = store_with(stub(), storage.clone());
        store.login(Credentials::new("emilys", "emilyspass")).await.unwrap();
        let before = store.snapshot();
        drop(store);

        let restored = SessionStore::rehydrate(Arc::new(stub()), storage).unwrap();
        let after = restored.snapshot();
        assert_eq!(after.user, before.user);
        assert_eq!(after.token, before.token);
    }

    #[tokio::test]
    async fn test_rehydrate_after_logout_is_empty() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let store = store_with(stub(), storage.clone());
        store.login(Credentials::new("emilys", "emilyspass")).await.unwrap();
        store.logout().unwrap();

        let restored = SessionStore::rehydrate(Arc::new(stub()), storage).unwrap();
        assert!(!restored.snapshot().is_authenticated());
    }

    #[test]
    fn test_rehydrate_empty_and_corrupt_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::rehydrate(Arc::new(stub()), storage.clone()).unwrap();
        assert_eq!(store.snapshot(), SessionState::default());

        storage.set_item(STORE_NAME, "{ broken").unwrap();
        let result = SessionStore::rehydrate(Arc::new(stub()), storage);
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_but_state_applied() {
        let storage = Arc::new(FlakyStorage::default());
        storage.fail_writes.store(true, Ordering::SeqCst);
        let store = store_with(stub(), storage.clone());

        let result = store.login(Credentials::new("emilys", "emilyspass")).await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(store.snapshot().is_authenticated());

        let result = store.logout();
        assert!(result.is_err());
        assert!(!store.snapshot().is_authenticated());
    }

    /// Delays one user's authentication so concurrent logins resolve in a
    /// known order.
    struct StaggeredAuthenticator {
        inner: StubAuthenticator,
        slow_user: &'static str,
    }

    #[async_trait]
    impl Authenticator for StaggeredAuthenticator {
        async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedUser, ApiError> {
            if credentials.username == self.slow_user {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            self.inner.authenticate(credentials).await
        }
    }

    /// Blocks while writing any record that carries the given token.
    struct SlowWriteStorage {
        inner: MemoryStorage,
        slow_token: &'static str,
    }

    impl KeyValueStorage for SlowWriteStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if value.contains(self.slow_token) {
                std::thread::sleep(std::time::Duration::from_millis(200));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_logins_persist_the_final_state() {
        let auth = StaggeredAuthenticator {
            inner: StubAuthenticator::new()
                .with_account("first", "pw", 1)
                .with_account("second", "pw", 2),
            slow_user: "second",
        };
        let storage = Arc::new(SlowWriteStorage {
            inner: MemoryStorage::new(),
            slow_token: "token-1",
        });
        let store = SessionStore::new(Arc::new(auth), storage.clone());

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.login(Credentials::new("first", "pw")).await })
        };
        let second = {
            let store = store.clone();
            tokio::spawn(async move { store.login(Credentials::new("second", "pw")).await })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(store.token().as_deref(), Some("token-2"));
        let raw = storage.get_item(STORE_NAME).unwrap().unwrap();
        let persisted = SessionState::from_persisted(&raw).unwrap();
        assert_eq!(persisted.token.as_deref(), Some("token-2"));
        assert_eq!(persisted.user, store.snapshot().user);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = store_with(stub(), Arc::new(MemoryStorage::new()));
        let other = store.clone();
        store.login(Credentials::new("emilys", "emilyspass")).await.unwrap();
        assert_eq!(other.token().as_deref(), Some("token-1"));
    }
}
