//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the single owner of the session, with `login`/`logout`
//! - `SessionState`: user, token, loading flag and last error
//! - `KeyValueStorage`: where the session is persisted (`FileStorage`, `MemoryStorage`)
//!
//! The session is persisted under the `auth-storage` key after every change
//! and rehydrated once at startup.

pub mod session;
pub mod storage;
pub mod store;

pub use session::{AuthenticatedUser, Credentials, SessionState, AUTH_FALLBACK_MESSAGE, STORE_NAME};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{Authenticator, SessionStore};
