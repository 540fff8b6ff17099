//! Authentication module for managing the logged-in identity.
//!
//! This module provides:
//! - `SessionStore`: the in-memory identity plus its durable copy
//! - `KeyValueStore`: the storage port the session persists through
//! - `FileStore`, `MemoryStore`: JSON-file and in-memory backends
//! - `KeyringStore`: OS-level credential storage via keyring
//!
//! The identity is kept as three independent entries (`token`, `email`,
//! `role`) so any backend that can hold named strings will do.

pub mod credentials;
pub mod session;
pub mod storage;

pub use credentials::KeyringStore;
pub use session::{Identity, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
