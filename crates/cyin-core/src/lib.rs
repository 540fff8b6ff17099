//! Core library for the CYin work-logging client.
//!
//! This crate provides:
//! - `api`: the `ApiClient` for the CYin REST backend and its `ApiError` type
//! - `auth`: the `SessionStore` and the key-value storage backends behind it
//! - `models`: request/response types and the work status vocabulary
//! - `app`: the `App` context tying session, client and in-flight flags together
//! - `config`: persisted user configuration and base URL resolution

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod inflight;
pub mod models;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use app::{App, Operation};
pub use auth::{FileStore, Identity, KeyValueStore, KeyringStore, MemoryStore, SessionStore};
pub use config::{Config, StorageKind};
pub use inflight::{InFlight, InFlightGuard};
pub use models::{Location, StatusEvent, WorkLogEntry, WorkStatus};
