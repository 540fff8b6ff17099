//! REST API client module for the CYin backend.
//!
//! This module provides the `ApiClient` for signing up, logging in,
//! reporting work status events and work descriptions, and the password
//! reset flow.
//!
//! Authenticated endpoints take a JWT bearer token handed to the client by
//! its owner (see `App`), never read from ambient state.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
