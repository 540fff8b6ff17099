//! Data models for the CYin backend.
//!
//! - `WorkStatus`, `Location`, `StatusEvent`: status events tagged with a position
//! - `WorkLogEntry`: free-text work descriptions
//! - Account types: sign-up, login and password reset payloads

pub mod account;
pub mod event;

pub use account::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest, SignUpRequest,
};
pub use event::{Location, StatusEvent, WorkLogEntry, WorkStatus};
