//! Application context.
//!
//! `App` owns the session, the API client, and one in-flight flag per
//! operation. Each operation takes its flag, validates its input, then talks
//! to the backend with the session token injected.

use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{Identity, SessionStore};
use crate::inflight::{InFlight, InFlightGuard};
use crate::models::{Location, SignUpRequest, StatusEvent, WorkLogEntry, WorkStatus};
use crate::validation;

/// Shown when the backend accepts the login envelope but refuses the credentials
const LOGIN_REFUSED: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Default)]
struct OperationFlags {
    sign_up: InFlight,
    login: InFlight,
    log_event: InFlight,
    log_work: InFlight,
    forgot_password: InFlight,
    reset_password: InFlight,
}

pub struct App {
    api: ApiClient,
    session: SessionStore,
    flags: OperationFlags,
}

impl App {
    /// Build an app around an already-initialized session
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self {
            api,
            session,
            flags: OperationFlags::default(),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Base URL of the backend this app talks to
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    pub fn into_session(self) -> SessionStore {
        self.session
    }

    /// Whether the named operation currently has a request outstanding
    pub fn is_busy(&self, operation: Operation) -> bool {
        self.flag(operation).is_active()
    }

    fn flag(&self, operation: Operation) -> &InFlight {
        match operation {
            Operation::SignUp => &self.flags.sign_up,
            Operation::Login => &self.flags.login,
            Operation::LogEvent => &self.flags.log_event,
            Operation::LogWork => &self.flags.log_work,
            Operation::ForgotPassword => &self.flags.forgot_password,
            Operation::ResetPassword => &self.flags.reset_password,
        }
    }

    fn begin(&self, operation: Operation) -> Result<InFlightGuard, ApiError> {
        self.flag(operation)
            .try_begin()
            .ok_or(ApiError::Busy(operation.name()))
    }

    /// Client carrying the session token, if any
    fn authed_api(&self) -> ApiClient {
        if !self.session.is_authenticated() {
            warn!("No session token, sending request without credentials");
        }
        self.api.with_token(self.session.token().map(str::to_string))
    }

    // =========================================================================
    // Account
    // =========================================================================

    pub async fn sign_up(
        &self,
        employee_name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<Value, ApiError> {
        let _guard = self.begin(Operation::SignUp)?;

        let request = SignUpRequest {
            employee_name: validation::require(employee_name, "your name")?.to_string(),
            email: validation::email(email)?.to_string(),
            password: validation::password_policy(password)?.to_string(),
            role: validation::require(role, "a role")?.to_string(),
        };

        let data = self.api.sign_up(&request).await?;
        info!(email = %request.email, "Account created");
        Ok(data)
    }

    /// Log in and store the resulting identity in the session.
    ///
    /// The stored email is the one the user typed; role and token come from
    /// the backend.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity, ApiError> {
        let _guard = self.begin(Operation::Login)?;

        let email = validation::email(email)?;
        let password = validation::password(password)?;

        let response = self.api.login(email, password).await?;
        if !response.status {
            warn!(email, "Backend refused credentials");
            return Err(ApiError::Rejected(LOGIN_REFUSED.to_string()));
        }
        if response.token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Login response did not include a token".to_string(),
            ));
        }

        let identity = Identity {
            email: email.to_string(),
            role: response.role,
            token: response.token,
        };
        self.session.login(identity.clone());
        Ok(identity)
    }

    /// Forget the stored identity. No network call is made.
    pub fn logout(&mut self) {
        self.session.logout();
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        let _guard = self.begin(Operation::ForgotPassword)?;
        let email = validation::email(email)?;
        self.api.forgot_password(email).await
    }

    /// Complete a password reset.
    ///
    /// `link_or_token` is the reset link from the email (or just its token).
    /// A missing token and a mismatched confirmation both fail before any
    /// request is sent.
    pub async fn reset_password(
        &self,
        link_or_token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Value, ApiError> {
        let _guard = self.begin(Operation::ResetPassword)?;

        let token = validation::reset_token(link_or_token)?;
        let new_password = validation::new_password(new_password, confirm_password)?;

        self.api.reset_password(&token, new_password).await
    }

    // =========================================================================
    // Work Logging
    // =========================================================================

    /// Report a status event at `location`. Returns the status the backend recorded.
    ///
    /// Sent even without a session; the backend decides whether to accept it.
    pub async fn log_event(
        &self,
        status: WorkStatus,
        location: Location,
    ) -> Result<String, ApiError> {
        let _guard = self.begin(Operation::LogEvent)?;

        let location = validation::location(location)?;
        let event = StatusEvent::new(status, location);

        let recorded = self.authed_api().log_event(&event).await?;
        info!(status = status.as_wire_str(), "Event logged");
        Ok(recorded)
    }

    pub async fn log_work(&self, description: &str) -> Result<WorkLogEntry, ApiError> {
        let _guard = self.begin(Operation::LogWork)?;

        if description.trim().is_empty() {
            return Err(ApiError::Validation(
                "Please enter a work description.".to_string(),
            ));
        }
        let entry = WorkLogEntry {
            description: description.to_string(),
        };

        let logged = self.authed_api().log_work(&entry).await?;
        info!("Work logged");
        Ok(logged)
    }

    // =========================================================================
    // Health
    // =========================================================================

    pub async fn test_connection(&self) -> bool {
        self.api.test_connection().await
    }
}

/// Operations guarded by an in-flight flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SignUp,
    Login,
    LogEvent,
    LogWork,
    ForgotPassword,
    ResetPassword,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SignUp => "Sign up",
            Operation::Login => "Login",
            Operation::LogEvent => "Event logging",
            Operation::LogWork => "Work logging",
            Operation::ForgotPassword => "Password reset request",
            Operation::ResetPassword => "Password reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;

    fn app() -> App {
        // Nothing listens here; validation tests never reach the network
        let api = ApiClient::new("http://127.0.0.1:1").unwrap();
        App::new(api, SessionStore::new(Box::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_log_work_blank_description_is_validation() {
        let app = app();
        let err = app.log_work("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a work description.");
        assert!(!app.is_busy(Operation::LogWork));
    }

    #[tokio::test]
    async fn test_reset_password_checks_token_before_passwords() {
        let app = app();
        let err = app.reset_password("", "a", "b").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid token");

        let err = app.reset_password("tok", "a", "b").await.unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
        assert!(!app.is_busy(Operation::ResetPassword));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_email_without_touching_session() {
        let mut app = app();
        let err = app.login("not-an-email", "pw").await.unwrap_err();
        assert!(err.is_validation());
        assert!(!app.session().is_authenticated());
        assert!(!app.is_busy(Operation::Login));
    }

    #[tokio::test]
    async fn test_log_event_rejects_out_of_range_location() {
        let app = app();
        let err = app
            .log_event(WorkStatus::StartingWorking, Location::new(120.0, 0.0))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_busy_operation_is_refused() {
        let app = app();
        let _held = app.flag(Operation::LogWork).try_begin().unwrap();

        let err = app.log_work("wrote docs").await.unwrap_err();
        assert!(matches!(err, ApiError::Busy("Work logging")));
        // Other operations are unaffected
        assert!(!app.is_busy(Operation::LogEvent));
    }

    #[test]
    fn test_logout_clears_session() {
        let mut app = app();
        app.session.login(Identity {
            email: "a@x.com".to_string(),
            role: "EMPLOYEE".to_string(),
            token: "t1".to_string(),
        });
        app.logout();
        assert!(!app.session().is_authenticated());
    }
}
