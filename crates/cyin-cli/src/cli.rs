use clap::{Parser, Subcommand};
use cyin_core::{StorageKind, WorkStatus};

/// Command-line client for CYin work logging
#[derive(Parser, Debug)]
#[command(
    name = "cyin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Log work status events and work descriptions to a CYin backend",
    long_about = None
)]
pub struct Cli {
    /// Backend base URL (overrides CYIN_API_URL and the config file)
    #[arg(global = true, long = "api-url")]
    pub api_url: Option<String>,

    /// Where to keep the login session: file, keyring or memory
    #[arg(global = true, long = "storage")]
    pub storage: Option<StorageKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new employee account
    Signup {
        /// Full name of the employee
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "EMPLOYEE")]
        role: String,
    },

    /// Log in and remember the session
    Login {
        /// Defaults to the last email used
        #[arg(long)]
        email: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Report a work status: start, break, travel or end
    Event {
        status: WorkStatus,

        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// Log a description of work done
    Work {
        /// Description text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Request a password reset link by email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Set a new password using the link from the reset email
    ResetPassword {
        /// The reset link, or just its token
        link: String,
    },

    /// Check that the backend is reachable
    Ping,
}
