//! Subcommand handlers.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cyin_core::{validation, ApiClient, App, Config, Location, SessionStore};
use tracing::{debug, warn};

use crate::cli::{Cli, Commands};

/// User configuration for this run and where to write it back.
///
/// A config file that failed to load has no path and is never overwritten.
pub struct Settings {
    pub config: Config,
    path: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Self {
        match Config::config_path() {
            Ok(path) => Self::load_from(path),
            Err(e) => {
                warn!(error = %e, "No config directory, using defaults");
                Self {
                    config: Config::default(),
                    path: None,
                }
            }
        }
    }

    pub fn load_from(path: PathBuf) -> Self {
        match Config::load_from(&path) {
            Ok(config) => Self {
                config,
                path: Some(path),
            },
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults and leaving the file alone");
                Self {
                    config: Config::default(),
                    path: None,
                }
            }
        }
    }

    /// Remember the email of the last successful login (best-effort)
    fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.to_string());
        match &self.path {
            Some(path) => {
                if let Err(e) = self.config.save_to(path) {
                    warn!(error = %e, "Failed to save config");
                }
            }
            None => debug!("Config was not loaded, not saving"),
        }
    }
}

/// Interactive input.
pub trait Prompt {
    fn line(&mut self, label: &str) -> Result<String>;
    /// Read without echo
    fn password(&mut self, label: &str) -> Result<String>;
}

/// Prompts on the controlling terminal
pub struct Terminal;

impl Prompt for Terminal {
    fn line(&mut self, label: &str) -> Result<String> {
        print!("{}", label);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .context("Failed to read from stdin")?;
        Ok(input.trim().to_string())
    }

    fn password(&mut self, label: &str) -> Result<String> {
        rpassword::prompt_password(label).context("Failed to read password")
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load();

    let base_url = settings.config.resolve_base_url(cli.api_url.as_deref());
    let storage_kind = cli.storage.unwrap_or(settings.config.storage);
    debug!(base_url = %base_url, storage = %storage_kind, "Starting");

    let storage = Config::open_storage(storage_kind)?;
    let mut session = SessionStore::new(storage);
    session.initialize();

    let api = ApiClient::new(&base_url)?;
    let mut app = App::new(api, session);

    execute(
        cli.command,
        &mut app,
        &mut settings,
        &mut Terminal,
        &mut io::stdout(),
    )
    .await
}

/// Run one subcommand against `app`, printing the outcome to `out`
pub async fn execute(
    command: Commands,
    app: &mut App,
    settings: &mut Settings,
    prompt: &mut impl Prompt,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Signup { name, email, role } => {
            let (password, confirm) = prompt_new_password(prompt)?;
            validation::new_password(&password, &confirm)?;
            app.sign_up(&name, &email, &password, &role).await?;
            writeln!(out, "Account created for {}. You can now log in.", email.trim())?;
        }
        Commands::Login { email } => {
            let email = match email.or_else(|| settings.config.last_email.clone()) {
                Some(email) => email,
                None => prompt.line("Email: ")?,
            };
            let password = prompt.password("Password: ")?;
            let identity = app.login(&email, &password).await?;
            writeln!(out, "Logged in as {} ({})", identity.email, identity.role)?;

            settings.remember_email(&identity.email);
        }
        Commands::Logout => {
            app.logout();
            writeln!(out, "Logged out")?;
        }
        Commands::Whoami => match app.session().identity() {
            Some(identity) => writeln!(out, "{} ({})", identity.email, identity.role)?,
            None => writeln!(out, "Not logged in")?,
        },
        Commands::Event { status, lat, lng } => {
            let location = Location::new(lat, lng);
            let recorded = app.log_event(status, location).await?;
            writeln!(out, "Event logged successfully! ({} at {})", recorded, location)?;
        }
        Commands::Work { description } => {
            app.log_work(&description.join(" ")).await?;
            writeln!(out, "Work logged successfully!")?;
        }
        Commands::ForgotPassword { email } => {
            app.forgot_password(&email).await?;
            writeln!(out, "Reset link has been sent to your email.")?;
        }
        Commands::ResetPassword { link } => {
            // Reject a bad link before asking for passwords
            validation::reset_token(&link)?;
            let (password, confirm) = prompt_new_password(prompt)?;
            app.reset_password(&link, &password, &confirm).await?;
            writeln!(out, "Password reset. You can now log in with your new password.")?;
        }
        Commands::Ping => {
            if app.test_connection().await {
                writeln!(out, "Connected to {}", app.base_url())?;
            } else {
                anyhow::bail!("Could not reach {}", app.base_url());
            }
        }
    }

    Ok(())
}

/// Prompt for a new password and its confirmation
fn prompt_new_password(prompt: &mut impl Prompt) -> Result<(String, String)> {
    let password = prompt.password("New password: ")?;
    let confirm = prompt.password("Confirm password: ")?;
    Ok((password, confirm))
}
