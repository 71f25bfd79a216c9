pub mod employees;
pub mod shifts;

use std::future::Future;

use clap::Subcommand;
use core::time::Duration;
use hotschedules_api::{Client, Credentials};
use indicatif::ProgressBar;
use inquire::{Password, Text};
use log::warn;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::persistence::{self, Settings};

/// Skips the password prompt when set
const PASSWORD_VAR: &str = "HOTSCHEDULES_PASSWORD";

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Configure this client
    Configure {
        #[command(subcommand)]
        command: ConfigureCommands,
    },

    /// List active employees
    Employees,

    /// List posted shifts
    Shifts(shifts::Command),
}

#[derive(Debug, Subcommand)]
pub enum ConfigureCommands {
    Username { value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    ApiError(hotschedules_api::Error),
    Config(String),
    Format(String),
    InvalidRange(Date, Date),
    Prompt(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiError(e) => write!(f, "{e}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Format(e) => write!(f, "{e}"),
            Self::InvalidRange(start, end) => write!(f, "End date {end} lies before start date {start}"),
            Self::Prompt(e) => write!(f, "{e}"),
        }
    }
}

impl From<hotschedules_api::Error> for Error {
    fn from(value: hotschedules_api::Error) -> Self {
        Error::ApiError(value)
    }
}

impl From<time::error::Format> for Error {
    fn from(value: time::error::Format) -> Self {
        Error::Format(format!("{value}"))
    }
}

impl From<inquire::InquireError> for Error {
    fn from(value: inquire::InquireError) -> Self {
        Error::Prompt(format!("{value}"))
    }
}

pub async fn execute(command: &Commands) -> Result<()> {
    match command {
        Commands::Employees => employees::execute().await,
        Commands::Shifts(cmd) => shifts::execute(cmd).await,
        Commands::Configure { command } => {
            let mut cfg = Settings::load()?;
            match command {
                ConfigureCommands::Username { value } => cfg.username = Some(value.to_string()),
            }
            cfg.store()
        }
    }
}

/// Builds a client from the stored settings, resuming the last session when possible
fn open_client() -> Result<Client> {
    let settings = Settings::load()?;
    let username = match settings.username {
        Some(username) => username,
        None => Text::new("Username").prompt()?,
    };
    let password = match std::env::var(PASSWORD_VAR) {
        Ok(password) => password,
        Err(_) => Password::new("Password").without_confirmation().prompt()?,
    };

    let client = Client::new(Credentials::new(username, password))?;
    if let Some(path) = persistence::cookie_file().filter(|path| path.exists()) {
        if let Err(e) = client.load_cookies(&path) {
            warn!("Ignoring saved session: {e}");
        }
    }
    Ok(client)
}

fn save_session(client: &Client) -> Result<()> {
    if let Some(path) = persistence::cookie_file() {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| Error::Config(format!("Could not create {}: {e}", dir.display())))?;
        }
        client.save_cookies(&path)?;
    }
    Ok(())
}

async fn wrap_in_spinner<T, F>(f: F) -> T
where
    F: Future<Output = T>,
{
    if !crate::is_interactive() {
        return f.await;
    }
    let s = start_spinner();
    let result = f.await;
    s.finish_and_clear();
    result
}

fn start_spinner() -> ProgressBar {
    let s = ProgressBar::new_spinner();
    s.set_message("Connecting with HotSchedules...");
    s.enable_steady_tick(Duration::new(0, 100_000_000));
    s
}

fn today() -> Date {
    // now_local() fails on unix once other threads are running
    OffsetDateTime::now_utc().to_offset(local_offset()).date()
}

fn local_offset() -> UtcOffset {
    local_offset_at(OffsetDateTime::now_utc())
}

fn local_offset_at(time: OffsetDateTime) -> UtcOffset {
    UtcOffset::local_offset_at(time).unwrap_or_else(|_| {
        tzdb::local_tz()
            .and_then(|tz| tz.find_local_time_type(time.unix_timestamp()).ok())
            .and_then(|local| UtcOffset::from_whole_seconds(local.ut_offset()).ok())
            .unwrap_or(UtcOffset::UTC)
    })
}
