use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use services::{ChoicePolicy, DEFAULT_COMPLETION_TTL_SECS, DEFAULT_SESSION_TTL_SECS};

/// Command-line and environment configuration for the survey server.
#[derive(Debug, Clone, Parser)]
#[command(name = "survey-server", version, about = "Serve multi-step surveys over HTTP")]
pub struct Args {
    /// Address to listen on.
    #[arg(long, env = "SURVEY_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// SQLite database for sessions and completion markers. In-memory when unset.
    #[arg(long = "db", env = "SURVEY_DB_URL")]
    pub db_url: Option<String>,

    /// JSON catalog file replacing the built-in surveys.
    #[arg(long, env = "SURVEY_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Serve a single survey without the selection page.
    #[arg(long = "survey", env = "SURVEY_FIXED")]
    pub fixed_survey: Option<String>,

    /// Seconds a finished survey stays blocked for the same client.
    #[arg(long, env = "SURVEY_COMPLETION_TTL_SECS", default_value_t = DEFAULT_COMPLETION_TTL_SECS)]
    pub completion_ttl_secs: i64,

    /// Idle seconds before a session is discarded.
    #[arg(long, env = "SURVEY_SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL_SECS)]
    pub session_ttl_secs: i64,

    /// Record answers even when they are not one of the offered choices.
    #[arg(long, env = "SURVEY_LENIENT_CHOICES")]
    pub lenient_choices: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Reject values clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive TTLs or a blank database URL.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.completion_ttl_secs <= 0 {
            bail!("completion TTL must be positive, got {}", self.completion_ttl_secs);
        }
        if self.session_ttl_secs <= 0 {
            bail!("session TTL must be positive, got {}", self.session_ttl_secs);
        }
        if self.db_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            bail!("--db cannot be empty");
        }
        Ok(())
    }

    #[must_use]
    pub fn choice_policy(&self) -> ChoicePolicy {
        if self.lenient_choices {
            ChoicePolicy::Lenient
        } else {
            ChoicePolicy::Strict
        }
    }

    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            2 => "trace",
            _ => "trace,hyper=debug,tower=debug",
        }
    }

    /// Normalized database URL, if one was configured.
    #[must_use]
    pub fn database_url(&self) -> Option<String> {
        self.db_url.clone().map(normalize_sqlite_url)
    }
}

/// Turn bare paths and `sqlite:` shorthands into absolute `sqlite://` URLs.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory so SQLite can open it.
///
/// # Errors
///
/// Returns an error for URLs without a path or when the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}
