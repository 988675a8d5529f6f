use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(gcal::environment), help("set it in the environment or in a .env file"))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(gcal::config))]
    Config(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(code(gcal::auth))]
    Auth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(gcal::google_calendar))]
    GoogleCalendar(String),

    #[error("Failed to fetch events for calendar '{calendar_id}'")]
    #[diagnostic(code(gcal::source_fetch_failed))]
    SourceFetchFailed {
        calendar_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Usage error: {0}")]
    #[diagnostic(code(gcal::usage), help("run `gcal --help` for usage"))]
    Usage(String),

    #[error(transparent)]
    #[diagnostic(code(gcal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gcal::serialization))]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type GcalResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create usage errors
pub fn usage_error(message: &str) -> Error {
    Error::Usage(message.to_string())
}
