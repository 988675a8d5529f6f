//! Google Calendar v3 as the event source, plus the OAuth plumbing to reach it.

pub mod client;
pub mod models;
pub mod secret;
pub mod token;

pub use client::GoogleCalendarClient;
pub use secret::ClientSecret;
pub use token::TokenManager;

use crate::config::Config;
use crate::error::GcalResult;
use tracing::debug;

/// Acquire credentials and return a client authorized to read calendars
pub async fn connect(config: &Config) -> GcalResult<GoogleCalendarClient> {
    let secret = ClientSecret::from_file(&config.client_secret_path)?;
    let token_manager = TokenManager::new(secret, config.credentials_path.clone());
    let token = token_manager.get_token().await?;
    debug!("Authorized Google Calendar client");

    GoogleCalendarClient::new(token.access_token)
}
