use crate::error::{config_error, GcalResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client registration read from the downloaded client-secret JSON
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The console wraps the registration in `installed` or `web`
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn from_file(path: &Path) -> GcalResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Cannot read client secret file {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
            .map_err(|e| config_error(&format!("Malformed client secret file {}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" section".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_secret() {
        let secret = ClientSecret::from_json(
            r#"{"installed":{"client_id":"id.apps.googleusercontent.com","project_id":"gcal",
                "auth_uri":"https://accounts.google.com/o/oauth2/auth",
                "token_uri":"https://oauth2.googleapis.com/token",
                "client_secret":"shh","redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();

        assert_eq!(secret.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "shh");
        assert_eq!(secret.auth_uri, "https://accounts.google.com/o/oauth2/auth");
    }

    #[test]
    fn test_web_secret_with_defaults() {
        let secret =
            ClientSecret::from_json(r#"{"web":{"client_id":"id","client_secret":"shh"}}"#).unwrap();

        assert_eq!(secret.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(secret.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_malformed_secret() {
        assert!(ClientSecret::from_json("{}").is_err());
        assert!(ClientSecret::from_json("not json").is_err());
        assert!(ClientSecret::from_json(r#"{"installed":{"client_id":"id"}}"#).is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ClientSecret::from_file(Path::new("/nonexistent/client_secret.json")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }
}
