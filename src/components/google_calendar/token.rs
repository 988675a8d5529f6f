use super::secret::ClientSecret;
use crate::error::{auth_error, Error, GcalResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

/// Read-only access is all the tool needs
pub const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Local port the browser is redirected to after consent
pub const REDIRECT_PORT: u16 = 8080;

/// Treat tokens this close to expiry as already expired
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token cached between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS > now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

/// Obtains an access token from the cache file, a refresh, or the browser flow
#[derive(Clone)]
pub struct TokenManager {
    secret: ClientSecret,
    path: PathBuf,
    client: Client,
}

impl TokenManager {
    pub fn new(secret: ClientSecret, path: PathBuf) -> Self {
        Self {
            secret,
            path,
            client: Client::new(),
        }
    }

    /// Get a usable token, refreshing or re-authorizing when needed
    pub async fn get_token(&self) -> GcalResult<StoredToken> {
        let now = Utc::now().timestamp();

        match self.load() {
            Some(token) if token.is_fresh(now) => {
                debug!("Using cached token from {}", self.path.display());
                Ok(token)
            }
            Some(token) if token.refresh_token.is_some() => {
                info!("Access token expired, refreshing");
                self.refresh_token(&token).await
            }
            _ => self.authorize().await,
        }
    }

    /// Read the cache file; an unreadable cache counts as no cache
    fn load(&self) -> Option<StoredToken> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring unreadable token cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, token: &StoredToken) -> GcalResult<()> {
        let content = serde_json::to_string_pretty(token)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        // mode() only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &StoredToken) -> GcalResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| auth_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.secret.client_id.clone()),
            ("client_secret", self.secret.client_secret.clone()),
            ("refresh_token", refresh_token.clone()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self.request_token(&params).await.map_err(|e| match e {
            Error::Auth(message) => auth_error(&format!(
                "{} (delete {} to authorize again)",
                message,
                self.path.display()
            )),
            other => other,
        })?;

        let refreshed = StoredToken {
            access_token: response.access_token,
            // Google only sometimes rotates the refresh token
            refresh_token: response.refresh_token.or(Some(refresh_token)),
            expires_at: Utc::now().timestamp() + response.expires_in.unwrap_or(3600),
        };
        self.save(&refreshed)?;

        Ok(refreshed)
    }

    /// Run the installed-app consent flow in the user's browser
    async fn authorize(&self) -> GcalResult<StoredToken> {
        let state = uuid::Uuid::new_v4().to_string();
        let redirect_uri = format!("http://127.0.0.1:{}", REDIRECT_PORT);

        let mut auth_url = Url::parse(&self.secret.auth_uri)
            .map_err(|e| auth_error(&format!("Invalid auth_uri: {}", e)))?;
        auth_url
            .query_pairs_mut()
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", SCOPE)
            .append_pair("state", &state);

        let server = tiny_http::Server::http(("127.0.0.1", REDIRECT_PORT))
            .map_err(|e| auth_error(&format!("Cannot listen for the authorization callback: {}", e)))?;

        eprintln!("Opening browser for Google Calendar authorization...");
        eprintln!("If it does not open, visit:\n{}", auth_url);
        if let Err(e) = webbrowser::open(auth_url.as_str()) {
            warn!("Could not open a browser: {}", e);
        }

        let code = tokio::task::spawn_blocking(move || wait_for_code(server, &state))
            .await
            .map_err(|e| auth_error(&format!("Callback listener failed: {}", e)))??;

        let params = [
            ("client_id", self.secret.client_id.clone()),
            ("client_secret", self.secret.client_secret.clone()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code".to_string()),
        ];
        let response = self.request_token(&params).await?;

        let token = StoredToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now().timestamp() + response.expires_in.unwrap_or(3600),
        };
        self.save(&token)?;
        eprintln!("Storing credentials to {}", self.path.display());

        Ok(token)
    }

    async fn request_token(&self, params: &[(&str, String)]) -> GcalResult<TokenResponse> {
        let response = self
            .client
            .post(&self.secret.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Token request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))
    }
}

/// Block until the browser delivers the authorization code
fn wait_for_code(server: tiny_http::Server, state: &str) -> GcalResult<String> {
    eprintln!("Waiting for authorization callback...");

    for request in server.incoming_requests() {
        let outcome = match parse_callback(request.url(), state) {
            Some(outcome) => outcome,
            None => {
                // favicon, stray or forged requests
                debug!("Ignoring request to {}", request.url());
                request.respond(tiny_http::Response::empty(tiny_http::StatusCode(404)))?;
                continue;
            }
        };

        let message = match &outcome {
            Ok(_) => "Authorization successful! You can close this window.".to_string(),
            Err(e) => format!("Authorization failed: {}", e),
        };
        request.respond(tiny_http::Response::from_string(message))?;

        return outcome.map_err(|e| auth_error(&e));
    }

    Err(auth_error("Callback listener stopped before authorization completed"))
}

/// Interpret a request path hitting the redirect listener.
///
/// `None` means the request is not a callback for this flow: a stray
/// request, or one whose `state` does not match.
pub fn parse_callback(path: &str, expected_state: &str) -> Option<Result<String, String>> {
    let url = Url::parse(&format!("http://127.0.0.1{}", path)).ok()?;
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if params.get("state").map(String::as_str) != Some(expected_state) {
        return None;
    }
    if let Some(error) = params.get("error") {
        return Some(Err(format!("Google returned '{}'", error)));
    }
    params.get("code").map(|code| Ok(code.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness() {
        let token = StoredToken {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at: 1_000,
        };

        assert!(token.is_fresh(900));
        assert!(!token.is_fresh(950));
        assert!(!token.is_fresh(2_000));
    }

    #[test]
    fn test_token_file_format() {
        let token: StoredToken =
            serde_json::from_str(r#"{"access_token":"ya29","expires_at":1700000000}"#).unwrap();
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.expires_at, 1_700_000_000);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("gcal-token-{}.json", uuid::Uuid::new_v4()));
        let secret = ClientSecret::from_json(r#"{"installed":{"client_id":"id","client_secret":"s"}}"#).unwrap();
        let manager = TokenManager::new(secret, path.clone());
        let token = StoredToken {
            access_token: "ya29".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: 42,
        };

        manager.save(&token).unwrap();
        assert_eq!(manager.load(), Some(token));

        fs::write(&path, "garbage").unwrap();
        assert_eq!(manager.load(), None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(
            parse_callback("/?state=abc&code=4%2F0Ab", "abc"),
            Some(Ok("4/0Ab".to_string()))
        );
        assert!(matches!(parse_callback("/?error=access_denied&state=abc", "abc"), Some(Err(_))));
        assert_eq!(parse_callback("/favicon.ico", "abc"), None);
        assert_eq!(parse_callback("/?state=abc", "abc"), None);
    }

    #[test]
    fn test_parse_callback_ignores_wrong_state() {
        assert_eq!(parse_callback("/?state=zzz&code=4", "abc"), None);
        assert_eq!(parse_callback("/?code=4", "abc"), None);
        // an error without our state must not abort the flow
        assert_eq!(parse_callback("/?error=access_denied&state=zzz", "abc"), None);
        assert_eq!(parse_callback("/?error=access_denied", "abc"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_token_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!("gcal-token-{}.json", uuid::Uuid::new_v4()));
        let secret = ClientSecret::from_json(r#"{"installed":{"client_id":"id","client_secret":"s"}}"#).unwrap();
        let manager = TokenManager::new(secret, path.clone());
        let token = StoredToken {
            access_token: "ya29".to_string(),
            refresh_token: None,
            expires_at: 42,
        };

        manager.save(&token).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // overwriting an existing, wider file tightens it too
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        manager.save(&token).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(manager.load(), Some(token));

        fs::remove_file(&path).unwrap();
    }
}
