use crate::error::{config_error, env_error, GcalResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Zone used for day windows when nothing else is configured
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// Token cache file used when nothing else is configured
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Calendar queried when no ids are given on the command line
pub const DEFAULT_CALENDAR: &str = "primary";

/// Optional config file read when `GCAL_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "gcal.toml";

/// Settings that may come from the optional TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub timezone: Option<String>,
    pub calendars: Option<Vec<String>>,
    pub credentials_path: Option<PathBuf>,
}

/// Main configuration structure for the tool
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client-secret JSON downloaded from the Google console
    pub client_secret_path: PathBuf,
    /// Where the access/refresh token is cached between runs
    pub credentials_path: PathBuf,
    /// Zone that defines "a day" and how times are displayed
    pub timezone: Tz,
    /// Calendars used when the command line names none
    pub default_calendars: Vec<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> GcalResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let config_path = env::var("GCAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let file = match fs::read_to_string(&config_path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Self::from_sources(|key| env::var(key).ok(), file.as_deref())
    }

    /// Build a config from an environment lookup and optional TOML file content.
    ///
    /// Environment values win over the file, the file wins over defaults.
    pub fn from_sources<F>(lookup: F, file: Option<&str>) -> GcalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match file {
            Some(content) => toml::from_str(content)?,
            None => FileConfig::default(),
        };

        let client_secret_path = lookup("GCAL_CLIENT_SECRET_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| env_error("GCAL_CLIENT_SECRET_PATH"))?;

        let credentials_path = lookup("GCAL_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .or(file.credentials_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        let timezone_str = lookup("GCAL_TIMEZONE")
            .or(file.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = parse_timezone(&timezone_str)?;

        let default_calendars = match lookup("GCAL_CALENDARS") {
            Some(ids) => split_calendar_ids(&ids),
            None => match file.calendars {
                Some(ids) => dedup_calendar_ids(ids.iter().map(String::as_str)),
                None => vec![DEFAULT_CALENDAR.to_string()],
            },
        };

        Ok(Config {
            client_secret_path,
            credentials_path,
            timezone,
            default_calendars,
        })
    }
}

/// Parse an IANA zone name
pub fn parse_timezone(name: &str) -> GcalResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| config_error(&format!("Invalid timezone: {}", name)))
}

/// Split a comma-separated id list, dropping blanks and repeats
pub fn split_calendar_ids(raw: &str) -> Vec<String> {
    dedup_calendar_ids(raw.split(','))
}

/// Trim ids, dropping blanks and repeats while keeping first-seen order
fn dedup_calendar_ids<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.into_iter().map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_sources(lookup_from(&[("GCAL_CLIENT_SECRET_PATH", "secret.json")]), None)
                .unwrap();

        assert_eq!(config.client_secret_path, PathBuf::from("secret.json"));
        assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        assert_eq!(config.timezone, chrono_tz::Asia::Tokyo);
        assert_eq!(config.default_calendars, vec!["primary".to_string()]);
    }

    #[test]
    fn test_missing_client_secret() {
        let err = Config::from_sources(lookup_from(&[]), None).unwrap_err();
        assert!(err.to_string().contains("GCAL_CLIENT_SECRET_PATH"));
    }

    #[test]
    fn test_invalid_timezone() {
        let err = Config::from_sources(
            lookup_from(&[
                ("GCAL_CLIENT_SECRET_PATH", "secret.json"),
                ("GCAL_TIMEZONE", "Mars/Olympus"),
            ]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = r#"
            timezone = "Europe/Helsinki"
            calendars = ["work@example.com", "home@example.com"]
            credentials_path = "/tmp/token.json"
        "#;

        let config = Config::from_sources(
            lookup_from(&[
                ("GCAL_CLIENT_SECRET_PATH", "secret.json"),
                ("GCAL_TIMEZONE", "UTC"),
            ]),
            Some(file),
        )
        .unwrap();

        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/token.json"));
        assert_eq!(
            config.default_calendars,
            vec!["work@example.com".to_string(), "home@example.com".to_string()]
        );
    }

    #[test]
    fn test_unknown_file_key_is_rejected() {
        let result = Config::from_sources(
            lookup_from(&[("GCAL_CLIENT_SECRET_PATH", "secret.json")]),
            Some("colour = \"blue\""),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_file_calendars_are_normalized() {
        let config = Config::from_sources(
            lookup_from(&[("GCAL_CLIENT_SECRET_PATH", "secret.json")]),
            Some(r#"calendars = [" work", "", "personal ", "work"]"#),
        )
        .unwrap();

        assert_eq!(config.default_calendars, vec!["work", "personal"]);
    }

    #[test]
    fn test_split_calendar_ids() {
        assert_eq!(split_calendar_ids("work,personal"), vec!["work", "personal"]);
        assert_eq!(split_calendar_ids(" work , ,work,personal,"), vec!["work", "personal"]);
        assert!(split_calendar_ids(",,").is_empty());
    }
}
