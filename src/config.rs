//! Runtime configuration and API credentials.
//!
//! `Config` is read from a TOML file; every field has a default so a missing
//! file simply yields [`Config::default`]. Credentials are kept apart in a
//! plain text file holding the OAuth client id and secret on two lines.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("osrpp/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache_dir: PathBuf,
    pub credentials_file: PathBuf,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache"),
            credentials_file: PathBuf::from("apikey.txt"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "[Config] {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        load_toml(path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Remote addresses. `{id}`, `{set_id}` and `{user_id}` are substituted.
/// The `default_*` addresses serve the fallback assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub beatmap_url: String,
    pub background_url: String,
    pub avatar_url: String,
    pub default_background_url: String,
    pub default_avatar_url: String,
    pub api_base: String,
    pub token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            beatmap_url: "https://osu.ppy.sh/osu/{id}".to_string(),
            background_url: "https://assets.ppy.sh/beatmaps/{set_id}/covers/fullsize.jpg"
                .to_string(),
            avatar_url: "https://a.ppy.sh/{user_id}".to_string(),
            default_background_url:
                "https://assets.ppy.sh/contests/154/winners/Dreamxiety.png".to_string(),
            // The avatar host serves the guest avatar without an id.
            default_avatar_url: "https://a.ppy.sh/".to_string(),
            api_base: "https://osu.ppy.sh/api/v2".to_string(),
            token_url: "https://osu.ppy.sh/oauth/token".to_string(),
        }
    }
}

impl Endpoints {
    pub fn beatmap(&self, id: u64) -> String {
        self.beatmap_url.replace("{id}", &id.to_string())
    }

    pub fn background(&self, set_id: u64) -> String {
        self.background_url.replace("{set_id}", &set_id.to_string())
    }

    pub fn avatar(&self, user_id: u64) -> String {
        self.avatar_url.replace("{user_id}", &user_id.to_string())
    }
}

/// OAuth client credentials for the osu! API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::ConfigurationMissing(format!(
                "cannot read {} ({}), put your client id and secret on separate lines there",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text).map_err(|_| {
            Error::ConfigurationMissing(format!(
                "please put your client id and secret on separate lines in {}",
                path.display()
            ))
        })
    }

    /// Reads the client id and secret from the first two lines.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim);
        match (lines.next(), lines.next()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok(Self {
                client_id: id.to_string(),
                client_secret: secret.to_string(),
            }),
            _ => Err(Error::ConfigurationMissing(
                "expected client id and secret on separate lines".to_string(),
            )),
        }
    }
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        log::error!("Failed to parse TOML file {:?}: {}", path, e);
        Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("osrpp.toml")).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from(".cache"));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osrpp.toml");
        fs::write(
            &path,
            "cache_dir = \"/var/cache/osrpp\"\n\n[endpoints]\nbeatmap_url = \"http://mirror/osu/{id}\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/osrpp"));
        assert_eq!(config.endpoints.beatmap(75), "http://mirror/osu/75");
        assert_eq!(
            config.endpoints.background(41823),
            "https://assets.ppy.sh/beatmaps/41823/covers/fullsize.jpg"
        );
        assert_eq!(config.credentials_file, PathBuf::from("apikey.txt"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osrpp.toml");
        fs::write(&path, "cache_dir = [").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn test_credentials_parse() {
        let creds = Credentials::parse("12345\r\nsecret\nextra\n").unwrap();
        assert_eq!(creds.client_id, "12345");
        assert_eq!(creds.client_secret, "secret");
        assert!(!format!("{:?}", creds).contains("\"secret\""));
    }

    #[test]
    fn test_credentials_malformed() {
        for text in ["", "only-one-line", "\nsecret", "id\n   \n"] {
            assert!(matches!(
                Credentials::parse(text),
                Err(Error::ConfigurationMissing(_))
            ));
        }
    }

    #[test]
    fn test_credentials_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::load(&dir.path().join("apikey.txt")).unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(_)));
    }
}
