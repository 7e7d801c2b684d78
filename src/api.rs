//! osu! API v2 client.
//!
//! Used for the two lookups a raw `.osu` file cannot answer: which beatmap a
//! checksum belongs to (with its max combo), and which user id a name maps
//! to. The client authenticates once with OAuth client credentials.

use crate::config::{Config, Credentials};
use crate::error::{Error, Result};
use crate::net::{TransportError, build_agent};
use log::{debug, info};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// What the lookup service knows about a beatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatmapLookup {
    pub id: u64,
    pub beatmapset_id: u64,
    pub max_combo: u32,
}

/// Resolves identifiers that are not derivable from the beatmap file.
pub trait LookupService: Send + Sync {
    fn beatmap_by_checksum(&self, checksum: &str) -> Result<BeatmapLookup>;

    fn user_id(&self, username: &str) -> Result<u64>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct BeatmapResponse {
    id: u64,
    beatmapset_id: u64,
    max_combo: Option<u32>,
}

#[derive(Deserialize)]
struct UserResponse {
    id: u64,
}

#[derive(Clone)]
pub struct OsuApiClient {
    agent: ureq::Agent,
    api_base: String,
    user_agent: String,
    token: String,
}

impl OsuApiClient {
    /// Reads the credentials file named in `config` and authenticates.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = Credentials::load(&config.credentials_file)?;
        Self::connect(&credentials, config)
    }

    /// Exchanges client credentials for an access token.
    pub fn connect(credentials: &Credentials, config: &Config) -> Result<Self> {
        let agent = build_agent(config.request_timeout());

        let response = agent
            .post(config.endpoints.token_url.as_str())
            .header("User-Agent", config.user_agent.as_str())
            .send_form([
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", "public"),
            ]);

        let token: TokenResponse = match response {
            Ok(response) => response
                .into_body()
                .read_json()
                .map_err(|e| Error::Lookup(format!("malformed token response: {}", e)))?,
            Err(ureq::Error::StatusCode(400 | 401)) => return Err(Error::InvalidCredentials),
            Err(e) => return Err(TransportError::from(e).into()),
        };

        info!("[API] Authenticated as client {}", credentials.client_id);

        Ok(Self {
            agent,
            api_base: config.endpoints.api_base.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            token: token.access_token,
        })
    }

    /// GETs `path` under the API base. A 404 yields `None`.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.api_base, path);
        debug!("[API] GET {}", url);

        let mut request = self
            .agent
            .get(url.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .header("Authorization", format!("Bearer {}", self.token));
        for &(key, value) in query {
            request = request.query(key, value);
        }

        match request.call() {
            Ok(response) => response
                .into_body()
                .read_json()
                .map(Some)
                .map_err(|e| Error::Lookup(format!("malformed response from {}: {}", path, e))),
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(ureq::Error::StatusCode(401)) => Err(Error::InvalidCredentials),
            Err(e) => Err(TransportError::from(e).into()),
        }
    }
}

/// Percent-encodes everything but unreserved characters.
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

impl LookupService for OsuApiClient {
    fn beatmap_by_checksum(&self, checksum: &str) -> Result<BeatmapLookup> {
        let beatmap: BeatmapResponse = self
            .get_json("/beatmaps/lookup", &[("checksum", checksum)])?
            .ok_or_else(|| Error::Lookup(format!("no beatmap with checksum {}", checksum)))?;

        let max_combo = beatmap
            .max_combo
            .ok_or_else(|| Error::Lookup(format!("beatmap {} has no max combo", beatmap.id)))?;

        Ok(BeatmapLookup {
            id: beatmap.id,
            beatmapset_id: beatmap.beatmapset_id,
            max_combo,
        })
    }

    fn user_id(&self, username: &str) -> Result<u64> {
        let path = format!("/users/{}/osu", encode_path_segment(username));
        let user: UserResponse = self
            .get_json(&path, &[("key", "username")])?
            .ok_or_else(|| Error::Lookup(format!("no user named {}", username)))?;
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("peppy"), "peppy");
        assert_eq!(encode_path_segment("Mr [Ez]"), "Mr%20%5BEz%5D");
    }

    #[test]
    fn test_beatmap_response_null_combo() {
        let body: BeatmapResponse =
            serde_json::from_str(r#"{"id":42,"beatmapset_id":7,"max_combo":null,"mode":"osu"}"#)
                .unwrap();
        assert_eq!(body.id, 42);
        assert_eq!(body.beatmapset_id, 7);
        assert_eq!(body.max_combo, None);
    }
}
