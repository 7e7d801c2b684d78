//! Resolves beatmap ids, checksums and paths into parsed [`Beatmap`]s.
//!
//! Raw files are looked up in the [`CacheStore`] first and only downloaded
//! on a miss. Checksums go through the [`LookupService`], which also supplies
//! the max combo that `.osu` files never contain.

use crate::api::LookupService;
use crate::beatmap::{Beatmap, BeatmapParser};
use crate::cache::{CacheEntry, CacheStore, DEFAULT_AVATAR, DEFAULT_BACKGROUND};
use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::net::{Transport, TransportError};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub struct BeatmapRepository<T: Transport> {
    cache: CacheStore,
    transport: T,
    endpoints: Endpoints,
    parser: BeatmapParser,
    lookup: Option<Box<dyn LookupService>>,
}

impl<T: Transport> BeatmapRepository<T> {
    /// A repository without a lookup client. Id and path loads work;
    /// checksum loads fail with [`Error::LookupUnavailable`].
    pub fn new(cache: CacheStore, transport: T, endpoints: Endpoints) -> Self {
        Self {
            cache,
            transport,
            endpoints,
            parser: BeatmapParser::new(),
            lookup: None,
        }
    }

    pub fn with_lookup(mut self, lookup: impl LookupService + 'static) -> Self {
        self.lookup = Some(Box::new(lookup));
        self
    }

    pub fn with_parser(mut self, parser: BeatmapParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    /// Parses a local file. The cache is not consulted.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Beatmap> {
        Beatmap::from_file(path, &self.parser)
    }

    /// Loads a beatmap by id, downloading the raw file on a cache miss.
    pub fn load_id(&self, id: u64) -> Result<Beatmap> {
        let entry = CacheEntry::Beatmap(id);

        let path = if self.cache.exists(entry) {
            debug!("[Cache] Beatmap {} found in cache", id);
            self.cache.path(entry)
        } else {
            info!("[API] Getting beatmap {} from osu! /osu/", id);
            let bytes = self.download(&self.endpoints.beatmap(id)).map_err(|source| {
                warn!("[API] Failed to get beatmap file from osu!: {}", source);
                Error::BeatmapUnavailable { id, source }
            })?;
            self.cache.write(entry, &bytes)?
        };

        self.load_path(path)
    }

    /// Loads a beatmap by MD5 checksum. The max combo reported by the lookup
    /// service replaces whatever the file produced.
    pub fn load_checksum(&self, checksum: &str) -> Result<Beatmap> {
        let lookup = self.lookup.as_deref().ok_or(Error::LookupUnavailable)?;
        if !is_md5_hex(checksum) {
            return Err(Error::InvalidChecksum(checksum.to_string()));
        }

        let resolved = lookup.beatmap_by_checksum(checksum)?;
        debug!(
            "[API] Checksum {} is beatmap {} (max combo {})",
            checksum, resolved.id, resolved.max_combo
        );

        let mut beatmap = self.load_id(resolved.id)?;
        beatmap.enrich(&resolved);
        Ok(beatmap)
    }

    /// Downloads the fallback assets that are not in the cache yet and
    /// returns how many were fetched. Failures are logged, not fatal.
    pub fn ensure_default_assets(&self) -> usize {
        let assets = [
            (DEFAULT_BACKGROUND, self.endpoints.default_background_url.as_str()),
            (DEFAULT_AVATAR, self.endpoints.default_avatar_url.as_str()),
        ];

        let mut fetched = 0;
        for (name, url) in assets {
            let entry = CacheEntry::Asset(name);
            if self.cache.exists(entry) {
                continue;
            }

            info!("[Startup] Getting default asset {}", name);
            let written = self
                .download(url)
                .map_err(Error::from)
                .and_then(|bytes| self.cache.write(entry, &bytes));
            match written {
                Ok(_) => fetched += 1,
                Err(e) => warn!(
                    "[Startup] Failed to get {} ({}), you might want to put your own file at {}",
                    name,
                    e,
                    self.cache.path(entry).display()
                ),
            }
        }
        fetched
    }

    /// Path of the beatmap's background image, downloading it if needed.
    /// Falls back to the default background on any failure, or when the
    /// beatmap has no set id.
    pub fn background(&self, beatmap: &Beatmap) -> PathBuf {
        let set_id = beatmap.set_id();
        if set_id == 0 {
            debug!("[API] Beatmap has no set id, using the default background");
            return self.cache.default_asset(DEFAULT_BACKGROUND);
        }

        let entry = CacheEntry::Background(set_id);
        if self.cache.exists(entry) {
            return self.cache.path(entry);
        }

        info!("[API] Getting background for beatmap set {}", set_id);
        let fetched = self
            .download(&self.endpoints.background(set_id))
            .map_err(Error::from)
            .and_then(|bytes| self.cache.write(entry, &bytes));

        match fetched {
            Ok(path) => path,
            Err(e) => {
                warn!("[API] Failed to get beatmap background ({}), using the default one", e);
                self.cache.default_asset(DEFAULT_BACKGROUND)
            }
        }
    }

    /// Path of a player's avatar, downloading it if needed.
    /// Falls back to the default avatar when it cannot be resolved.
    pub fn avatar(&self, username: &str) -> PathBuf {
        let entry = CacheEntry::Avatar(username);
        if !entry.is_valid() {
            warn!("[API] {:?} is not a usable avatar name, using the default avatar", username);
            return self.cache.default_asset(DEFAULT_AVATAR);
        }
        if self.cache.exists(entry) {
            return self.cache.path(entry);
        }

        let Some(lookup) = self.lookup.as_deref() else {
            warn!("[API] No API credentials, using the default avatar for {}", username);
            return self.cache.default_asset(DEFAULT_AVATAR);
        };

        info!("[API] Downloading {}'s avatar", username);
        let fetched = lookup.user_id(username).and_then(|user_id| {
            let bytes = self.download(&self.endpoints.avatar(user_id))?;
            self.cache.write(entry, &bytes)
        });

        match fetched {
            Ok(path) => path,
            Err(e) => {
                warn!("[API] Failed to get {}'s avatar ({}), using the default one", username, e);
                self.cache.default_asset(DEFAULT_AVATAR)
            }
        }
    }

    fn download(&self, url: &str) -> std::result::Result<Vec<u8>, TransportError> {
        let bytes = self.transport.fetch(url)?;
        if bytes.is_empty() {
            return Err(TransportError::EmptyBody);
        }
        Ok(bytes)
    }
}

fn is_md5_hex(checksum: &str) -> bool {
    checksum.len() == 32 && checksum.bytes().all(|b| b.is_ascii_hexdigit())
}
