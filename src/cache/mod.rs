//! On-disk cache for downloaded beatmaps and images.
//!
//! Files live under a single root:
//! - `osu/{id}` raw `.osu` text
//! - `osu/{set_id}_bg.png` beatmap background
//! - `avatar/{username}` player avatar
//! - `{name}` fallback assets in the root
//!
//! The file itself is the only state: if it exists it is a hit. Entries are
//! never expired or verified.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const BEATMAP_DIR: &str = "osu";
const AVATAR_DIR: &str = "avatar";

/// Fallback shown when a background cannot be downloaded.
pub const DEFAULT_BACKGROUND: &str = "default_background.png";
/// Fallback shown when an avatar cannot be downloaded.
pub const DEFAULT_AVATAR: &str = "default_avatar.png";

/// A cached resource, identified by category and key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEntry<'a> {
    /// Raw beatmap file by beatmap id.
    Beatmap(u64),
    /// Background image by beatmap set id.
    Background(u64),
    /// Avatar image by username.
    Avatar(&'a str),
    /// Fallback asset stored in the root, such as [`DEFAULT_AVATAR`].
    Asset(&'a str),
}

impl CacheEntry<'_> {
    /// Whether the entry's key stays inside its directory. Names are used
    /// as a single file name, so separators and dot components are refused.
    pub fn is_valid(&self) -> bool {
        match self {
            CacheEntry::Beatmap(_) | CacheEntry::Background(_) => true,
            CacheEntry::Avatar(name) | CacheEntry::Asset(name) => is_file_name(name),
        }
    }
}

fn is_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', ':', '\0'])
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root and every category directory.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [BEATMAP_DIR, AVATAR_DIR] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    /// Deterministic location of `entry`, whether or not it exists.
    pub fn path(&self, entry: CacheEntry<'_>) -> PathBuf {
        match entry {
            CacheEntry::Beatmap(id) => self.root.join(BEATMAP_DIR).join(id.to_string()),
            CacheEntry::Background(set_id) => {
                self.root.join(BEATMAP_DIR).join(format!("{}_bg.png", set_id))
            }
            CacheEntry::Avatar(username) => self.root.join(AVATAR_DIR).join(username),
            CacheEntry::Asset(name) => self.root.join(name),
        }
    }

    /// Invalid entries never exist.
    pub fn exists(&self, entry: CacheEntry<'_>) -> bool {
        entry.is_valid() && self.path(entry).is_file()
    }

    pub fn read(&self, entry: CacheEntry<'_>) -> Result<Vec<u8>> {
        let path = self.checked_path(entry)?;
        if !path.is_file() {
            return Err(Error::CacheMiss(path));
        }
        Ok(fs::read(path)?)
    }

    /// Stores `bytes` for `entry`, replacing any previous content.
    ///
    /// The data is written to a temporary file next to the destination and
    /// renamed into place, so readers never see a partial file.
    pub fn write(&self, entry: CacheEntry<'_>, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.checked_path(entry)?;
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(bytes)?;
        file.persist(&path).map_err(|e| Error::Io(e.error))?;

        debug!("[Cache] Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Location of a fallback asset such as [`DEFAULT_BACKGROUND`].
    pub fn default_asset(&self, name: &str) -> PathBuf {
        self.path(CacheEntry::Asset(name))
    }

    fn checked_path(&self, entry: CacheEntry<'_>) -> Result<PathBuf> {
        match entry {
            CacheEntry::Avatar(name) | CacheEntry::Asset(name) if !entry.is_valid() => {
                Err(Error::InvalidCacheKey(name.to_string()))
            }
            _ => Ok(self.path(entry)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let cache = CacheStore::new("/tmp/cache");
        assert_eq!(
            cache.path(CacheEntry::Beatmap(2690223)),
            Path::new("/tmp/cache/osu/2690223")
        );
        assert_eq!(
            cache.path(CacheEntry::Background(1285)),
            Path::new("/tmp/cache/osu/1285_bg.png")
        );
        assert_eq!(
            cache.path(CacheEntry::Avatar("peppy")),
            Path::new("/tmp/cache/avatar/peppy")
        );
        assert_eq!(
            cache.default_asset(DEFAULT_AVATAR),
            Path::new("/tmp/cache/default_avatar.png")
        );
    }

    #[test]
    fn test_write_read_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let entry = CacheEntry::Beatmap(1);

        assert!(!cache.exists(entry));
        assert!(matches!(cache.read(entry), Err(Error::CacheMiss(_))));

        // Parent directories are created on demand.
        let path = cache.write(entry, b"first").unwrap();
        assert_eq!(path, dir.path().join("osu").join("1"));
        assert!(cache.exists(entry));
        assert_eq!(cache.read(entry).unwrap(), b"first");

        cache.write(entry, b"second").unwrap();
        assert_eq!(cache.read(entry).unwrap(), b"second");

        // No temporary files are left behind.
        let files = fs::read_dir(dir.path().join("osu")).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path().join("nested"));
        cache.ensure_directories().unwrap();
        assert!(dir.path().join("nested/osu").is_dir());
        assert!(dir.path().join("nested/avatar").is_dir());
    }

    #[test]
    fn test_avatar_names_cannot_leave_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path().join("cache"));

        for name in ["../../escaped", "/tmp/escaped", "a/b", "a\\b", "C:x", "..", ".", ""] {
            let entry = CacheEntry::Avatar(name);
            assert!(!entry.is_valid(), "{:?}", name);
            assert!(!cache.exists(entry));
            assert!(matches!(
                cache.write(entry, b"img"),
                Err(Error::InvalidCacheKey(_))
            ));
            assert!(matches!(cache.read(entry), Err(Error::InvalidCacheKey(_))));
        }
        assert!(!dir.path().join("escaped").exists());

        for name in ["peppy", "Mr. Ekko", "-GN", "a..b"] {
            assert!(CacheEntry::Avatar(name).is_valid(), "{:?}", name);
        }
    }
}
