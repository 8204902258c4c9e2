//! `tmp_cache.json`: last known address of each region.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const IP_CACHE_FILE: &str = "tmp_cache.json";

/// `{"ips": {"<region>": "<address>"}}`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpCache {
    #[serde(default)]
    ips: BTreeMap<String, String>,
}

impl IpCache {
    #[must_use]
    pub fn get(&self, region: &str) -> Option<&str> {
        self.ips.get(region).map(String::as_str)
    }

    pub fn insert(&mut self, region: &str, ip: &str) {
        self.ips.insert(region.to_string(), ip.to_string());
    }
}

/// Location of the cache file.
pub struct IpCacheFile {
    path: PathBuf,
}

impl IpCacheFile {
    /// Cache at `<root>/tmp_cache.json`.
    #[must_use]
    pub fn in_root(root: &Path) -> Self {
        Self::with_path(root.join(IP_CACHE_FILE))
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<IpCache> {
        if !self.path.exists() {
            return Ok(IpCache::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, cache: &IpCache) -> Result<()> {
        let content = serde_json::to_string_pretty(cache).context("cannot serialize ip cache")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("cannot write {}", self.path.display()))
    }
}
