//! Infrastructure implementation of the `TargetResolver` port.
//!
//! Region servers are provisioned out of band; their public address is read
//! back from the Terragrunt state of `terraform/main/regions/<region>`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::{CommandRunner, TargetResolver};
use crate::infra::ip_cache::IpCacheFile;

/// Reads `public_ip` from each region's Terragrunt outputs.
pub struct TerragruntResolver<R> {
    runner: R,
    regions_dir: PathBuf,
}

impl<R: CommandRunner> TerragruntResolver<R> {
    /// Resolver for the deployment checkout at `root`.
    #[must_use]
    pub fn new(runner: R, root: &Path) -> Self {
        Self {
            runner,
            regions_dir: root.join("terraform").join("main").join("regions"),
        }
    }

    #[must_use]
    pub fn region_dir(&self, region: &str) -> PathBuf {
        self.regions_dir.join(region)
    }
}

impl<R: CommandRunner> TargetResolver for TerragruntResolver<R> {
    async fn resolve(&self, region: &str) -> Result<String> {
        let dir = self.region_dir(region);
        anyhow::ensure!(
            dir.is_dir(),
            "no terragrunt configuration for region {region} at {}",
            dir.display()
        );
        let output = self
            .runner
            .run_in_dir(&dir, "terragrunt", &["output", "-raw", "public_ip"])
            .await
            .context("terragrunt output")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("terragrunt output failed: {}", stderr.trim());
        }
        let ip = parse_public_ip(&String::from_utf8_lossy(&output.stdout))?;
        debug!(region, %ip, "resolved public ip");
        Ok(ip)
    }
}

/// Extract the address from `terragrunt output -raw` stdout.
///
/// # Errors
///
/// Returns an error when the output is empty once whitespace and quotes are
/// stripped.
pub fn parse_public_ip(stdout: &str) -> Result<String> {
    let ip = stdout.trim().trim_matches('"').trim();
    anyhow::ensure!(!ip.is_empty(), "terragrunt returned no public_ip");
    Ok(ip.to_string())
}

/// Wraps a resolver with the on-disk address cache used by `shell`.
pub struct CachedTargets<T> {
    inner: T,
    cache: IpCacheFile,
    use_cache: bool,
}

impl<T: TargetResolver> CachedTargets<T> {
    /// With `use_cache == false` every lookup goes to `inner`; the result is
    /// still written back.
    #[must_use]
    pub fn new(inner: T, cache: IpCacheFile, use_cache: bool) -> Self {
        Self {
            inner,
            cache,
            use_cache,
        }
    }
}

impl<T: TargetResolver> TargetResolver for CachedTargets<T> {
    async fn resolve(&self, region: &str) -> Result<String> {
        let mut cache = self.cache.load()?;
        if self.use_cache {
            if let Some(ip) = cache.get(region) {
                debug!(region, ip, "using cached address");
                return Ok(ip.to_string());
            }
        }
        let ip = self.inner.resolve(region).await?;
        cache.insert(region, &ip);
        self.cache.save(&cache)?;
        Ok(ip)
    }
}
