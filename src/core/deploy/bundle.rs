// src/core/deploy/bundle.rs

//! Materializes the node installation template from the configured bundle.

use super::tree::copy_tree;
use crate::config::DeploymentOptions;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Produces an install-template directory from a packaged bundle.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Unpacks the bundle into `work_dir` and returns the template directory.
    /// Everything written must live under `work_dir`; the caller deletes it afterwards.
    async fn unpack(&self, options: &DeploymentOptions, work_dir: &Path) -> io::Result<PathBuf>;
}

/// A bundle shipped as an already unpacked directory at `bundle.file-name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryBundle;

#[async_trait]
impl BundleSource for DirectoryBundle {
    async fn unpack(&self, options: &DeploymentOptions, work_dir: &Path) -> io::Result<PathBuf> {
        let src = options.bundle_file_name();
        if !tokio::fs::metadata(&src).await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("bundle '{}' is not a directory", src.display()),
            ));
        }
        let dest = work_dir.join(format!(
            "{}-{}",
            options.bundle_name(),
            options.bundle_version()
        ));
        copy_tree(&src, &dest).await?;
        debug!(
            "Unpacked bundle {} into {}",
            src.display(),
            dest.display()
        );
        Ok(dest)
    }
}
