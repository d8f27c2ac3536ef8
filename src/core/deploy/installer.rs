// src/core/deploy/installer.rs

//! Materializes a node's installation from the template directory.

use super::tree::list_tree;
use crate::core::node::NodeSpec;
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;
use tracing::debug;

/// Writes a node's installation into its deploy directory.
#[async_trait]
pub trait NodeInstaller: Send + Sync {
    async fn install(
        &self,
        template_dir: &Path,
        node: &NodeSpec,
        properties: &BTreeMap<String, String>,
    ) -> io::Result<()>;
}

/// Copies the template tree and replaces `${key}` tokens in every UTF-8 file.
///
/// Unknown tokens are left in place. Binary files are copied verbatim, and file
/// permissions are preserved so that `bin/` scripts stay executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInstaller;

#[async_trait]
impl NodeInstaller for TemplateInstaller {
    async fn install(
        &self,
        template_dir: &Path,
        node: &NodeSpec,
        properties: &BTreeMap<String, String>,
    ) -> io::Result<()> {
        let listing = list_tree(template_dir).await?;
        let dest = &node.deploy_dir;
        fs::create_dir_all(dest).await?;
        for dir in &listing.dirs {
            fs::create_dir_all(dest.join(dir)).await?;
        }

        let mut substituted = 0usize;
        for file in &listing.files {
            let src = template_dir.join(file);
            let target = dest.join(file);
            let bytes = fs::read(&src).await?;
            match String::from_utf8(bytes) {
                Ok(text) if text.contains("${") => {
                    fs::write(&target, replace_tokens(&text, properties)).await?;
                    let permissions = fs::metadata(&src).await?.permissions();
                    fs::set_permissions(&target, permissions).await?;
                    substituted += 1;
                }
                _ => {
                    fs::copy(&src, &target).await?;
                }
            }
        }

        debug!(
            "Installed node{} into {} ({} files, {} templated)",
            node.index,
            dest.display(),
            listing.files.len(),
            substituted
        );
        Ok(())
    }
}

/// Matches a `${key}` token; the key is everything up to the first `}`.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("token pattern is valid"));

/// Replaces every `${key}` in `text` whose key is present in `properties`.
pub fn replace_tokens(text: &str, properties: &BTreeMap<String, String>) -> String {
    TOKEN
        .replace_all(text, |caps: &Captures<'_>| match properties.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
