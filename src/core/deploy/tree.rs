// src/core/deploy/tree.rs

//! Directory-tree helpers shared by the bundle and installer implementations.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// The contents of a directory tree, as paths relative to its root.
#[derive(Debug, Default)]
pub(crate) struct TreeListing {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Walks `root` without recursion, listing parent directories before their children.
/// Symlinks are listed as files and not followed.
pub(crate) async fn list_tree(root: &Path) -> io::Result<TreeListing> {
    let mut listing = TreeListing::default();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative) = pending.pop() {
        let mut entries = fs::read_dir(root.join(&relative)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let child = relative.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                listing.dirs.push(child.clone());
                pending.push(child);
            } else {
                listing.files.push(child);
            }
        }
    }
    Ok(listing)
}

/// Copies the tree at `src` into `dest`, creating `dest` if needed.
pub(crate) async fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    let listing = list_tree(src).await?;
    fs::create_dir_all(dest).await?;
    for dir in &listing.dirs {
        fs::create_dir_all(dest.join(dir)).await?;
    }
    for file in &listing.files {
        fs::copy(src.join(file), dest.join(file)).await?;
    }
    Ok(())
}
