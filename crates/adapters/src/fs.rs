// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive directory copy.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from copying a directory tree
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("source directory {0} does not exist")]
    SourceMissing(PathBuf),
    #[error("destination {0} already exists")]
    DestinationExists(PathBuf),
    #[error("failed to copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CopyError + '_ {
    move |source| CopyError::Io { path: path.to_path_buf(), source }
}

/// Copy the tree at `src` to the new directory `dest`, returning the number of files copied.
///
/// `dest` must not exist; its parents are created. Symlinks are followed.
/// A failure part way leaves whatever was already copied in place.
pub async fn copy_tree(src: &Path, dest: &Path) -> Result<usize, CopyError> {
    match tokio::fs::metadata(src).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(CopyError::SourceMissing(src.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CopyError::SourceMissing(src.to_path_buf()))
        }
        Err(e) => return Err(io_err(src)(e)),
    }
    if tokio::fs::try_exists(dest).await.map_err(io_err(dest))? {
        return Err(CopyError::DestinationExists(dest.to_path_buf()));
    }

    copy_into(src, dest).await
}

/// Copy the contents of directory `src` into `dest`, creating it if needed.
///
/// Existing files in `dest` with the same relative path are overwritten.
pub async fn copy_into(src: &Path, dest: &Path) -> Result<usize, CopyError> {
    let mut copied = 0;
    let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        tokio::fs::create_dir_all(&to).await.map_err(io_err(&to))?;
        let mut entries = tokio::fs::read_dir(&from).await.map_err(io_err(&from))?;
        while let Some(entry) = entries.next_entry().await.map_err(io_err(&from))? {
            let path = entry.path();
            let target = to.join(entry.file_name());
            let meta = tokio::fs::metadata(&path).await.map_err(io_err(&path))?;
            if meta.is_dir() {
                pending.push((path, target));
            } else {
                tokio::fs::copy(&path, &target).await.map_err(io_err(&path))?;
                copied += 1;
            }
        }
    }
    Ok(copied)
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
