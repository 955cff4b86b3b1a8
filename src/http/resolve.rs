//! Maps request targets onto files beneath the document root.
//!
//! Containment is checked after canonicalization: the resolved path must
//! have the canonical document root as a component-wise prefix. That check
//! is the only thing standing between a `..`-laden target and the rest of
//! the filesystem.

use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tokio::fs::File;

/// Why a target did not resolve to a servable file.
///
/// All variants are answered the same way on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The target does not start with `/`.
    #[error("target is not absolute")]
    NotAbsolute,
    /// Canonicalization failed, or the path is not a regular file.
    #[error("no such file")]
    NotFound,
    /// The canonical path lies outside the document root.
    #[error("target escapes document root")]
    OutsideRoot,
    /// The file exists but could not be opened.
    #[error("file is not readable")]
    Unreadable,
}

/// An open file inside the document root, ready to be sent.
#[derive(Debug)]
pub struct ResolvedFile {
    /// The target that was looked up, after default document substitution
    pub target: String,
    pub path: PathBuf,
    pub file: File,
    pub len: u64,
    pub modified: SystemTime,
}

/// The canonicalized document root and the name served for `/`.
#[derive(Debug, Clone)]
pub struct DocRoot {
    canonical: PathBuf,
    default_document: String,
}

impl DocRoot {
    /// Canonicalizes `root`, which must name an existing directory.
    pub fn new(root: &Path, default_document: impl Into<String>) -> anyhow::Result<Self> {
        let canonical = std::fs::canonicalize(root)
            .with_context(|| format!("cannot resolve doc_root {}", root.display()))?;
        if !canonical.is_dir() {
            anyhow::bail!("doc_root {} is not a directory", canonical.display());
        }
        Ok(Self {
            canonical,
            default_document: default_document.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.canonical
    }

    pub fn default_document(&self) -> &str {
        &self.default_document
    }

    /// Resolves `target` to an open regular file beneath the root.
    pub async fn resolve(&self, target: &str) -> Result<ResolvedFile, ResolveError> {
        if !target.starts_with('/') {
            return Err(ResolveError::NotAbsolute);
        }

        let default_target;
        let target = if target == "/" {
            default_target = format!("/{}", self.default_document);
            default_target.as_str()
        } else {
            target
        };

        // Plain concatenation: `Path::join` would discard the root for an
        // absolute target.
        let mut candidate = OsString::from(self.canonical.as_os_str());
        candidate.push(target);

        let path = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|_| ResolveError::NotFound)?;

        if !path.starts_with(&self.canonical) {
            return Err(ResolveError::OutsideRoot);
        }

        // Opening a FIFO or device can block indefinitely, so only regular
        // files get as far as `open`.
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|_| ResolveError::NotFound)?;
        if !meta.is_file() {
            return Err(ResolveError::NotFound);
        }

        let file = File::open(&path)
            .await
            .map_err(|_| ResolveError::Unreadable)?;
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(ResolvedFile {
            target: target.to_string(),
            path,
            file,
            len: meta.len(),
            modified,
        })
    }
}
