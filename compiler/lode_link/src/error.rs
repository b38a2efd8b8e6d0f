//! Link errors.

use std::error::Error;
use std::io;

use lode_archive::{CacheError, DecodeError};

/// Boxed error produced by a package loader.
pub type LoadError = Box<dyn Error + Send + Sync>;

/// Dependency resolution failed. Resolution is all-or-nothing: no partial
/// package list is returned.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to load package '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },
    #[error("import cycle: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
}

impl ResolveError {
    /// Import path the failure is reported against.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Load { path, .. } => path,
            Self::Cycle { cycle } => cycle.last().map_or("", String::as_str),
        }
    }
}

/// Any failure of the link pipeline.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("failed to write program: {0}")]
    Write(#[from] io::Error),
    #[error(transparent)]
    Cache(#[from] CacheError),
}
