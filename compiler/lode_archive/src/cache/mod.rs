//! On-disk archive cache.
//!
//! Compiled packages are cached by import path so unchanged packages are
//! never recompiled across builds.
//!
//! # Cache Directory Structure
//!
//! ```text
//! <cache_dir>/
//! ├── archives/
//! │   ├── <hash(import path)>.a
//! │   └── ...
//! └── version          # Compiler version for cache invalidation
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::archive::Archive;
use crate::codec::{self, DecodeError, EncodeError};
use crate::export::PackageMap;
use crate::hash::{hash_bytes, hash_string};

/// Configuration for the archive cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Root directory for cache storage.
    pub cache_dir: PathBuf,
    /// Compiler version for cache invalidation.
    pub compiler_version: String,
}

impl CacheConfig {
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            compiler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the compiler version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.compiler_version = version.into();
        self
    }
}

/// Error during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Archive cache keyed by import path.
#[derive(Debug)]
pub struct ArchiveCache {
    config: CacheConfig,
    archives_dir: PathBuf,
}

impl ArchiveCache {
    /// Open the cache, creating its directory structure if needed.
    ///
    /// An existing cache written by a different compiler version is cleared.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let archives_dir = config.cache_dir.join("archives");
        fs::create_dir_all(&archives_dir).map_err(io_error(&archives_dir))?;

        let cache = Self {
            config,
            archives_dir,
        };
        if !cache.validate()? {
            tracing::debug!(
                dir = %cache.config.cache_dir.display(),
                "cache version changed; clearing"
            );
            cache.clear()?;
            let version_file = cache.version_file();
            fs::write(&version_file, cache.config.compiler_version.as_bytes())
                .map_err(io_error(&version_file))?;
        }
        Ok(cache)
    }

    fn version_file(&self) -> PathBuf {
        self.config.cache_dir.join("version")
    }

    /// Where the archive for `import_path` lives.
    #[must_use]
    pub fn archive_path(&self, import_path: &str) -> PathBuf {
        self.archives_dir
            .join(format!("{}.a", hash_string(import_path).to_hex()))
    }

    #[must_use]
    pub fn has(&self, import_path: &str) -> bool {
        self.archive_path(import_path).exists()
    }

    /// Store an archive under its own import path.
    pub fn put(&self, archive: &Archive) -> Result<PathBuf, CacheError> {
        let bytes = codec::encode(archive)?;
        let path = self.archive_path(&archive.import_path);

        let file = File::create(&path).map_err(io_error(&path))?;
        let mut w = BufWriter::new(file);
        w.write_all(&bytes).map_err(io_error(&path))?;
        w.flush().map_err(io_error(&path))?;

        tracing::debug!(
            import_path = %archive.import_path,
            bytes = bytes.len(),
            hash = %hash_bytes(&bytes),
            "cached archive"
        );
        Ok(path)
    }

    /// Load the archive for `import_path`, installing its package record.
    ///
    /// Imports that are not yet in `packages` are loaded from the cache
    /// first so cross-package references resolve. Returns `Ok(None)` on a
    /// cache miss.
    pub fn load(
        &self,
        import_path: &str,
        packages: &mut PackageMap,
    ) -> Result<Option<Archive>, CacheError> {
        self.load_inner(import_path, packages, &mut FxHashSet::default())
    }

    fn load_inner(
        &self,
        import_path: &str,
        packages: &mut PackageMap,
        loading: &mut FxHashSet<String>,
    ) -> Result<Option<Archive>, CacheError> {
        let path = self.archive_path(import_path);
        if !path.exists() {
            tracing::trace!(import_path, "cache miss");
            return Ok(None);
        }

        let file = File::open(&path).map_err(io_error(&path))?;
        let archive = codec::read_archive_unlinked(import_path, BufReader::new(file))?;
        if archive.import_path != import_path {
            return Err(DecodeError::Malformed {
                path: import_path.to_string(),
                message: format!(
                    "cache entry holds package '{}' instead",
                    archive.import_path
                ),
            }
            .into());
        }

        loading.insert(import_path.to_string());
        for import in &archive.imports {
            if packages.contains(import) || loading.contains(import) {
                continue;
            }
            // A miss here surfaces as an unresolved package below.
            self.load_inner(import, packages, loading)?;
        }
        loading.remove(import_path);

        codec::install_exports(import_path, &archive, packages)?;
        Ok(Some(archive))
    }

    /// Remove a cached archive.
    pub fn remove(&self, import_path: &str) -> Result<(), CacheError> {
        let path = self.archive_path(import_path);
        if path.exists() {
            fs::remove_file(&path).map_err(io_error(&path))?;
        }
        Ok(())
    }

    /// Clear every cached archive.
    pub fn clear(&self) -> Result<(), CacheError> {
        if self.archives_dir.exists() {
            fs::remove_dir_all(&self.archives_dir).map_err(io_error(&self.archives_dir))?;
        }
        fs::create_dir_all(&self.archives_dir).map_err(io_error(&self.archives_dir))?;
        Ok(())
    }

    /// Number of cached archives.
    pub fn count(&self) -> Result<usize, CacheError> {
        let count = fs::read_dir(&self.archives_dir)
            .map_err(io_error(&self.archives_dir))?
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "a"))
            .count();
        Ok(count)
    }

    /// Does the version file match the configured compiler version?
    pub fn validate(&self) -> Result<bool, CacheError> {
        let version_file = self.version_file();
        if !version_file.exists() {
            return Ok(false);
        }
        let version = fs::read_to_string(&version_file).map_err(io_error(&version_file))?;
        Ok(version.trim() == self.config.compiler_version)
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
