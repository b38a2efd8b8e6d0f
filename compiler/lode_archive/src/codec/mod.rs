//! Archive encoding.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬────────────────┬──────────────────────────┐
//! │ "LODEARC\0"  │ version: u32le │ bincode(Archive)         │
//! └──────────────┴────────────────┴──────────────────────────┘
//! ```
//!
//! Decoding is more than deserialization: the archive's export data is
//! rehydrated into a [`PackageRecord`] and installed in the caller's
//! [`PackageMap`]. On any error nothing is installed and no archive is
//! returned.

use std::io::{self, Read, Write};

use crate::archive::Archive;
use crate::export::{PackageMap, PackageRecord};

/// Leading bytes of every encoded archive.
pub const MAGIC: &[u8; 8] = b"LODEARC\0";

/// Bumped whenever the encoded layout of [`Archive`] changes.
pub const FORMAT_VERSION: u32 = 1;

/// Error while decoding an archive. Every variant names the import path
/// being decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("archive '{path}': not an archive (bad magic)")]
    BadMagic { path: String },
    #[error("archive '{path}': format version {found}, expected {expected}")]
    UnsupportedVersion {
        path: String,
        found: u32,
        expected: u32,
    },
    #[error("archive '{path}': malformed data: {message}")]
    Malformed { path: String, message: String },
    #[error("archive '{path}': malformed export data: {message}")]
    MalformedExportData { path: String, message: String },
    #[error("archive '{path}': export data references unknown package '{package}'")]
    UnresolvedPackage { path: String, package: String },
    #[error("archive '{path}': package '{package}' does not export '{name}'")]
    UnresolvedObject {
        path: String,
        package: String,
        name: String,
    },
    #[error("archive '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl DecodeError {
    /// Import path of the archive that failed to decode.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::BadMagic { path }
            | Self::UnsupportedVersion { path, .. }
            | Self::Malformed { path, .. }
            | Self::MalformedExportData { path, .. }
            | Self::UnresolvedPackage { path, .. }
            | Self::UnresolvedObject { path, .. }
            | Self::Io { path, .. } => path,
        }
    }
}

/// Error while encoding an archive.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("archive '{path}': failed to serialize: {message}")]
    Serialize { path: String, message: String },
    #[error("archive '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Write `archive` to `w`.
pub fn write_archive(archive: &Archive, mut w: impl Write) -> Result<(), EncodeError> {
    let io_err = |source| EncodeError::Io {
        path: archive.import_path.clone(),
        source,
    };
    w.write_all(MAGIC).map_err(io_err)?;
    w.write_all(&FORMAT_VERSION.to_le_bytes()).map_err(io_err)?;
    bincode::serialize_into(&mut w, archive).map_err(|e| match *e {
        bincode::ErrorKind::Io(source) => io_err(source),
        other => EncodeError::Serialize {
            path: archive.import_path.clone(),
            message: other.to_string(),
        },
    })
}

/// Encode `archive` into a fresh buffer.
pub fn encode(archive: &Archive) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    write_archive(archive, &mut buf)?;
    Ok(buf)
}

/// Read an archive without touching any package map.
///
/// The result is not usable for linking until its exports are installed
/// with [`install_exports`]; [`read_archive`] does both. A position table
/// that breaks its layout rules is reported as [`DecodeError::Malformed`].
pub fn read_archive_unlinked(path: &str, mut r: impl Read) -> Result<Archive, DecodeError> {
    let mut header = [0u8; 12];
    r.read_exact(&mut header).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::Malformed {
                path: path.to_string(),
                message: "truncated header".to_string(),
            }
        } else {
            DecodeError::Io {
                path: path.to_string(),
                source: e,
            }
        }
    })?;

    if &header[..8] != MAGIC {
        return Err(DecodeError::BadMagic {
            path: path.to_string(),
        });
    }
    let version = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            path: path.to_string(),
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let archive: Archive = bincode::deserialize_from(r).map_err(|e| DecodeError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    if let Some(positions) = &archive.positions {
        positions.validate().map_err(|e| DecodeError::Malformed {
            path: path.to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(archive)
}

/// Rehydrate `archive`'s export data and install it in `packages` under
/// `path`.
pub fn install_exports(
    path: &str,
    archive: &Archive,
    packages: &mut PackageMap,
) -> Result<(), DecodeError> {
    let record = PackageRecord::import(path, &archive.name, &archive.export_data, packages)?;
    tracing::trace!(
        path,
        objects = record.object_names().len(),
        "installed package record"
    );
    packages.insert(record);
    Ok(())
}

/// Read an archive for import path `path` and install its package record.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path))]
pub fn read_archive(
    path: &str,
    r: impl Read,
    packages: &mut PackageMap,
) -> Result<Archive, DecodeError> {
    let archive = read_archive_unlinked(path, r)?;
    install_exports(path, &archive, packages)?;
    Ok(archive)
}

/// Decode an archive from bytes. See [`read_archive`].
pub fn decode(path: &str, data: &[u8], packages: &mut PackageMap) -> Result<Archive, DecodeError> {
    read_archive(path, data, packages)
}
