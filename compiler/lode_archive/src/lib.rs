//! Compiled-package archives for the lode linker.
//!
//! An [`Archive`] is everything the front-end produced for one package:
//! its declarations (each carrying pre-generated code fragments and
//! dead-code-elimination filter keys), its import list, the export data the
//! type system needs to resolve references from dependent packages, and the
//! caches that make incremental rebuilds possible.
//!
//! # Pipeline Position
//!
//! ```text
//! Front-end → **Archive** → (cache: encode / decode) → lode_link (resolve → DCE → assemble)
//! ```
//!
//! # Modules
//!
//! - [`archive`]: the data model (`Archive`, `Decl`, `Dependency`)
//! - [`codec`]: binary encoding, with export-data rehydration on decode
//! - [`export`]: export data and the live package graph it rehydrates into
//! - [`position`]: source position tables referenced by position markers
//! - [`reserved`]: reserved identifiers shared by front-end and assembler
//! - [`cache`]: on-disk archive cache keyed by import path

pub mod archive;
pub mod cache;
pub mod codec;
pub mod export;
pub mod hash;
pub mod position;
pub mod reserved;

pub use archive::{Archive, Decl, Dependency, DependencyKind};
pub use cache::{ArchiveCache, CacheConfig, CacheError};
pub use codec::{
    decode, encode, install_exports, read_archive, read_archive_unlinked, write_archive, DecodeError,
    EncodeError,
};
pub use export::{ExportData, ExportedObject, ObjectKind, PackageMap, PackageRecord, TypeRef};
pub use hash::ContentHash;
pub use position::{Position, PositionTable, PositionTableError, SourceFile};
pub use reserved::ReservedWords;
