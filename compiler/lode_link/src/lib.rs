//! Whole-program linker.
//!
//! Turns the per-package archives of a program into one runnable output
//! text with all unreachable declarations removed.
//!
//! # Pipeline
//!
//! ```text
//! entry archive
//!   → resolve   (link order: runtime first, entry last)
//!   → dce       (filter-key reachability over every declaration)
//!   → assemble  (prelude · module blocks · epilogue)
//!   → filter    (position tracking, source-map callbacks)
//!   → sink
//! ```
//!
//! [`Linker`] drives the whole pipeline; each stage is also usable on its
//! own.

pub mod assemble;
pub mod config;
pub mod dce;
pub mod error;
pub mod filter;
pub mod init_shell;
pub mod linker;
pub mod minify;
pub mod resolve;
pub mod source_map;

pub use assemble::{write_package, write_program, PRELUDE};
pub use config::LinkConfig;
pub use dce::{eliminate, DeclId, Selection};
pub use error::{LinkError, LoadError, ResolveError};
pub use filter::{position_marker, MappingCallback, SourceMapFilter, MARKER_LEN, SENTINEL};
pub use init_shell::InitShell;
pub use linker::{LinkStats, Linker};
pub use minify::remove_whitespace;
pub use resolve::import_dependencies;
pub use source_map::SourceMapBuilder;
