//! Source position tables.
//!
//! The front-end embeds position *handles* (plain `u32`s) in the code
//! fragments it generates. A handle is only meaningful relative to the
//! [`PositionTable`] of the package that produced it: every source file of
//! the package owns a contiguous handle range starting at its `base`, and a
//! handle's offset within that range is a byte offset into the file.
//!
//! Handle `0` never belongs to a file and means "no position".

use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved original-source position. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One source file registered in a [`PositionTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    /// First handle owned by this file.
    pub base: u32,
    /// Length of the file in bytes.
    pub size: u32,
    /// Byte offsets where each line starts. `line_starts[0]` is always 0.
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Build from the file's text.
    #[must_use]
    pub fn new(name: impl Into<String>, base: u32, source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| offset_u32(i + 1)),
        );
        Self {
            name: name.into(),
            base,
            size: offset_u32(source.len()),
            line_starts,
        }
    }

    /// Does `handle` fall inside this file? The end-of-file handle counts.
    #[must_use]
    pub fn contains(&self, handle: u32) -> bool {
        handle >= self.base && handle - self.base <= self.size
    }

    /// Convert a byte offset to a 1-based (line, column).
    ///
    /// Returns `None` if the line table has no line covering `offset`.
    #[must_use]
    pub fn offset_to_line_col(&self, offset: u32) -> Option<(u32, u32)> {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.checked_sub(1)?,
        };
        let start = *self.line_starts.get(line_idx)?;
        let line = offset_u32(line_idx + 1);
        let column = offset.checked_sub(start)?.checked_add(1)?;
        Some((line, column))
    }

    /// One past the last handle this file owns, or `None` on overflow.
    fn end(&self) -> Option<u32> {
        self.base.checked_add(self.size)?.checked_add(1)
    }

    fn validate(&self) -> Result<(), PositionTableError> {
        let file = || self.name.clone();
        if self.base == 0 {
            return Err(PositionTableError::ZeroBase { file: file() });
        }
        if self.end().is_none() {
            return Err(PositionTableError::HandleOverflow { file: file() });
        }
        if self.line_starts.first() != Some(&0) {
            return Err(PositionTableError::MissingFirstLine { file: file() });
        }
        if self.line_starts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PositionTableError::UnorderedLines { file: file() });
        }
        if self.line_starts.last().is_some_and(|&last| last > self.size) {
            return Err(PositionTableError::LineOutOfRange { file: file() });
        }
        Ok(())
    }
}

/// A [`PositionTable`] that breaks its own layout rules, typically one read
/// from a damaged archive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionTableError {
    #[error("source file '{file}' starts at handle 0")]
    ZeroBase { file: String },
    #[error("source file '{file}' runs past the end of the handle space")]
    HandleOverflow { file: String },
    #[error("source file '{file}' has no line starting at offset 0")]
    MissingFirstLine { file: String },
    #[error("source file '{file}' has unordered line starts")]
    UnorderedLines { file: String },
    #[error("source file '{file}' has a line starting past its end")]
    LineOutOfRange { file: String },
    #[error("source file '{file}' overlaps the file before it")]
    Overlap { file: String },
}

/// All source files of one package, laid out in a shared handle space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTable {
    files: Vec<SourceFile>,
}

impl PositionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its base handle.
    ///
    /// Files are laid out back to back with one spare handle between them so
    /// a file's end-of-file handle never aliases the next file's first byte.
    /// Returns `None`, leaving the table unchanged, once the handle space is
    /// exhausted.
    pub fn add_file(&mut self, name: impl Into<String>, source: &str) -> Option<u32> {
        let base = match self.files.last() {
            Some(last) => last.end()?,
            None => 1,
        };
        let file = SourceFile::new(name, base, source);
        file.end()?;
        self.files.push(file);
        Some(base)
    }

    /// Check the layout invariants `add_file` maintains: every file has a
    /// well-formed line table and files own disjoint, ascending handle
    /// ranges starting above `0`.
    pub fn validate(&self) -> Result<(), PositionTableError> {
        let mut next_free = 1;
        for file in &self.files {
            file.validate()?;
            if file.base < next_free {
                return Err(PositionTableError::Overlap {
                    file: file.name.clone(),
                });
            }
            // `file.validate` rejected an overflowing end.
            next_free = file.end().unwrap_or(u32::MAX);
        }
        Ok(())
    }

    /// Resolve a handle. Returns `None` for handle `0` and for handles no
    /// file owns.
    #[must_use]
    pub fn position(&self, handle: u32) -> Option<Position> {
        if handle == 0 {
            return None;
        }
        let idx = self.files.partition_point(|f| f.base <= handle);
        let file = self.files.get(idx.checked_sub(1)?)?;
        if !file.contains(handle) {
            return None;
        }
        let (line, column) = file.offset_to_line_col(handle - file.base)?;
        Some(Position {
            file: file.name.clone(),
            line,
            column,
        })
    }
}

/// Source files larger than 4GiB cannot be addressed by a handle anyway.
#[allow(
    clippy::cast_possible_truncation,
    reason = "handles are u32 by construction"
)]
fn offset_u32(offset: usize) -> u32 {
    offset as u32
}
