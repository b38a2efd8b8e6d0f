//! Source-map filter writer.
//!
//! A pass-through [`Write`] sink that tracks the generated line and column
//! of every byte it forwards. Front-ends embed position markers in their
//! code fragments:
//!
//! ```text
//! ┌──────┬───────────────────┐
//! │ 0x08 │ handle: u32 (BE)  │
//! └──────┴───────────────────┘
//! ```
//!
//! When a mapping callback is registered each marker is stripped from the
//! stream and the callback receives the generated position at that point
//! together with the original position the handle resolves to. Without a
//! callback, bytes pass through unmodified.
//!
//! One filter spans the whole program: counters are never reset between
//! packages.

use std::fmt;
use std::io::{self, Write};

use lode_archive::{Position, PositionTable};

/// First byte of a position marker.
pub const SENTINEL: u8 = 0x08;

/// Sentinel plus a 4-byte handle.
pub const MARKER_LEN: usize = 5;

/// Build the marker a front-end embeds for position `handle`.
#[must_use]
pub fn position_marker(handle: u32) -> [u8; MARKER_LEN] {
    let [a, b, c, d] = handle.to_be_bytes();
    [SENTINEL, a, b, c, d]
}

/// Receives `(generated line, generated column, original position)`.
/// Lines are 1-based, columns are 0-based byte offsets.
pub type MappingCallback<'a> = Box<dyn FnMut(usize, usize, Option<Position>) + 'a>;

pub struct SourceMapFilter<'a, W: Write> {
    inner: W,
    callback: Option<MappingCallback<'a>>,
    positions: Option<&'a PositionTable>,
    /// 0-based.
    line: usize,
    column: usize,
    /// A marker cut short by the end of a `write` call.
    partial: Vec<u8>,
    bytes_written: usize,
}

impl<'a, W: Write> SourceMapFilter<'a, W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            callback: None,
            positions: None,
            line: 0,
            column: 0,
            partial: Vec::with_capacity(MARKER_LEN),
            bytes_written: 0,
        }
    }

    /// Register the mapping callback. Markers are only interpreted when one
    /// is set.
    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, usize, Option<Position>) + 'a,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Table that marker handles resolve against, usually the position
    /// table of the package being written.
    pub fn set_positions(&mut self, positions: Option<&'a PositionTable>) {
        self.positions = positions;
    }

    /// Current generated position: 1-based line, 0-based column.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.line + 1, self.column)
    }

    /// Bytes forwarded to the inner sink so far, markers excluded.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn forward(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.inner.write_all(bytes)?;
        self.bytes_written += bytes.len();
        match bytes.iter().rposition(|&b| b == b'\n') {
            Some(last) => {
                self.line += bytes.iter().filter(|&&b| b == b'\n').count();
                self.column = bytes.len() - last - 1;
            }
            None => self.column += bytes.len(),
        }
        Ok(())
    }

    fn map(&mut self, marker: &[u8]) {
        let handle = u32::from_be_bytes([marker[1], marker[2], marker[3], marker[4]]);
        let original = self.positions.and_then(|table| table.position(handle));
        let (line, column) = self.position();
        if let Some(callback) = self.callback.as_mut() {
            callback(line, column, original);
        }
    }
}

impl<W: Write> Write for SourceMapFilter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.callback.is_none() {
            self.forward(buf)?;
            return Ok(buf.len());
        }

        let mut rest = buf;
        if !self.partial.is_empty() {
            let take = (MARKER_LEN - self.partial.len()).min(rest.len());
            self.partial.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.partial.len() < MARKER_LEN {
                return Ok(buf.len());
            }
            let mut marker = [0u8; MARKER_LEN];
            marker.copy_from_slice(&self.partial);
            self.partial.clear();
            self.map(&marker);
        }

        while let Some(i) = rest.iter().position(|&b| b == SENTINEL) {
            self.forward(&rest[..i])?;
            let marker = &rest[i..];
            if marker.len() < MARKER_LEN {
                self.partial.extend_from_slice(marker);
                return Ok(buf.len());
            }
            self.map(&marker[..MARKER_LEN]);
            rest = &marker[MARKER_LEN..];
        }
        self.forward(rest)?;
        Ok(buf.len())
    }

    /// Bytes of a marker still incomplete at this point are forwarded
    /// unchanged.
    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let pending = std::mem::take(&mut self.partial);
            self.forward(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: Write> fmt::Debug for SourceMapFilter<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceMapFilter")
            .field("line", &self.line)
            .field("column", &self.column)
            .field("has_callback", &self.callback.is_some())
            .field("bytes_written", &self.bytes_written)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
