//! Source map (revision 3) output.
//!
//! Collects the mappings the [`SourceMapFilter`](crate::filter::SourceMapFilter)
//! reports and renders them as a v3 source map. Segments are base64 VLQ
//! encoded, each field relative to the previous segment; the generated
//! column restarts at every generated line.

use lode_archive::Position;
use rustc_hash::FxHashMap;
use serde::Serialize;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// One mapping: 0-based generated line and column, plus the original
/// `(source index, line, column)`, all 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mapping {
    gen_line: usize,
    gen_column: usize,
    original: Option<(usize, usize, usize)>,
}

#[derive(Serialize)]
struct SourceMapV3<'a> {
    version: u32,
    file: &'a str,
    sources: &'a [String],
    names: &'a [String],
    mappings: String,
}

/// Accumulates mappings for one generated file.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    file: String,
    sources: Vec<String>,
    source_index: FxHashMap<String, usize>,
    mappings: Vec<Mapping>,
}

impl SourceMapBuilder {
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Record that generated `(line, column)` maps to `original`.
    ///
    /// `line` is 1-based and `column` 0-based, as the filter reports them.
    /// A mapping without an original position marks generated code that
    /// has no source.
    pub fn add_mapping(&mut self, line: usize, column: usize, original: Option<Position>) {
        let original = original.map(|pos| {
            let source = self.source(&pos.file);
            (
                source,
                pos.line.saturating_sub(1) as usize,
                pos.column.saturating_sub(1) as usize,
            )
        });
        self.mappings.push(Mapping {
            gen_line: line.saturating_sub(1),
            gen_column: column,
            original,
        });
    }

    fn source(&mut self, file: &str) -> usize {
        if let Some(&index) = self.source_index.get(file) {
            return index;
        }
        let index = self.sources.len();
        self.sources.push(file.to_string());
        self.source_index.insert(file.to_string(), index);
        index
    }

    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// The `mappings` field of the source map.
    #[must_use]
    pub fn encode_mappings(&self) -> String {
        let mut out = String::new();
        let mut line = 0;
        let mut prev_column = 0;
        let mut prev_source = 0;
        let mut prev_orig_line = 0;
        let mut prev_orig_column = 0;
        let mut first_in_line = true;

        for m in &self.mappings {
            while line < m.gen_line {
                out.push(';');
                line += 1;
                prev_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                out.push(',');
            }
            first_in_line = false;

            encode_vlq(&mut out, delta(m.gen_column, prev_column));
            prev_column = m.gen_column;

            if let Some((source, orig_line, orig_column)) = m.original {
                encode_vlq(&mut out, delta(source, prev_source));
                encode_vlq(&mut out, delta(orig_line, prev_orig_line));
                encode_vlq(&mut out, delta(orig_column, prev_orig_column));
                prev_source = source;
                prev_orig_line = orig_line;
                prev_orig_column = orig_column;
            }
        }
        out
    }

    /// Render the source map as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&SourceMapV3 {
            version: 3,
            file: &self.file,
            sources: &self.sources,
            names: &[],
            mappings: self.encode_mappings(),
        })
    }
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "positions are far below i64::MAX"
)]
fn delta(current: usize, previous: usize) -> i64 {
    current as i64 - previous as i64
}

/// Append `value` as base64 VLQ: sign in the low bit, five bits per digit,
/// continuation in bit six.
fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        value.unsigned_abs() << 1
    };
    loop {
        let mut digit = vlq & 0b1_1111;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        #[allow(clippy::cast_possible_truncation, reason = "digit is below 64")]
        out.push(char::from(BASE64[digit as usize]));
        if vlq == 0 {
            break;
        }
    }
}
