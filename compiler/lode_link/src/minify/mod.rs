//! Whitespace removal for the fixed fragments the assembler injects.
//!
//! Only whitespace that cannot change meaning is dropped: a run of
//! whitespace between two identifier characters collapses to one space,
//! and string literals, template literals and position markers are copied
//! through untouched. Block comments are removed. Line comments are not
//! recognized, so fragments fed to the minifier must not contain them.

use std::borrow::Cow;

use crate::filter::{MARKER_LEN, SENTINEL};

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Whether dropping the whitespace between `prev` and `next` would change
/// how the text tokenizes.
fn needs_space(prev: u8, next: u8) -> bool {
    (is_ident(prev) && is_ident(next)) || (prev == next && matches!(next, b'+' | b'-'))
}

/// Strip non-semantic whitespace from `src` when `minify` is set.
#[must_use]
pub fn remove_whitespace(src: &[u8], minify: bool) -> Cow<'_, [u8]> {
    if !minify {
        return Cow::Borrowed(src);
    }

    let mut out = Vec::with_capacity(src.len());
    // Last byte emitted, markers excluded.
    let mut last: Option<u8> = None;
    let mut pending_space = false;
    let mut i = 0;

    while i < src.len() {
        let b = src[i];

        if b == SENTINEL && i + MARKER_LEN <= src.len() {
            out.extend_from_slice(&src[i..i + MARKER_LEN]);
            i += MARKER_LEN;
            continue;
        }
        if is_space(b) {
            pending_space = true;
            i += 1;
            continue;
        }
        if b == b'/' && src.get(i + 1) == Some(&b'*') {
            let body = &src[i + 2..];
            i += 2 + body
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(body.len(), |end| end + 2);
            pending_space = true;
            continue;
        }

        if pending_space && last.is_some_and(|prev| needs_space(prev, b)) {
            out.push(b' ');
        }
        pending_space = false;

        if matches!(b, b'"' | b'\'' | b'`') {
            let end = literal_end(src, i);
            out.extend_from_slice(&src[i..end]);
            last = Some(src[end - 1]);
            i = end;
            continue;
        }

        out.push(b);
        last = Some(b);
        i += 1;
    }

    Cow::Owned(out)
}

/// Index one past the closing quote of the literal opening at `start`.
/// An unterminated literal runs to the end of the input.
fn literal_end(src: &[u8], start: usize) -> usize {
    let quote = src[start];
    let mut i = start + 1;
    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    src.len()
}

#[cfg(test)]
mod tests;
