//! Reserved identifiers.
//!
//! Identifiers the front-end must never emit raw. Three sources feed the
//! table: the output language's reserved words, the predeclared numeric
//! type names of the source language, and the reserved words of the
//! embedded scripting language used for interactive evaluation.
//!
//! The table is built explicitly and handed to whoever needs it. Nothing
//! here is global, so concurrent builds never share mutable state.

use std::borrow::Cow;

use rustc_hash::FxHashSet;

/// Output-language (JavaScript) reserved words.
const OUTPUT_KEYWORDS: &[&str] = &[
    "abstract", "arguments", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "debugger", "default", "delete", "do", "double", "else", "enum", "eval", "export",
    "extends", "false", "final", "finally", "float", "for", "function", "goto", "if", "implements",
    "import", "in", "instanceof", "int", "interface", "let", "long", "native", "new", "null",
    "package", "private", "protected", "public", "return", "short", "static", "super", "switch",
    "synchronized", "this", "throw", "throws", "transient", "true", "try", "typeof", "undefined",
    "var", "void", "volatile", "while", "with", "yield",
];

/// Predeclared numeric type names.
const PREDECLARED_NUMERIC: &[&str] = &[
    "int", "uint", "uint8", "uint16", "uint32", "uint64", "int8", "int16", "int32", "int64",
    "float32", "float64", "complex64", "complex128", "byte", "rune", "uintptr",
];

/// Scripting-language (Lua) reserved words.
const SCRIPT_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in", "local",
    "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Immutable reserved-identifier table.
#[derive(Debug, Clone)]
pub struct ReservedWords {
    reserved: FxHashSet<&'static str>,
    predeclared: FxHashSet<&'static str>,
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservedWords {
    #[must_use]
    pub fn new() -> Self {
        let predeclared: FxHashSet<&'static str> = PREDECLARED_NUMERIC.iter().copied().collect();
        let reserved = OUTPUT_KEYWORDS
            .iter()
            .chain(PREDECLARED_NUMERIC)
            .chain(SCRIPT_KEYWORDS)
            .copied()
            .collect();
        Self {
            reserved,
            predeclared,
        }
    }

    /// Must `name` be escaped before it is emitted?
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Is `name` a predeclared numeric type?
    #[must_use]
    pub fn is_predeclared(&self, name: &str) -> bool {
        self.predeclared.contains(name)
    }

    /// Escape a reserved name by suffixing `$`; other names pass through.
    #[must_use]
    pub fn escape<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.is_reserved(name) {
            Cow::Owned(format!("{name}$"))
        } else {
            Cow::Borrowed(name)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }
}
