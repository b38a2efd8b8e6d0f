//! The archive data model.
//!
//! One [`Archive`] per compiled package. Archives are produced once by the
//! front-end (or rehydrated from the cache) and are read-only from then on:
//! the resolver, the eliminator and the assembler only ever borrow them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::position::PositionTable;

/// One compiled package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    /// Import path; unique across a program.
    pub import_path: String,
    /// Declared package name (`main`, `fmt`, ...).
    pub name: String,
    /// Import paths of the packages this one imports.
    pub imports: Vec<String>,
    /// Opaque type-system export data (see [`crate::export::ExportData`]).
    pub export_data: Vec<u8>,
    /// Top-level declarations, in source order.
    pub declarations: Vec<Decl>,
    /// Code emitted verbatim before this package's module wrapper.
    pub inc_code: Vec<u8>,
    /// Source positions referenced by markers embedded in code fragments.
    pub positions: Option<PositionTable>,
    /// Whether output should be minified. Only the entry package's flag counts.
    pub minified: bool,
    /// Code generated for the most recent incremental step.
    pub new_code_text: Vec<Vec<u8>>,
    /// Source text of each top-level symbol at the time it was compiled.
    pub symbol_sources: BTreeMap<String, String>,
}

impl Archive {
    /// Create an empty archive for `import_path`.
    #[must_use]
    pub fn new(import_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an import edge.
    #[must_use]
    pub fn with_import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    /// Append a declaration.
    #[must_use]
    pub fn with_decl(mut self, decl: Decl) -> Self {
        self.declarations.push(decl);
        self
    }

    /// Set the minification flag.
    #[must_use]
    pub fn with_minified(mut self, minified: bool) -> Self {
        self.minified = minified;
        self
    }

    /// Remember the source text a top-level symbol was compiled from.
    pub fn record_symbol_source(&mut self, symbol: impl Into<String>, source: impl Into<String>) {
        self.symbol_sources.insert(symbol.into(), source.into());
    }

    /// Symbols whose current source differs from the cached text.
    ///
    /// A symbol missing from the cache is stale. Symbols that exist only in
    /// the cache (deleted since) are not reported; the caller drops them when
    /// it recompiles. The result is sorted.
    #[must_use]
    pub fn stale_symbols(&self, current: &BTreeMap<String, String>) -> Vec<String> {
        current
            .iter()
            .filter(|(name, text)| self.symbol_sources.get(*name) != Some(*text))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// One top-level compiled symbol: a function, a type, a variable group or
/// an init block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decl {
    /// Fully qualified name, for diagnostics.
    pub full_name: String,
    /// Package-scope variables this declaration introduces.
    pub vars: Vec<String>,
    pub decl_code: Vec<u8>,
    pub method_list_code: Vec<u8>,
    pub type_init_code: Vec<u8>,
    pub init_code: Vec<u8>,
    /// Local object filter: this declaration defines a named object (a type,
    /// a function).
    pub object_filter: Option<String>,
    /// Local method filter: this declaration defines a method.
    pub method_filter: Option<String>,
    /// Fully qualified filter keys this declaration uses.
    pub deps: Vec<String>,
    /// Calling this declaration may suspend.
    pub blocking: bool,
}

impl Decl {
    /// Create a declaration with no code and no filters (a root).
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vars.extend(vars.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_decl_code(mut self, code: impl Into<Vec<u8>>) -> Self {
        self.decl_code = code.into();
        self
    }

    #[must_use]
    pub fn with_method_list_code(mut self, code: impl Into<Vec<u8>>) -> Self {
        self.method_list_code = code.into();
        self
    }

    #[must_use]
    pub fn with_type_init_code(mut self, code: impl Into<Vec<u8>>) -> Self {
        self.type_init_code = code.into();
        self
    }

    #[must_use]
    pub fn with_init_code(mut self, code: impl Into<Vec<u8>>) -> Self {
        self.init_code = code.into();
        self
    }

    #[must_use]
    pub fn with_object_filter(mut self, filter: impl Into<String>) -> Self {
        self.object_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_method_filter(mut self, filter: impl Into<String>) -> Self {
        self.method_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_dep(mut self, key: impl Into<String>) -> Self {
        self.deps.push(key.into());
        self
    }

    #[must_use]
    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// A declaration without filters is always kept.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.object_filter.is_none() && self.method_filter.is_none()
    }

    /// Fully qualified object filter key, if any.
    #[must_use]
    pub fn object_filter_key(&self, import_path: &str) -> Option<String> {
        self.object_filter
            .as_deref()
            .map(|f| filter_key(import_path, f))
    }

    /// Fully qualified method filter key, if any.
    #[must_use]
    pub fn method_filter_key(&self, import_path: &str) -> Option<String> {
        self.method_filter
            .as_deref()
            .map(|f| filter_key(import_path, f))
    }
}

/// `importPath + "." + local`.
#[must_use]
pub fn filter_key(import_path: &str, local: &str) -> String {
    format!("{import_path}.{local}")
}

/// What a [`Dependency`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// A package-level object: type, function, variable.
    Object,
    /// A method, matched by name across every type that declares it.
    Method,
}

/// A (package, object-or-method) edge, as the front-end records it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub pkg: String,
    pub name: String,
    pub kind: DependencyKind,
}

impl Dependency {
    #[must_use]
    pub fn object(pkg: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pkg: pkg.into(),
            name: name.into(),
            kind: DependencyKind::Object,
        }
    }

    #[must_use]
    pub fn method(pkg: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pkg: pkg.into(),
            name: name.into(),
            kind: DependencyKind::Method,
        }
    }

    /// The local filter name a defining declaration carries.
    #[must_use]
    pub fn local_filter(&self) -> String {
        match self.kind {
            DependencyKind::Object => self.name.clone(),
            DependencyKind::Method => format!("{}~", self.name),
        }
    }

    /// The fully qualified key listed in [`Decl::deps`].
    #[must_use]
    pub fn filter_key(&self) -> String {
        filter_key(&self.pkg, &self.local_filter())
    }
}
