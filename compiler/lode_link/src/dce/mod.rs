//! Whole-program dead-code elimination.
//!
//! This is a mark pass over filter keys, not a call graph. Declarations
//! without filter keys are roots. Every other declaration waits in an
//! index under each of its filter keys, and becomes selected once every
//! key it waits on has been listed as a dependency by some selected
//! declaration.
//!
//! ```text
//! roots ──▶ ready stack ──pop──▶ selected
//!                ▲                  │ deps
//!                └── all keys clear ◀── filter index (key → waiting decls)
//! ```
//!
//! A key's waiting list is consumed the first time any selected declaration
//! lists it. The final selection is the unique closure regardless of the
//! order the ready stack is drained in.

use lode_archive::{Archive, Decl};
use rustc_hash::{FxHashMap, FxHashSet};

/// Position of a declaration in a program: the package's index in link
/// order and the declaration's index within that package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId {
    pub package: usize,
    pub index: usize,
}

impl DeclId {
    #[must_use]
    pub fn new(package: usize, index: usize) -> Self {
        Self { package, index }
    }
}

/// The declarations that survive elimination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: FxHashSet<DeclId>,
}

impl Selection {
    /// Select every declaration of every package.
    #[must_use]
    pub fn all(pkgs: &[Archive]) -> Self {
        let selected = pkgs
            .iter()
            .enumerate()
            .flat_map(|(p, pkg)| (0..pkg.declarations.len()).map(move |i| DeclId::new(p, i)))
            .collect();
        Self { selected }
    }

    #[must_use]
    pub fn contains(&self, id: DeclId) -> bool {
        self.selected.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected declarations of package `package`, in declaration order.
    pub fn package_decls<'a>(
        &'a self,
        package: usize,
        archive: &'a Archive,
    ) -> impl Iterator<Item = &'a Decl> + 'a {
        archive
            .declarations
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.contains(DeclId::new(package, *i)))
            .map(|(_, d)| d)
    }

    /// Every selected declaration, in package order then declaration order.
    pub fn decls<'a>(&'a self, pkgs: &'a [Archive]) -> impl Iterator<Item = (DeclId, &'a Decl)> + 'a {
        pkgs.iter().enumerate().flat_map(move |(p, pkg)| {
            pkg.declarations
                .iter()
                .enumerate()
                .map(move |(i, d)| (DeclId::new(p, i), d))
                .filter(move |(id, _)| self.contains(*id))
        })
    }

    /// Number of selected declarations in package `package`.
    #[must_use]
    pub fn count_in(&self, package: usize) -> usize {
        self.selected.iter().filter(|id| id.package == package).count()
    }
}

/// A declaration waiting for its filter keys to be used.
struct Waiting {
    id: DeclId,
    object: Option<String>,
    method: Option<String>,
}

impl Waiting {
    fn clear(&mut self, key: &str) {
        if self.object.as_deref() == Some(key) {
            self.object = None;
        }
        if self.method.as_deref() == Some(key) {
            self.method = None;
        }
    }

    fn is_ready(&self) -> bool {
        self.object.is_none() && self.method.is_none()
    }
}

/// Compute the reachable declarations of `pkgs`.
#[tracing::instrument(level = "debug", skip_all, fields(packages = pkgs.len()))]
pub fn eliminate(pkgs: &[Archive]) -> Selection {
    let mut waiting: Vec<Waiting> = Vec::new();
    let mut by_filter: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    let mut ready: Vec<DeclId> = Vec::new();

    for (p, pkg) in pkgs.iter().enumerate() {
        for (i, decl) in pkg.declarations.iter().enumerate() {
            let id = DeclId::new(p, i);
            if decl.is_root() {
                ready.push(id);
                continue;
            }
            let entry = Waiting {
                id,
                object: decl.object_filter_key(&pkg.import_path),
                method: decl.method_filter_key(&pkg.import_path),
            };
            let slot = waiting.len();
            for key in entry.object.iter().chain(entry.method.iter()) {
                by_filter.entry(key.clone()).or_default().push(slot);
            }
            waiting.push(entry);
        }
    }
    let roots = ready.len();

    let mut selection = Selection::default();
    while let Some(id) = ready.pop() {
        if !selection.selected.insert(id) {
            continue;
        }
        let decl = &pkgs[id.package].declarations[id.index];
        for dep in &decl.deps {
            let Some(slots) = by_filter.remove(dep) else {
                continue;
            };
            for slot in slots {
                let entry = &mut waiting[slot];
                if entry.is_ready() {
                    // Both filters were the same key.
                    continue;
                }
                entry.clear(dep);
                if entry.is_ready() {
                    ready.push(entry.id);
                }
            }
        }
    }

    tracing::debug!(
        roots,
        total = roots + waiting.len(),
        selected = selection.len(),
        "eliminated dead declarations"
    );
    selection
}

#[cfg(test)]
mod tests;
