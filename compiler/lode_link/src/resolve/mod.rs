//! Dependency resolution.
//!
//! Computes the link order of a program: every package transitively
//! imported by the entry package, each after all of its own imports, with
//! the runtime package first and the entry package last.
//!
//! Import cycles are detected with a loading stack rather than assumed
//! away: re-entering a package that is still being loaded fails with
//! [`ResolveError::Cycle`].

use lode_archive::Archive;
use lode_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;

use crate::error::{LoadError, ResolveError};

/// Tracks the state of one resolution.
#[derive(Default)]
struct Resolver {
    /// Packages currently being loaded, outermost first.
    loading_stack: Vec<String>,
    /// Mirror of `loading_stack` for O(1) cycle checks.
    loading_set: FxHashSet<String>,
    /// Packages already appended to `order`.
    visited: FxHashSet<String>,
    order: Vec<Archive>,
}

impl Resolver {
    fn start_loading(&mut self, path: &str) -> Result<(), ResolveError> {
        if self.loading_set.contains(path) {
            let mut cycle = self.loading_stack.clone();
            cycle.push(path.to_string());
            return Err(ResolveError::Cycle { cycle });
        }
        self.loading_set.insert(path.to_string());
        self.loading_stack.push(path.to_string());
        Ok(())
    }

    fn finish_loading(&mut self) {
        if let Some(popped) = self.loading_stack.pop() {
            self.loading_set.remove(&popped);
            self.visited.insert(popped);
        }
    }

    /// Visit `path` and everything it imports, appending in post-order.
    fn import<F, E>(&mut self, path: &str, loader: &mut F) -> Result<(), ResolveError>
    where
        F: FnMut(&str) -> Result<Archive, E>,
        E: Into<LoadError>,
    {
        if self.visited.contains(path) {
            return Ok(());
        }
        self.start_loading(path)?;

        let archive = loader(path).map_err(|e| ResolveError::Load {
            path: path.to_string(),
            source: e.into(),
        })?;
        tracing::trace!(path, imports = archive.imports.len(), "loaded package");

        ensure_sufficient_stack(|| self.import_all(&archive.imports, loader))?;

        self.finish_loading();
        // An archive is linked once, whichever paths it was requested under.
        if archive.import_path != path && !self.visited.insert(archive.import_path.clone()) {
            tracing::trace!(path, import_path = %archive.import_path, "already linked");
            return Ok(());
        }
        self.order.push(archive);
        Ok(())
    }

    fn import_all<F, E>(&mut self, paths: &[String], loader: &mut F) -> Result<(), ResolveError>
    where
        F: FnMut(&str) -> Result<Archive, E>,
        E: Into<LoadError>,
    {
        for path in paths {
            self.import(path, loader)?;
        }
        Ok(())
    }
}

/// Resolve the packages `entry` depends on, in link order.
///
/// `runtime` is loaded first, unconditionally, followed by each of the
/// entry package's imports. The entry archive itself is last. Any loader
/// failure aborts resolution.
#[tracing::instrument(level = "debug", skip_all, fields(entry = %entry.import_path))]
pub fn import_dependencies<F, E>(
    entry: Archive,
    runtime: &str,
    mut loader: F,
) -> Result<Vec<Archive>, ResolveError>
where
    F: FnMut(&str) -> Result<Archive, E>,
    E: Into<LoadError>,
{
    let mut resolver = Resolver::default();
    resolver.start_loading(&entry.import_path)?;

    if entry.import_path != runtime {
        resolver.import(runtime, &mut loader)?;
    }
    resolver.import_all(&entry.imports, &mut loader)?;

    resolver.finish_loading();
    resolver.order.push(entry);

    tracing::debug!(packages = resolver.order.len(), "resolved link order");
    Ok(resolver.order)
}
