//! The link pipeline: resolve, eliminate, assemble.

use std::io::Write;

use lode_archive::{Archive, Position, ReservedWords};

use crate::assemble::write_program;
use crate::config::LinkConfig;
use crate::dce::{eliminate, Selection};
use crate::error::{LinkError, LoadError};
use crate::filter::SourceMapFilter;
use crate::resolve::import_dependencies;

/// Summary of one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    pub packages: usize,
    pub declarations: usize,
    pub selected: usize,
    pub bytes_written: usize,
}

/// Links resolved package sets into programs.
#[derive(Debug, Default)]
pub struct Linker {
    config: LinkConfig,
    reserved: ReservedWords,
}

impl Linker {
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            reserved: ReservedWords::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Resolve `entry` and its dependencies into link order.
    pub fn resolve<F, E>(&self, entry: Archive, loader: F) -> Result<Vec<Archive>, LinkError>
    where
        F: FnMut(&str) -> Result<Archive, E>,
        E: Into<LoadError>,
    {
        Ok(import_dependencies(
            entry,
            &self.config.runtime_package,
            loader,
        )?)
    }

    /// Select the declarations `pkgs` keeps.
    #[must_use]
    pub fn select(&self, pkgs: &[Archive]) -> Selection {
        eliminate(pkgs)
    }

    /// Link `pkgs` (in link order, entry last) into `sink`.
    pub fn link<W: Write>(&self, pkgs: &[Archive], sink: W) -> Result<LinkStats, LinkError> {
        self.run(pkgs, SourceMapFilter::new(sink))
    }

    /// Like [`Linker::link`], reporting every embedded position marker to
    /// `callback` as `(generated line, generated column, original position)`.
    pub fn link_with_source_map<'a, W, F>(
        &self,
        pkgs: &'a [Archive],
        sink: W,
        callback: F,
    ) -> Result<LinkStats, LinkError>
    where
        W: Write,
        F: FnMut(usize, usize, Option<Position>) + 'a,
    {
        self.run(pkgs, SourceMapFilter::new(sink).with_callback(callback))
    }

    fn run<'a, W: Write>(
        &self,
        pkgs: &'a [Archive],
        mut w: SourceMapFilter<'a, W>,
    ) -> Result<LinkStats, LinkError> {
        let selection = eliminate(pkgs);
        write_program(pkgs, &selection, &self.config, &self.reserved, &mut w)?;
        w.flush()?;

        Ok(LinkStats {
            packages: pkgs.len(),
            declarations: pkgs.iter().map(|p| p.declarations.len()).sum(),
            selected: selection.len(),
            bytes_written: w.bytes_written(),
        })
    }
}
