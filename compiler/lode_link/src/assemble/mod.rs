//! Program assembly.
//!
//! Renders the linked program from the selected declarations:
//!
//! ```text
//! header · prelude · module(pkg₀) · module(pkg₁) · … · epilogue
//! ```
//!
//! Each module block lays out its selected declarations pass by pass:
//! every declaration's code, then every method table, then every type
//! initializer, then every init fragment inside the initializer shell.
//! Fragments the assembler injects are minified when the program is;
//! fragments taken from archives are written as the front-end produced
//! them.
//!
//! All output goes through the [`SourceMapFilter`], which is the only
//! place generated positions are tracked.

use std::io::{self, Write};

use lode_archive::{Archive, Decl, ReservedWords};

use crate::config::LinkConfig;
use crate::dce::Selection;
use crate::filter::SourceMapFilter;
use crate::init_shell::InitShell;
use crate::minify::remove_whitespace;

/// Built-in runtime bootstrap.
pub const PRELUDE: &str = include_str!("prelude.js");

const HEADER: &str = "\"use strict\";\n(function() {\n\n";

fn write_injected<W: Write>(
    w: &mut SourceMapFilter<'_, W>,
    text: &str,
    minify: bool,
) -> io::Result<()> {
    w.write_all(&remove_whitespace(text.as_bytes(), minify))
}

/// The closing bootstrap: register methods, initialize the runtime, start
/// the entry package and flush buffered output.
#[must_use]
pub fn epilogue(entry: &str, config: &LinkConfig) -> String {
    format!(
        "$synthesizeMethods();\n\
         var $mainPkg = $packages[\"{entry}\"];\n\
         $packages[\"{runtime}\"].$init();\n\
         $go($mainPkg.{symbol}, []);\n\
         $flushConsole();\n\
         \n\
         }}).call(this);\n",
        runtime = config.runtime_package,
        symbol = config.entry_symbol,
    )
}

/// Write the whole program.
///
/// `pkgs` must be in link order with the entry package last; its
/// minification flag applies unless `config` overrides it.
#[tracing::instrument(level = "debug", skip_all, fields(packages = pkgs.len()))]
pub fn write_program<'a, W: Write>(
    pkgs: &'a [Archive],
    selection: &Selection,
    config: &LinkConfig,
    reserved: &ReservedWords,
    w: &mut SourceMapFilter<'a, W>,
) -> io::Result<()> {
    let Some(entry) = pkgs.last() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot assemble a program without packages",
        ));
    };
    let minify = config.minify_for(entry.minified);

    write_injected(w, HEADER, minify)?;
    write_injected(w, &config.prelude, minify)?;
    w.write_all(b"\n")?;

    for (index, pkg) in pkgs.iter().enumerate() {
        write_package(index, pkg, selection, minify, reserved, w)?;
    }

    write_injected(w, &epilogue(&entry.import_path, config), minify)?;
    tracing::debug!(
        entry = %entry.import_path,
        minify,
        bytes = w.bytes_written(),
        "assembled program"
    );
    Ok(())
}

/// Write the module block of package `index`.
pub fn write_package<'a, W: Write>(
    index: usize,
    pkg: &'a Archive,
    selection: &Selection,
    minify: bool,
    reserved: &ReservedWords,
    w: &mut SourceMapFilter<'a, W>,
) -> io::Result<()> {
    w.set_positions(pkg.positions.as_ref());

    let decls: Vec<&Decl> = selection.package_decls(index, pkg).collect();
    tracing::trace!(
        package = %pkg.import_path,
        selected = decls.len(),
        total = pkg.declarations.len(),
        "writing package"
    );

    w.write_all(&pkg.inc_code)?;
    write_injected(
        w,
        &format!("$packages[\"{}\"] = (function() {{\n", pkg.import_path),
        minify,
    )?;

    let mut vars = vec!["$pkg = {}", "$init"];
    for decl in &decls {
        for var in &decl.vars {
            if reserved.is_reserved(var) {
                tracing::warn!(
                    package = %pkg.import_path,
                    decl = %decl.full_name,
                    var = %var,
                    "package variable uses a reserved word"
                );
            }
            vars.push(var);
        }
    }
    write_injected(w, &format!("\tvar {};\n", vars.join(", ")), minify)?;

    for decl in &decls {
        w.write_all(&decl.decl_code)?;
    }
    for decl in &decls {
        w.write_all(&decl.method_list_code)?;
    }
    for decl in &decls {
        w.write_all(&decl.type_init_code)?;
    }

    let shell = InitShell::STANDARD;
    write_injected(w, &shell.open(), minify)?;
    for decl in &decls {
        w.write_all(&decl.init_code)?;
    }
    write_injected(w, &shell.close(), minify)?;
    write_injected(w, "\t$pkg.$init = $init;\n\treturn $pkg;\n})();", minify)?;
    // The block separator survives minification.
    w.write_all(b"\n")
}
