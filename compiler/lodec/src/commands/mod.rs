//! Command handlers for the `lodec` CLI.
//!
//! Every command reads archives from an [`ArchiveCache`]: the entry
//! package is loaded first, then the linker resolves everything it
//! imports through the same cache.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use lode_archive::{Archive, ArchiveCache, CacheConfig, CacheError, PackageMap};
use lode_link::{LinkConfig, LinkError, LinkStats, Linker, SourceMapBuilder};

/// Failure of a CLI command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(String),
    #[error("package '{path}' is not in the cache")]
    NotCached { path: String },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("cannot write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot render source map: {0}")]
    SourceMap(#[from] serde_json::Error),
}

/// Options shared by every command that reads the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Import path of the entry package.
    pub package: String,
    pub cache_dir: PathBuf,
    /// Output file; stdout when unset.
    pub output: Option<PathBuf>,
    pub source_map: Option<PathBuf>,
    /// Force minification regardless of the entry package's flag.
    pub minify: bool,
}

impl LinkOptions {
    /// Parse the arguments following the sub-command.
    pub fn parse(args: &[String]) -> Result<Self, CommandError> {
        let mut options = Self::default();
        let mut package = None;
        let mut cache_dir = None;

        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if arg == "-o" {
                let Some(path) = args.get(i + 1) else {
                    return Err(CommandError::Usage("-o requires a path".to_string()));
                };
                options.output = Some(PathBuf::from(path));
                i += 2;
                continue;
            }
            if let Some(dir) = arg.strip_prefix("--cache=") {
                cache_dir = Some(PathBuf::from(dir));
            } else if let Some(path) = arg.strip_prefix("--source-map=") {
                options.source_map = Some(PathBuf::from(path));
            } else if arg == "--minify" {
                options.minify = true;
            } else if arg.starts_with('-') {
                return Err(CommandError::Usage(format!("unknown option '{arg}'")));
            } else if package.is_none() {
                package = Some(arg.clone());
            } else {
                return Err(CommandError::Usage(format!("unexpected argument '{arg}'")));
            }
            i += 1;
        }

        options.package =
            package.ok_or_else(|| CommandError::Usage("missing package import path".to_string()))?;
        options.cache_dir =
            cache_dir.ok_or_else(|| CommandError::Usage("missing --cache=<dir>".to_string()))?;
        Ok(options)
    }

    fn linker(&self) -> Linker {
        let mut config = LinkConfig::new();
        if self.minify {
            config = config.with_minify(true);
        }
        Linker::new(config)
    }
}

fn load_cached(
    cache: &ArchiveCache,
    path: &str,
    packages: &mut PackageMap,
) -> Result<Archive, CommandError> {
    cache
        .load(path, packages)?
        .ok_or_else(|| CommandError::NotCached {
            path: path.to_string(),
        })
}

/// Load the entry package and resolve its link order from the cache.
pub fn resolve_from_cache(
    options: &LinkOptions,
    linker: &Linker,
) -> Result<Vec<Archive>, CommandError> {
    let cache = ArchiveCache::new(CacheConfig::new(&options.cache_dir))?;
    let mut packages = PackageMap::new();
    let entry = load_cached(&cache, &options.package, &mut packages)?;
    let pkgs = linker.resolve(entry, |path: &str| load_cached(&cache, path, &mut packages))?;
    tracing::debug!(
        package = %options.package,
        packages = pkgs.len(),
        "resolved from cache"
    );
    Ok(pkgs)
}

/// `lodec deps`: the link order of a package.
pub fn deps(options: &LinkOptions) -> Result<Vec<String>, CommandError> {
    let pkgs = resolve_from_cache(options, &options.linker())?;
    Ok(pkgs.into_iter().map(|a| a.import_path).collect())
}

/// Declarations one package keeps after elimination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub import_path: String,
    pub selected: usize,
    pub total: usize,
}

/// `lodec dce`: per-package elimination results, in link order.
pub fn dce(options: &LinkOptions) -> Result<Vec<PackageSummary>, CommandError> {
    let linker = options.linker();
    let pkgs = resolve_from_cache(options, &linker)?;
    let selection = linker.select(&pkgs);
    Ok(pkgs
        .iter()
        .enumerate()
        .map(|(i, pkg)| PackageSummary {
            import_path: pkg.import_path.clone(),
            selected: selection.count_in(i),
            total: pkg.declarations.len(),
        })
        .collect())
}

fn create_output(path: &Path) -> Result<BufWriter<File>, CommandError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CommandError::Output {
            path: path.to_path_buf(),
            source,
        })
}

/// `lodec link`: write the linked program and, optionally, its source map.
pub fn link(options: &LinkOptions) -> Result<LinkStats, CommandError> {
    let linker = options.linker();
    let pkgs = resolve_from_cache(options, &linker)?;

    let sink: Box<dyn Write> = match &options.output {
        Some(path) => Box::new(create_output(path)?),
        None => Box::new(io::stdout().lock()),
    };

    let Some(map_path) = &options.source_map else {
        return Ok(linker.link(&pkgs, sink)?);
    };

    let file_name = options
        .output
        .as_deref()
        .and_then(Path::file_name)
        .map_or_else(|| "out.js".to_string(), |n| n.to_string_lossy().into_owned());
    let mut builder = SourceMapBuilder::new(file_name);
    let stats = linker.link_with_source_map(&pkgs, sink, |line, column, original| {
        builder.add_mapping(line, column, original);
    })?;

    let json = builder.to_json()?;
    std::fs::write(map_path, json).map_err(|source| CommandError::Output {
        path: map_path.clone(),
        source,
    })?;
    tracing::debug!(
        mappings = builder.len(),
        sources = builder.sources().len(),
        "wrote source map"
    );
    Ok(stats)
}
