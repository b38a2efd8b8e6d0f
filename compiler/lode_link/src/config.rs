//! Link configuration.

use crate::assemble::PRELUDE;

/// Settings for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Import path of the baseline package every program depends on.
    pub runtime_package: String,
    /// Force minification on or off. `None` follows the entry package's flag.
    pub minify: Option<bool>,
    /// Member of the entry package's object the epilogue invokes.
    pub entry_symbol: String,
    /// Runtime bootstrap emitted once before the first module.
    pub prelude: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            runtime_package: "runtime".to_string(),
            minify: None,
            entry_symbol: "$init".to_string(),
            prelude: PRELUDE.to_string(),
        }
    }
}

impl LinkConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_runtime_package(mut self, path: impl Into<String>) -> Self {
        self.runtime_package = path.into();
        self
    }

    #[must_use]
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = Some(minify);
        self
    }

    #[must_use]
    pub fn with_entry_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.entry_symbol = symbol.into();
        self
    }

    #[must_use]
    pub fn with_prelude(mut self, prelude: impl Into<String>) -> Self {
        self.prelude = prelude.into();
        self
    }

    /// Whether output is minified for a program whose entry package carries
    /// `entry_flag`.
    #[must_use]
    pub fn minify_for(&self, entry_flag: bool) -> bool {
        self.minify.unwrap_or(entry_flag)
    }
}
