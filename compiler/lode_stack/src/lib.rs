//! Stack safety for deep recursion.
//!
//! Import graphs are walked depth-first, and a program whose packages form a
//! long import chain (generated code, vendored trees) recurses once per link
//! in that chain. Wrapping each level in [`ensure_sufficient_stack`] grows
//! the stack on demand instead of overflowing it.
//!
//! # Platform Support
//!
//! - **Native targets**: Uses the `stacker` crate to grow the stack on demand.
//! - **WASM targets**: No-op passthrough (WASM has its own stack management).
//!
//! # Configuration
//!
//! - **Red zone**: 64KB - If less than this remains, we grow the stack
//! - **Growth size**: 1MB - Each growth allocates this much additional space

/// Minimum stack space to keep available (64KB red zone).
const RED_ZONE: usize = 64 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// ```text
/// fn visit(&mut self, path: &str) -> Result<(), ResolveError> {
///     ensure_sufficient_stack(|| {
///         for import in self.imports_of(path)? {
///             self.visit(&import)?;
///         }
///         Ok(())
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
