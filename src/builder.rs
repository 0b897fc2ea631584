use std::path::PathBuf;

use crate::engine::{ErrorHook, Walk, WalkConfig};
use crate::error::WalkError;
use crate::results::WalkStep;
use crate::sys::NativeBackend;
use crate::traits::Backend;

// ---------------------------------------------------------------------------
// WalkBuilder
// ---------------------------------------------------------------------------

/// Configures a tree walk.
///
/// Created via [`scanwalk::walk()`](crate::walk). Chain the options, then
/// either [`build()`](WalkBuilder::build) a [`Walk`] (needed for pruning)
/// or iterate the builder directly.
///
/// # Example
///
/// ```rust,ignore
/// let mut errors = Vec::new();
/// for step in scanwalk::walk("/srv/data")
///     .topdown(false)
///     .follow_links(true)
///     .on_error(|e| errors.push(e))
/// {
///     println!("{}: {} files", step.path.display(), step.filenames.len());
/// }
/// ```
pub struct WalkBuilder<'a, B: Backend = NativeBackend> {
    top:      PathBuf,
    config:   WalkConfig,
    on_error: Option<ErrorHook<'a>>,
    backend:  B,
}

impl WalkBuilder<'_> {
    pub(crate) fn new(top: PathBuf) -> Self {
        Self {
            top,
            config:   WalkConfig::default(),
            on_error: None,
            backend:  NativeBackend::default(),
        }
    }
}

impl<'a, B: Backend> WalkBuilder<'a, B> {
    // ── Order ─────────────────────────────────────────────────────────────

    /// Yield each directory before its subdirectories (the default), or
    /// after all of them with `false`.
    ///
    /// Pruning through `dirnames` only works top-down.
    pub fn topdown(mut self, yes: bool) -> Self {
        self.config.topdown = yes;
        self
    }

    // ── Symlinks ──────────────────────────────────────────────────────────

    /// Descend into symlinks that point at directories.
    ///
    /// Off by default. Such links are listed in `dirnames` either way.
    /// When on, a link that leads back to one of its own ancestors is
    /// reported as [`WalkError::SymlinkLoop`] and not descended.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.config.follow_links = yes;
        self
    }

    // ── Errors ────────────────────────────────────────────────────────────

    /// Called with each directory that could not be opened or read.
    ///
    /// The failing subtree is skipped either way; without a hook the
    /// failure is only logged.
    pub fn on_error(mut self, hook: impl FnMut(WalkError) + 'a) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    // ── Backend ───────────────────────────────────────────────────────────

    /// Enumerate with `backend` instead of the platform default.
    pub fn backend<C: Backend>(self, backend: C) -> WalkBuilder<'a, C> {
        WalkBuilder {
            top:      self.top,
            config:   self.config,
            on_error: self.on_error,
            backend,
        }
    }

    /// Replace all flags at once.
    pub fn config(mut self, config: WalkConfig) -> Self {
        self.config = config;
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Create the walk. Nothing is opened until the first step is requested.
    pub fn build(self) -> Walk<'a, B> {
        Walk::new(self.top, self.backend, self.config, self.on_error)
    }
}

impl<'a, B: Backend> IntoIterator for WalkBuilder<'a, B> {
    type Item = WalkStep;
    type IntoIter = Walk<'a, B>;

    fn into_iter(self) -> Walk<'a, B> {
        self.build()
    }
}
