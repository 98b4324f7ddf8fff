//! Build context shared by every resolution step.
//!
//! A [`BuildContext`] bundles the configuration store with the host and target
//! toolchains. It is built once and read concurrently afterwards. Hosts that
//! defer construction until first use go through a [`ContextCell`], which
//! makes repeated and concurrent callers converge on one instance.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use camino::Utf8Path;

use crate::config::ConfigStore;
use crate::toolchain::{ToolchainError, ToolchainSet};

/// Configuration and toolchains, immutable once built.
#[derive(Debug)]
pub struct BuildContext {
    config: ConfigStore,
    toolchains: ToolchainSet,
}

impl BuildContext {
    /// Combine an existing configuration and toolchain set.
    #[must_use]
    pub const fn new(config: ConfigStore, toolchains: ToolchainSet) -> Self {
        Self { config, toolchains }
    }

    /// Build a context from `config`, resolving compilers on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolchainError`] when the toolchains cannot be set up.
    pub fn from_config(config: ConfigStore) -> Result<Self, ToolchainError> {
        let toolchains = ToolchainSet::from_config(&config)?;
        Ok(Self::new(config, toolchains))
    }

    /// Load the configuration file at `path` and build a context from it.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolchainError`] when the file cannot be loaded or the
    /// toolchains cannot be set up.
    pub fn from_config_path(path: &Utf8Path) -> Result<Self, ToolchainError> {
        Self::from_config(ConfigStore::from_path(path)?)
    }

    /// The configuration store.
    #[must_use]
    pub const fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// The host and target toolchains.
    #[must_use]
    pub const fn toolchains(&self) -> &ToolchainSet {
        &self.toolchains
    }
}

/// Lazily built, process-wide [`BuildContext`].
///
/// The first successful [`ContextCell::get_or_try_init`] stores the context;
/// later calls return it without running their initialiser. A failed
/// initialiser stores nothing, so the next caller retries.
#[derive(Debug, Default)]
pub struct ContextCell {
    value: OnceLock<Arc<BuildContext>>,
    init: Mutex<()>,
}

impl ContextCell {
    /// An empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The stored context, if one has been built.
    #[must_use]
    pub fn get(&self) -> Option<Arc<BuildContext>> {
        self.value.get().cloned()
    }

    /// Return the stored context, building it with `init` on first use.
    ///
    /// Concurrent callers block while one of them runs `init`.
    ///
    /// # Errors
    ///
    /// Returns whatever `init` returns; the cell stays empty in that case.
    pub fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<BuildContext, E>,
    ) -> Result<Arc<BuildContext>, E> {
        if let Some(context) = self.value.get() {
            return Ok(Arc::clone(context));
        }
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(context) = self.value.get() {
            return Ok(Arc::clone(context));
        }
        let context = Arc::new(init()?);
        tracing::debug!("build context initialised");
        Ok(Arc::clone(self.value.get_or_init(|| context)))
    }
}
