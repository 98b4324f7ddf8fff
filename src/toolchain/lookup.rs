//! Program lookup on the search path, seeing through compiler-cache
//! wrappers.
//!
//! A compiler configured as `gcc` is often found first as a symlink to
//! `ccache` or `sccache`. Such a hit tells us nothing about where the real
//! toolchain is installed, so the lookup is repeated over the directories
//! after the one holding the wrapper.

use std::{
    env, fs,
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard},
};

use camino::{Utf8Path, Utf8PathBuf};
use lru::LruCache;

use super::ToolchainError;

const CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(63);

/// Known compiler-cache wrapper programs.
pub const CACHE_WRAPPERS: [&str; 2] = ["ccache", "sccache"];

/// Ordered list of directories to search for programs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<Utf8PathBuf>,
}

impl SearchPath {
    /// Use an explicit list of directories.
    pub fn new(dirs: impl IntoIterator<Item = impl Into<Utf8PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Capture the process `PATH`. Empty entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::NonUtf8SearchPath`] for entries that are not
    /// valid UTF-8.
    pub fn from_env() -> Result<Self, ToolchainError> {
        let Some(raw) = env::var_os("PATH") else {
            return Ok(Self::default());
        };
        let mut dirs = Vec::new();
        for entry in env::split_paths(&raw) {
            if entry.as_os_str().is_empty() {
                continue;
            }
            let dir = Utf8PathBuf::from_path_buf(entry)
                .map_err(|path| ToolchainError::NonUtf8SearchPath { path })?;
            dirs.push(dir);
        }
        Ok(Self { dirs })
    }

    /// Directories in search order.
    #[must_use]
    pub fn dirs(&self) -> &[Utf8PathBuf] {
        &self.dirs
    }

    /// First executable called `program` in `dirs`, with its position.
    fn find_in(dirs: &[Utf8PathBuf], program: &str) -> Option<(usize, Utf8PathBuf)> {
        dirs.iter().enumerate().find_map(|(position, dir)| {
            let candidate = dir.join(program);
            is_executable(&candidate).then_some((position, candidate))
        })
    }
}

/// Resolves program names to paths, memoising results.
#[derive(Debug)]
pub struct ToolResolver {
    search: SearchPath,
    cache: Mutex<LruCache<String, Utf8PathBuf>>,
}

impl ToolResolver {
    /// Create a resolver over `search`.
    #[must_use]
    pub fn new(search: SearchPath) -> Self {
        Self {
            search,
            cache: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        }
    }

    /// Create a resolver over the process `PATH`.
    ///
    /// # Errors
    ///
    /// Propagates [`SearchPath::from_env`] failures.
    pub fn from_env() -> Result<Self, ToolchainError> {
        Ok(Self::new(SearchPath::from_env()?))
    }

    /// Search path used by this resolver.
    #[must_use]
    pub const fn search_path(&self) -> &SearchPath {
        &self.search
    }

    /// Resolve `program` to the real executable.
    ///
    /// Absolute names are used as given. Others are looked up on the search
    /// path. When the hit is a symlink to a cache wrapper, the lookup is
    /// repeated over the directories after the wrapper's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::NotFound`] when nothing matches and
    /// [`ToolchainError::WrapperTargetNotFound`] when only the wrapper was
    /// found.
    pub fn resolve(&self, program: &str) -> Result<Utf8PathBuf, ToolchainError> {
        if let Some(hit) = self.lock_cache().get(program) {
            return Ok(hit.clone());
        }
        let resolved = self.lookup(program)?;
        self.lock_cache().put(program.to_owned(), resolved.clone());
        Ok(resolved)
    }

    fn lookup(&self, program: &str) -> Result<Utf8PathBuf, ToolchainError> {
        let dirs = self.search.dirs();
        let (position, first) = if Utf8Path::new(program).is_absolute() {
            let path = Utf8PathBuf::from(program);
            let position = path
                .parent()
                .and_then(|parent| dirs.iter().position(|dir| dir == parent));
            (position, path)
        } else {
            let (position, path) =
                SearchPath::find_in(dirs, program).ok_or_else(|| ToolchainError::NotFound {
                    program: program.to_owned(),
                    searched: dirs.to_vec(),
                })?;
            (Some(position), path)
        };

        let Some(wrapper) = cache_wrapper(&first) else {
            return Ok(first);
        };
        tracing::debug!(path = %first, wrapper, "skipping compiler-cache wrapper");
        let unqualified = first.file_name().unwrap_or(program).to_owned();
        let remaining = position
            .and_then(|found| dirs.get(found + 1..))
            .unwrap_or_default();
        SearchPath::find_in(remaining, &unqualified)
            .map(|(_, path)| path)
            .ok_or_else(|| ToolchainError::WrapperTargetNotFound {
                program: unqualified,
                path: first,
                wrapper: wrapper.to_owned(),
            })
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<String, Utf8PathBuf>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Name of the cache wrapper `path` links to, if it is such a symlink.
fn cache_wrapper(path: &Utf8Path) -> Option<&'static str> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if !metadata.file_type().is_symlink() {
        return None;
    }
    let target = fs::read_link(path).ok()?;
    let base = target.file_name()?.to_str()?;
    CACHE_WRAPPERS.into_iter().find(|wrapper| *wrapper == base)
}

pub(crate) fn is_executable(path: &Utf8Path) -> bool {
    fs::metadata(path.as_std_path())
        .is_ok_and(|metadata| metadata.is_file() && has_execute_permission(&metadata))
}

#[cfg(unix)]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    metadata.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;
    use test_support::write_exec;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir")
    }

    #[rstest]
    fn finds_the_first_executable() {
        let first = TempDir::new().expect("first");
        let second = TempDir::new().expect("second");
        fs::write(first.path().join("gcc"), "not executable").expect("plain file");
        let expected = write_exec(second.path(), "gcc", "#!/bin/sh\n").expect("gcc");

        let resolver = ToolResolver::new(SearchPath::new([utf8(&first), utf8(&second)]));
        assert_eq!(resolver.resolve("gcc").expect("resolve"), expected);
    }

    #[rstest]
    fn missing_programs_report_the_search_path() {
        let dir = TempDir::new().expect("dir");
        let resolver = ToolResolver::new(SearchPath::new([utf8(&dir)]));
        let err = resolver.resolve("nothing-here").expect_err("missing");
        assert!(matches!(err, ToolchainError::NotFound { ref searched, .. } if searched.len() == 1));
    }

    #[rstest]
    #[case("ccache")]
    #[case("sccache")]
    fn wrappers_are_seen_through(#[case] wrapper: &str) {
        let cache_bin = TempDir::new().expect("cache");
        let real_bin = TempDir::new().expect("real");
        let wrapper_path = write_exec(cache_bin.path(), wrapper, "#!/bin/sh\n").expect("wrapper");
        symlink(&wrapper_path, cache_bin.path().join("gcc")).expect("symlink");
        let real = write_exec(real_bin.path(), "gcc", "#!/bin/sh\n").expect("gcc");

        let resolver = ToolResolver::new(SearchPath::new([utf8(&cache_bin), utf8(&real_bin)]));
        assert_eq!(resolver.resolve("gcc").expect("resolve"), real);
    }

    #[rstest]
    fn wrappers_without_a_real_compiler_fail() {
        let cache_bin = TempDir::new().expect("cache");
        let wrapper_path = write_exec(cache_bin.path(), "ccache", "#!/bin/sh\n").expect("wrapper");
        symlink(&wrapper_path, cache_bin.path().join("cc")).expect("symlink");

        let resolver = ToolResolver::new(SearchPath::new([utf8(&cache_bin)]));
        let err = resolver.resolve("cc").expect_err("wrapper only");
        assert!(matches!(err, ToolchainError::WrapperTargetNotFound { .. }));
    }

    #[rstest]
    fn results_are_cached() {
        let dir = TempDir::new().expect("dir");
        let path = write_exec(dir.path(), "as", "#!/bin/sh\n").expect("as");
        let resolver = ToolResolver::new(SearchPath::new([utf8(&dir)]));
        assert_eq!(resolver.resolve("as").expect("first"), path);
        fs::remove_file(&path).expect("remove");
        assert_eq!(resolver.resolve("as").expect("cached"), path);
    }

    #[rstest]
    fn absolute_names_are_used_as_given() {
        let resolver = ToolResolver::new(SearchPath::default());
        assert_eq!(
            resolver.resolve("/opt/tools/bin/gcc").expect("absolute"),
            Utf8PathBuf::from("/opt/tools/bin/gcc")
        );
    }
}
