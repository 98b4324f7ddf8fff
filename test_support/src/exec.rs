//! Helpers for creating executable stubs in tests.
//!
//! These utilities write tiny shell scripts and mark them executable so tests
//! can exercise search-path resolution and compiler probes without depending
//! on real toolchains. Callers own the containing directory's lifetime to keep
//! the stub on disk.
//!
//! # Examples
//!
//! ```rust
//! use tempfile::TempDir;
//! use test_support::write_exec;
//!
//! let temp = TempDir::new().expect("tempdir");
//! let path = write_exec(temp.path(), "tool", "#!/bin/sh\n").expect("stub executable");
//! assert!(path.exists());
//! ```

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Write an executable script named `name` with `body` inside `dir`,
/// creating `dir` first when needed.
pub fn write_exec(dir: &Path, name: &str, body: &str) -> Result<Utf8PathBuf> {
    let dir = Utf8Path::from_path(dir)
        .ok_or_else(|| anyhow!("non-UTF-8 stub directory {}", dir.display()))?;
    fs::create_dir_all(dir.as_std_path()).with_context(|| format!("create {dir}"))?;
    let path = dir.join(name);
    fs::write(path.as_std_path(), body).with_context(|| format!("write exec stub {name}"))?;
    make_executable(&path)?;
    Ok(path)
}

/// Write a compiler stub that answers the probes used for header discovery.
///
/// `-print-multiarch` and `-dumpmachine` print `triple`; `-dumpversion`
/// prints `version`. Any other invocation exits successfully without output.
pub fn fake_compiler(dir: &Path, name: &str, triple: &str, version: &str) -> Result<Utf8PathBuf> {
    let body = format!(
        "#!/bin/sh\n\
         for arg; do\n\
         \x20 case \"$arg\" in\n\
         \x20   -print-multiarch|-dumpmachine) echo {triple}; exit 0 ;;\n\
         \x20   -dumpversion) echo {version}; exit 0 ;;\n\
         \x20 esac\n\
         done\n"
    );
    write_exec(dir, name, &body)
}

/// Mark an existing file as executable on Unix; no-op elsewhere.
fn make_executable(path: &Utf8Path) -> Result<()> {
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path.as_std_path())
            .context("stat exec stub")?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path.as_std_path(), perms).context("chmod exec stub")?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
