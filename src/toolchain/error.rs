//! Toolchain configuration and discovery errors.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::module::TargetType;

/// Failures while building toolchain descriptors. All of them are fatal.
#[derive(Debug, Error, Diagnostic)]
pub enum ToolchainError {
    /// A required configuration value is missing or malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// No toolchain family is selected for a variant.
    #[error("no {axis} toolchain configured")]
    #[diagnostic(
        code(modresolve::toolchain::none_selected),
        help("set exactly one of {axis}_toolchain_gnu, {axis}_toolchain_clang or {axis}_toolchain_armclang")
    )]
    NoneSelected {
        /// Variant lacking a toolchain.
        axis: TargetType,
    },

    /// Several toolchain families are selected for one variant.
    #[error("several {axis} toolchains configured: {}", families.join(", "))]
    #[diagnostic(code(modresolve::toolchain::several_selected))]
    SeveralSelected {
        /// Variant with conflicting selections.
        axis: TargetType,
        /// Configuration keys that are set.
        families: Vec<String>,
    },

    /// A flag string could not be split into arguments.
    #[error("configuration key `{key}` holds unbalanced quoting: {value}")]
    #[diagnostic(code(modresolve::toolchain::flags))]
    InvalidFlags {
        /// Configuration key.
        key: String,
        /// Offending value.
        value: String,
    },

    /// `target_sysroot` is set for a cross Clang toolchain without a triple.
    #[error("target_sysroot is set but target_clang_triple is not")]
    #[diagnostic(
        code(modresolve::toolchain::missing_clang_triple),
        help("a sysroot is only meaningful together with an explicit -target triple")
    )]
    MissingClangTriple,

    /// The `PATH` environment variable holds a non-UTF-8 directory.
    #[error("PATH entry {} is not valid UTF-8", path.display())]
    #[diagnostic(code(modresolve::toolchain::search_path))]
    NonUtf8SearchPath {
        /// Offending entry.
        path: PathBuf,
    },

    /// A program is not on the search path.
    #[error("cannot find `{program}` on the search path")]
    #[diagnostic(code(modresolve::toolchain::not_found))]
    NotFound {
        /// Requested program.
        program: String,
        /// Directories scanned.
        searched: Vec<Utf8PathBuf>,
    },

    /// A program resolved to a compiler-cache wrapper with nothing behind it.
    #[error("{path} is a {wrapper} symlink, and the real `{program}` could not be found after it")]
    #[diagnostic(
        code(modresolve::toolchain::wrapper_target),
        help("install the compiler in a search path directory listed after the wrapper directory")
    )]
    WrapperTargetNotFound {
        /// Requested program.
        program: String,
        /// Wrapper symlink that was found first.
        path: Utf8PathBuf,
        /// Wrapper name (`ccache` or `sccache`).
        wrapper: String,
    },

    /// A compiler probe could not be run or failed.
    #[error("probing `{program} {}` failed: {message}", args.join(" "))]
    #[diagnostic(code(modresolve::toolchain::probe))]
    Probe {
        /// Program that was run.
        program: Utf8PathBuf,
        /// Arguments passed.
        args: Vec<String>,
        /// Failure description.
        message: String,
    },
}
