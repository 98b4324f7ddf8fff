//! Toolchain registry.
//!
//! A [`Toolchain`] gives a uniform view of an archiver, an assembler and the
//! C and C++ compilers, each as a program plus flags. Three families exist:
//! GNU, Clang over GNU, and armclang. Each family comes in a native flavour,
//! used for host builds, and a cross flavour, used for target builds.
//!
//! [`ToolchainSet::from_config`] picks one family per variant from the
//! `{host,target}_toolchain_{gnu,clang,armclang}` configuration flags.
//! Exactly one flag must be set per variant.

mod armclang;
mod clang;
mod error;
mod gnu;
mod lookup;
mod probe;

pub use armclang::ArmClangToolchain;
pub use clang::ClangToolchain;
pub use error::ToolchainError;
pub use gnu::GnuToolchain;
pub use lookup::{CACHE_WRAPPERS, SearchPath, ToolResolver};

use serde::Serialize;
use std::fmt;

use crate::config::ConfigStore;
use crate::module::TargetType;

/// A program and the flags every invocation needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tool {
    /// Program name or path.
    pub program: String,
    /// Flags passed before any per-module flags.
    pub flags: Vec<String>,
}

impl Tool {
    /// Program with flags.
    pub fn new(program: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            program: program.into(),
            flags,
        }
    }

    /// Program without flags.
    pub fn program(program: impl Into<String>) -> Self {
        Self::new(program, Vec::new())
    }
}

/// Native or cross compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavour {
    /// Builds for the build machine.
    Native,
    /// Builds for another machine.
    Cross,
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::Cross => "cross",
        })
    }
}

/// Compiler family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolchainFamily {
    /// GNU binutils and GCC.
    Gnu,
    /// Clang backed by a GNU installation.
    Clang,
    /// Arm Compiler 6.
    #[serde(rename = "armclang")]
    ArmClang,
}

impl ToolchainFamily {
    /// Every family, in selection-flag order.
    pub const ALL: [Self; 3] = [Self::Gnu, Self::Clang, Self::ArmClang];

    /// Suffix used in the selection flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gnu => "gnu",
            Self::Clang => "clang",
            Self::ArmClang => "armclang",
        }
    }

    /// Configuration flag selecting this family for `axis`.
    #[must_use]
    pub fn selection_key(self, axis: TargetType) -> String {
        format!("{axis}_toolchain_{}", self.as_str())
    }
}

impl fmt::Display for ToolchainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform view over a compiler family.
pub trait Toolchain: fmt::Debug + Send + Sync {
    /// Family of this toolchain.
    fn family(&self) -> ToolchainFamily;
    /// Native or cross.
    fn flavour(&self) -> Flavour;
    /// Static archiver.
    fn archiver(&self) -> &Tool;
    /// Assembler.
    fn assembler(&self) -> &Tool;
    /// C compiler.
    fn c_compiler(&self) -> &Tool;
    /// C++ compiler.
    fn cxx_compiler(&self) -> &Tool;
}

/// Serialisable snapshot of a [`Toolchain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainSummary {
    /// Family.
    pub family: ToolchainFamily,
    /// Native or cross.
    pub flavour: Flavour,
    /// Archiver.
    pub archiver: Tool,
    /// Assembler.
    pub assembler: Tool,
    /// C compiler.
    pub c_compiler: Tool,
    /// C++ compiler.
    pub cxx_compiler: Tool,
}

impl ToolchainSummary {
    /// Snapshot `toolchain`.
    #[must_use]
    pub fn of(toolchain: &dyn Toolchain) -> Self {
        Self {
            family: toolchain.family(),
            flavour: toolchain.flavour(),
            archiver: toolchain.archiver().clone(),
            assembler: toolchain.assembler().clone(),
            c_compiler: toolchain.c_compiler().clone(),
            cxx_compiler: toolchain.cxx_compiler().clone(),
        }
    }
}

/// Host and target toolchains.
#[derive(Debug)]
pub struct ToolchainSet {
    host: Box<dyn Toolchain>,
    target: Box<dyn Toolchain>,
}

impl ToolchainSet {
    /// Build both toolchains, resolving programs on the process `PATH`.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolchainError`] when the selection is ambiguous or a
    /// toolchain cannot be built.
    pub fn from_config(config: &ConfigStore) -> Result<Self, ToolchainError> {
        Self::from_config_with(config, &ToolResolver::from_env()?)
    }

    /// Build both toolchains with an explicit resolver.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolchainError`] when the selection is ambiguous or a
    /// toolchain cannot be built.
    pub fn from_config_with(
        config: &ConfigStore,
        resolver: &ToolResolver,
    ) -> Result<Self, ToolchainError> {
        let host = build(config, resolver, TargetType::Host)?;
        let target = build(config, resolver, TargetType::Target)?;
        tracing::info!(
            host = %host.family(),
            target = %target.family(),
            "configured toolchains"
        );
        Ok(Self { host, target })
    }

    /// Toolchain for `variant`.
    #[must_use]
    pub fn get(&self, variant: TargetType) -> &dyn Toolchain {
        match variant {
            TargetType::Host => self.host.as_ref(),
            TargetType::Target => self.target.as_ref(),
        }
    }

    /// Summaries of both toolchains, keyed by variant name.
    #[must_use]
    pub fn summary(&self) -> ToolchainSetSummary {
        ToolchainSetSummary {
            host: ToolchainSummary::of(self.host.as_ref()),
            target: ToolchainSummary::of(self.target.as_ref()),
        }
    }
}

/// Serialisable snapshot of a [`ToolchainSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainSetSummary {
    /// Host toolchain.
    pub host: ToolchainSummary,
    /// Target toolchain.
    pub target: ToolchainSummary,
}

/// The single family selected for `axis`.
///
/// # Errors
///
/// Returns [`ToolchainError::NoneSelected`] or
/// [`ToolchainError::SeveralSelected`].
pub fn selected_family(
    config: &ConfigStore,
    axis: TargetType,
) -> Result<ToolchainFamily, ToolchainError> {
    let mut selected = Vec::new();
    for family in ToolchainFamily::ALL {
        if config.flag(&family.selection_key(axis))? {
            selected.push(family);
        }
    }
    match selected.as_slice() {
        [] => Err(ToolchainError::NoneSelected { axis }),
        [family] => Ok(*family),
        several => Err(ToolchainError::SeveralSelected {
            axis,
            families: several
                .iter()
                .map(|family| family.selection_key(axis))
                .collect(),
        }),
    }
}

fn build(
    config: &ConfigStore,
    resolver: &ToolResolver,
    axis: TargetType,
) -> Result<Box<dyn Toolchain>, ToolchainError> {
    let family = selected_family(config, axis)?;
    Ok(match (family, axis) {
        (ToolchainFamily::Gnu, TargetType::Host) => Box::new(GnuToolchain::native(config, resolver)?),
        (ToolchainFamily::Gnu, TargetType::Target) => Box::new(GnuToolchain::cross(config, resolver)?),
        (ToolchainFamily::Clang, TargetType::Host) => {
            Box::new(ClangToolchain::native(config, resolver)?)
        }
        (ToolchainFamily::Clang, TargetType::Target) => {
            Box::new(ClangToolchain::cross(config, resolver)?)
        }
        (ToolchainFamily::ArmClang, TargetType::Host) => Box::new(ArmClangToolchain::native(config)?),
        (ToolchainFamily::ArmClang, TargetType::Target) => Box::new(ArmClangToolchain::cross(config)?),
    })
}

/// Shell-split the flag string stored under `key`; missing or empty values
/// give no flags.
pub(crate) fn split_flags(config: &ConfigStore, key: &str) -> Result<Vec<String>, ToolchainError> {
    let Some(value) = config.get_optional_string(key)? else {
        return Ok(Vec::new());
    };
    shlex::split(value).ok_or_else(|| ToolchainError::InvalidFlags {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}
