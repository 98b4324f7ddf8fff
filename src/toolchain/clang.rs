//! Clang toolchains backed by a GNU installation.
//!
//! Clang supplies the compilers; the archiver, the assembler and libstdc++
//! come from the GNU toolchain of the same variant.

use crate::config::ConfigStore;

use super::{Flavour, Tool, Toolchain, ToolchainError, ToolchainFamily, gnu::GnuToolchain, lookup::ToolResolver};

/// Clang compilers over a GNU toolchain.
#[derive(Debug)]
pub struct ClangToolchain {
    gnu: GnuToolchain,
    c_compiler: Tool,
    cxx_compiler: Tool,
    triple: Option<String>,
}

impl ClangToolchain {
    /// Native Clang over the native GNU toolchain.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolchainError`] when the GNU toolchain cannot be set up or
    /// the Clang keys are missing.
    pub fn native(config: &ConfigStore, resolver: &ToolResolver) -> Result<Self, ToolchainError> {
        let gnu = GnuToolchain::native(config, resolver)?;
        let cflags = Self::gnu_flags(&gnu);
        Self::assemble(config, gnu, cflags, Vec::new(), None)
    }

    /// Cross Clang over the cross GNU toolchain.
    ///
    /// A non-empty `target_sysroot` adds `--sysroot` and the GNU libstdc++
    /// header directories; it requires `target_clang_triple`. A non-empty
    /// triple adds `-target`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::MissingClangTriple`] when a sysroot is set
    /// without a triple, or any GNU toolchain failure including header
    /// probes.
    pub fn cross(config: &ConfigStore, resolver: &ToolResolver) -> Result<Self, ToolchainError> {
        let gnu = GnuToolchain::cross(config, resolver)?;
        let triple = config
            .get_optional_string("target_clang_triple")?
            .map(str::to_owned);

        let mut cflags = Self::gnu_flags(&gnu);
        let mut cxx_only = Vec::new();
        if let Some(sysroot) = config.get_optional_string("target_sysroot")? {
            if triple.is_none() {
                return Err(ToolchainError::MissingClangTriple);
            }
            cflags.extend(["--sysroot".to_owned(), sysroot.to_owned()]);
            for dir in gnu.std_cxx_header_dirs()? {
                cxx_only.extend(["-isystem".to_owned(), dir.into_string()]);
            }
        }
        if let Some(name) = &triple {
            cflags.extend(["-target".to_owned(), name.clone()]);
        }
        Self::assemble(config, gnu, cflags, cxx_only, triple)
    }

    /// `--gcc-toolchain` and `-B` flags pointing Clang at the GNU install.
    fn gnu_flags(gnu: &GnuToolchain) -> Vec<String> {
        let mut flags = vec![format!("--gcc-toolchain={}", gnu.install_dir())];
        flags.extend(gnu.bin_dirs().into_iter().map(|dir| format!("-B{dir}")));
        flags
    }

    fn assemble(
        config: &ConfigStore,
        gnu: GnuToolchain,
        cflags: Vec<String>,
        mut cxxflags: Vec<String>,
        triple: Option<String>,
    ) -> Result<Self, ToolchainError> {
        cxxflags.extend(cflags.iter().cloned());
        Ok(Self {
            c_compiler: Tool::new(config.get_string("clang_cc_binary")?, cflags),
            cxx_compiler: Tool::new(config.get_string("clang_cxx_binary")?, cxxflags),
            gnu,
            triple,
        })
    }

    /// The backing GNU toolchain.
    #[must_use]
    pub const fn gnu(&self) -> &GnuToolchain {
        &self.gnu
    }

    /// Target triple passed with `-target`, if any.
    #[must_use]
    pub fn triple(&self) -> Option<&str> {
        self.triple.as_deref()
    }
}

impl Toolchain for ClangToolchain {
    fn family(&self) -> ToolchainFamily {
        ToolchainFamily::Clang
    }

    fn flavour(&self) -> Flavour {
        self.gnu.flavour()
    }

    fn archiver(&self) -> &Tool {
        self.gnu.archiver()
    }

    fn assembler(&self) -> &Tool {
        self.gnu.assembler()
    }

    fn c_compiler(&self) -> &Tool {
        &self.c_compiler
    }

    fn cxx_compiler(&self) -> &Tool {
        &self.cxx_compiler
    }
}
