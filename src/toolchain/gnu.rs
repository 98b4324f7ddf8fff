//! GNU toolchains.

use std::sync::OnceLock;

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::ConfigStore;

use super::{
    Flavour, Tool, Toolchain, ToolchainError, ToolchainFamily, lookup::ToolResolver, probe,
    split_flags,
};

/// GNU binutils and GCC, natively or with a target prefix.
#[derive(Debug)]
pub struct GnuToolchain {
    flavour: Flavour,
    prefix: String,
    archiver: Tool,
    assembler: Tool,
    c_compiler: Tool,
    cxx_compiler: Tool,
    bin_dir: Utf8PathBuf,
    cxx_path: Utf8PathBuf,
    header_dirs: OnceLock<Vec<Utf8PathBuf>>,
}

impl GnuToolchain {
    /// Native toolchain from `ar_binary`, `as_binary`, `gnu_cc_binary` and
    /// `gnu_cxx_binary`.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolchainError`] when a key is missing or the compilers
    /// cannot be resolved.
    pub fn native(config: &ConfigStore, resolver: &ToolResolver) -> Result<Self, ToolchainError> {
        Self::build(config, resolver, Flavour::Native, String::new(), Vec::new())
    }

    /// Cross toolchain: every program is prefixed with
    /// `target_gnu_toolchain_prefix`, and `target_gnu_flags` are passed to
    /// both compilers.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolchainError`] when a key is missing, the flags cannot be
    /// split or the compilers cannot be resolved.
    pub fn cross(config: &ConfigStore, resolver: &ToolResolver) -> Result<Self, ToolchainError> {
        let prefix = config
            .get_optional_string("target_gnu_toolchain_prefix")?
            .unwrap_or_default()
            .to_owned();
        let flags = split_flags(config, "target_gnu_flags")?;
        Self::build(config, resolver, Flavour::Cross, prefix, flags)
    }

    fn build(
        config: &ConfigStore,
        resolver: &ToolResolver,
        flavour: Flavour,
        prefix: String,
        cflags: Vec<String>,
    ) -> Result<Self, ToolchainError> {
        let program = |key: &str| -> Result<String, ToolchainError> {
            Ok(format!("{prefix}{}", config.get_string(key)?))
        };
        let c_compiler = Tool::new(program("gnu_cc_binary")?, cflags.clone());
        let cxx_compiler = Tool::new(program("gnu_cxx_binary")?, cflags);
        let cc_path = resolver.resolve(&c_compiler.program)?;
        let cxx_path = resolver.resolve(&cxx_compiler.program)?;
        let bin_dir = cc_path
            .parent()
            .map_or_else(Utf8PathBuf::new, Utf8Path::to_path_buf);
        tracing::debug!(
            %flavour,
            compiler = %cc_path,
            bin_dir = %bin_dir,
            "configured GNU toolchain"
        );
        Ok(Self {
            flavour,
            archiver: Tool::program(program("ar_binary")?),
            assembler: Tool::program(program("as_binary")?),
            prefix,
            c_compiler,
            cxx_compiler,
            bin_dir,
            cxx_path,
            header_dirs: OnceLock::new(),
        })
    }

    /// Directory holding the resolved C compiler.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// Parent of [`Self::bin_dir`].
    #[must_use]
    pub fn install_dir(&self) -> &Utf8Path {
        self.bin_dir.parent().unwrap_or(&self.bin_dir)
    }

    /// Directories holding the toolchain's programs.
    ///
    /// Prefixed toolchains often ship a `<install>/<triple>/bin` directory of
    /// unprefixed programs; it is listed after the main bin directory when
    /// present.
    #[must_use]
    pub fn bin_dirs(&self) -> Vec<Utf8PathBuf> {
        let mut dirs = vec![self.bin_dir.clone()];
        if matches!(self.flavour, Flavour::Cross)
            && let Some(triple) = self.prefix_triple()
        {
            let unprefixed = self.install_dir().join(triple).join("bin");
            if unprefixed.is_dir() {
                dirs.push(unprefixed);
            }
        }
        dirs
    }

    /// Triple named by the program prefix: its last path component without
    /// the trailing `-`.
    fn prefix_triple(&self) -> Option<&str> {
        Utf8Path::new(self.prefix.trim_end_matches('-'))
            .file_name()
            .filter(|triple| !triple.is_empty())
    }

    /// libstdc++ header directories, probed from the C++ compiler once and
    /// then cached.
    ///
    /// Native: `<install>/include/c++/<version>` and
    /// `<install>/include/c++/<version>/<triple>`. Cross:
    /// `<install>/<triple>/include/c++/<version>` and
    /// `<install>/<triple>/include/c++/<version>/<triple>`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::Probe`] when the compiler cannot report its
    /// triple or version.
    pub fn std_cxx_header_dirs(&self) -> Result<Vec<Utf8PathBuf>, ToolchainError> {
        if let Some(dirs) = self.header_dirs.get() {
            return Ok(dirs.clone());
        }
        let triple = probe::target_triple(&self.cxx_path, &self.cxx_compiler.flags)?;
        let version = probe::version(&self.cxx_path)?;
        let base = match self.flavour {
            Flavour::Native => self.install_dir().to_path_buf(),
            Flavour::Cross => self.install_dir().join(&triple),
        };
        let cxx = base.join("include").join("c++").join(&version);
        let dirs = vec![cxx.clone(), cxx.join(&triple)];
        Ok(self.header_dirs.get_or_init(|| dirs).clone())
    }
}

impl Toolchain for GnuToolchain {
    fn family(&self) -> ToolchainFamily {
        ToolchainFamily::Gnu
    }

    fn flavour(&self) -> Flavour {
        self.flavour
    }

    fn archiver(&self) -> &Tool {
        &self.archiver
    }

    fn assembler(&self) -> &Tool {
        &self.assembler
    }

    fn c_compiler(&self) -> &Tool {
        &self.c_compiler
    }

    fn cxx_compiler(&self) -> &Tool {
        &self.cxx_compiler
    }
}
