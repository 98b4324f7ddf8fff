//! Arm Compiler (armclang) toolchains.

use crate::config::ConfigStore;

use super::{Flavour, Tool, Toolchain, ToolchainError, ToolchainFamily, split_flags};

/// Vendor Clang with its own archiver and assembler.
///
/// Unlike the GNU families no program is resolved on the search path, so
/// construction never touches the filesystem.
#[derive(Debug)]
pub struct ArmClangToolchain {
    flavour: Flavour,
    archiver: Tool,
    assembler: Tool,
    c_compiler: Tool,
    cxx_compiler: Tool,
}

impl ArmClangToolchain {
    /// Native toolchain from the `armclang_*_binary` keys.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::Config`] when a key is missing.
    pub fn native(config: &ConfigStore) -> Result<Self, ToolchainError> {
        Self::build(config, Flavour::Native, Vec::new())
    }

    /// Cross toolchain; `target_armclang_flags` go to both compilers.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::Config`] when a key is missing and
    /// [`ToolchainError::InvalidFlags`] when the flags cannot be split.
    pub fn cross(config: &ConfigStore) -> Result<Self, ToolchainError> {
        let flags = split_flags(config, "target_armclang_flags")?;
        Self::build(config, Flavour::Cross, flags)
    }

    fn build(config: &ConfigStore, flavour: Flavour, cflags: Vec<String>) -> Result<Self, ToolchainError> {
        Ok(Self {
            flavour,
            archiver: Tool::program(config.get_string("armclang_ar_binary")?),
            assembler: Tool::program(config.get_string("armclang_as_binary")?),
            c_compiler: Tool::new(config.get_string("armclang_cc_binary")?, cflags.clone()),
            cxx_compiler: Tool::new(config.get_string("armclang_cxx_binary")?, cflags),
        })
    }
}

impl Toolchain for ArmClangToolchain {
    fn family(&self) -> ToolchainFamily {
        ToolchainFamily::ArmClang
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> ConfigStore {
        ConfigStore::from_iter([
            ("armclang_ar_binary", "armar"),
            ("armclang_as_binary", "armasm"),
            ("armclang_cc_binary", "armclang"),
            ("armclang_cxx_binary", "armclang"),
            ("target_armclang_flags", "--target=arm-arm-none-eabi -mcpu='cortex-m4'"),
        ])
    }

    #[rstest]
    fn native_compilers_have_no_flags(config: ConfigStore) {
        let tc = ArmClangToolchain::native(&config).expect("toolchain");
        assert!(tc.c_compiler().flags.is_empty());
        assert_eq!(tc.archiver().program, "armar");
        assert_eq!(tc.flavour(), Flavour::Native);
    }

    #[rstest]
    fn cross_flags_are_shell_split(config: ConfigStore) {
        let tc = ArmClangToolchain::cross(&config).expect("toolchain");
        assert_eq!(
            tc.cxx_compiler().flags,
            ["--target=arm-arm-none-eabi", "-mcpu=cortex-m4"]
        );
        assert!(tc.assembler().flags.is_empty());
    }
}
