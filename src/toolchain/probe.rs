//! Compiler subprocess probes.

use std::process::Command;

use camino::Utf8Path;

use super::ToolchainError;

/// Run `program` with `args` and return its trimmed standard output.
///
/// # Errors
///
/// Returns [`ToolchainError::Probe`] when the program cannot be spawned,
/// exits unsuccessfully or prints non-UTF-8 output.
pub(crate) fn output(program: &Utf8Path, args: &[String]) -> Result<String, ToolchainError> {
    let failed = |message: String| ToolchainError::Probe {
        program: program.to_path_buf(),
        args: args.to_vec(),
        message,
    };
    let out = Command::new(program.as_std_path())
        .args(args)
        .output()
        .map_err(|err| failed(err.to_string()))?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(failed(format!("{} ({})", out.status, stderr.trim())));
    }
    let stdout = String::from_utf8(out.stdout).map_err(|err| failed(err.to_string()))?;
    let trimmed = stdout.trim().to_owned();
    tracing::debug!(program = %program, ?args, output = %trimmed, "compiler probe");
    Ok(trimmed)
}

/// Target triple used for the compiler's header subdirectory.
///
/// `-print-multiarch` is tried first; some compilers print nothing for it,
/// so `-dumpmachine` is the fallback.
pub(crate) fn target_triple(program: &Utf8Path, flags: &[String]) -> Result<String, ToolchainError> {
    let with = |option: &str| {
        let mut args = flags.to_vec();
        args.push(option.to_owned());
        args
    };
    match output(program, &with("-print-multiarch")) {
        Ok(triple) if !triple.is_empty() => Ok(triple),
        Ok(_) | Err(_) => output(program, &with("-dumpmachine")),
    }
}

/// Compiler version as printed by `-dumpversion`.
pub(crate) fn version(program: &Utf8Path) -> Result<String, ToolchainError> {
    output(program, &["-dumpversion".to_owned()])
}
