//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Resolve module declarations into a per-variant build graph.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON build configuration.
    #[arg(short, long, global = true, value_name = "FILE", default_value = "config.json")]
    pub config: Utf8PathBuf,

    /// Enable verbose logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments accepted by the `resolve` command.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct ResolveArgs {
    /// YAML file declaring the modules.
    #[arg(short, long, value_name = "FILE")]
    pub modules: Utf8PathBuf,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Resolve the declared modules and print the result as JSON.
    Resolve(ResolveArgs),

    /// Print the configured host and target toolchains as JSON.
    Toolchains,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "modresolve",
            "resolve",
            "--modules",
            "modules.yml",
            "--config",
            "build/config.json",
            "-v",
        ])
        .expect("parse");
        assert!(cli.verbose);
        assert_eq!(cli.config, "build/config.json");
        assert_eq!(
            cli.command,
            Commands::Resolve(ResolveArgs {
                modules: Utf8PathBuf::from("modules.yml"),
            })
        );
    }

    #[rstest]
    #[case(&["modresolve"])]
    #[case(&["modresolve", "resolve"])]
    fn missing_arguments_are_rejected(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[rstest]
    fn config_defaults_to_the_working_directory() {
        let cli = Cli::try_parse_from(["modresolve", "toolchains"]).expect("parse");
        assert_eq!(cli.config, "config.json");
        assert_eq!(cli.command, Commands::Toolchains);
    }
}
