//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the configuration, runs the requested command and writes its JSON
//! result to a caller-supplied writer.

use crate::action::{JsonSummarySink, ModuleSummary, emit};
use crate::cli::{Cli, Commands, ResolveArgs};
use crate::context::BuildContext;
use crate::graph::ModuleGraph;
use crate::module::BuildDescription;
use crate::phases::Pipeline;
use crate::toolchain::ToolchainSetSummary;
use anyhow::{Context, Result};
use miette::Diagnostic;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, error};

/// JSON document printed by `resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    /// Host and target toolchains used.
    pub toolchains: ToolchainSetSummary,
    /// Buildable modules, one entry per variant.
    pub modules: Vec<ModuleSummary>,
}

/// Execute the parsed [`Cli`] command, writing its output to `out`.
///
/// # Errors
///
/// Returns an error if the configuration or declarations cannot be loaded,
/// resolution fails, or the output cannot be written.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let context = BuildContext::from_config_path(&cli.config)
        .with_context(|| format!("loading build configuration {}", cli.config))?;
    match &cli.command {
        Commands::Resolve(args) => {
            let output = resolve(&context, args)?;
            write_json(out, &output)
        }
        Commands::Toolchains => write_json(out, &context.toolchains().summary()),
    }
}

/// Load, resolve and summarise the modules named by `args`.
///
/// # Errors
///
/// Returns an error if the declarations are invalid or a pipeline step fails.
pub fn resolve(context: &BuildContext, args: &ResolveArgs) -> Result<ResolveOutput> {
    let modules = BuildDescription::from_path(&args.modules)
        .and_then(BuildDescription::into_modules)
        .inspect_err(|err| log_related(err))
        .with_context(|| format!("loading module declarations {}", args.modules))?;
    debug!(count = modules.len(), "declared modules");
    let mut graph = ModuleGraph::from_modules(modules).context("building module graph")?;
    Pipeline::new(context)
        .run(&mut graph)
        .inspect_err(|err| log_related(err))
        .context("resolving module graph")?;

    let mut sink = JsonSummarySink::new();
    emit(&graph, context, &mut sink).context("summarising resolved modules")?;
    Ok(ResolveOutput {
        toolchains: context.toolchains().summary(),
        modules: sink.into_modules(),
    })
}

/// Log every related diagnostic; the `anyhow` chain only carries the summary.
fn log_related(err: &dyn Diagnostic) {
    for related in err.related().into_iter().flatten() {
        error!("{related}");
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("serialising output")?;
    writeln!(out).context("writing output")?;
    Ok(())
}
