//! End-to-end resolution of YAML module declarations.

use anyhow::{Context, Result, ensure};
use modresolve::action::{JsonSummarySink, ModuleSummary, emit};
use modresolve::config::ConfigStore;
use modresolve::context::BuildContext;
use modresolve::graph::{GraphError, ModuleGraph};
use modresolve::module::{BuildDescription, DeclarationError, ModuleKind, TargetType};
use modresolve::phases::{Pipeline, ResolveError};
use modresolve::properties::BagKind;
use modresolve::toolchain::ToolchainFamily;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn context() -> BuildContext {
    let config = ConfigStore::from_path("tests/data/armclang.json").expect("configuration");
    BuildContext::from_config(config).expect("context")
}

fn resolve(context: &BuildContext, path: &str) -> Result<ModuleGraph> {
    let modules = BuildDescription::from_path(path)
        .and_then(BuildDescription::into_modules)
        .with_context(|| format!("load {path}"))?;
    let mut graph = ModuleGraph::from_modules(modules)?;
    Pipeline::new(context).run(&mut graph)?;
    Ok(graph)
}

fn summaries(context: &BuildContext, graph: &ModuleGraph) -> Result<Vec<ModuleSummary>> {
    let mut sink = JsonSummarySink::new();
    emit(graph, context, &mut sink)?;
    Ok(sink.into_modules())
}

fn cflags(graph: &ModuleGraph, name: &str, variant: TargetType) -> Vec<String> {
    graph
        .lookup(name, Some(variant))
        .ok()
        .and_then(|index| graph.module(index))
        .and_then(|module| module.bag(BagKind::Common))
        .map(|bag| bag.list("cflags").to_vec())
        .unwrap_or_default()
}

#[rstest]
fn defaults_features_and_variants_combine(context: BuildContext) -> Result<()> {
    let graph = resolve(&context, "tests/data/modules.yml")?;
    ensure!(
        cflags(&graph, "libutil", TargetType::Host)
            == ["-Wall", "-Werror", "-fPIC", "-O2", "-g", "-DHOST"],
        "host cflags: {:?}",
        cflags(&graph, "libutil", TargetType::Host)
    );
    ensure!(
        cflags(&graph, "libutil", TargetType::Target)
            == ["-Wall", "-Werror", "-fPIC", "-O2", "-g", "-DTARGET"],
        "target cflags: {:?}",
        cflags(&graph, "libutil", TargetType::Target)
    );
    Ok(())
}

#[rstest]
fn explicit_booleans_survive_defaults(context: BuildContext) -> Result<()> {
    let graph = resolve(&context, "tests/data/modules.yml")?;
    for name in ["app", "libutil"] {
        let module = graph
            .lookup(name, Some(TargetType::Target))
            .ok()
            .and_then(|index| graph.module(index))
            .context("module")?;
        let flag = module
            .bag(BagKind::Common)
            .and_then(|bag| bag.flag("build_by_default"));
        ensure!(flag == Some(true), "{name}: build_by_default = {flag:?}");
    }
    Ok(())
}

#[rstest]
fn templates_expand_against_the_configuration(context: BuildContext) -> Result<()> {
    let graph = resolve(&context, "tests/data/modules.yml")?;
    let index = graph.lookup("libutil", Some(TargetType::Target))?;
    let dirs = graph
        .module(index)
        .and_then(|module| module.bag(BagKind::Linkable))
        .map(|bag| bag.list("export_include_dirs").to_vec())
        .unwrap_or_default();
    ensure!(dirs == ["out/gen"], "export_include_dirs: {dirs:?}");
    Ok(())
}

#[rstest]
fn variants_follow_support_flags(context: BuildContext) -> Result<()> {
    let graph = resolve(&context, "tests/data/modules.yml")?;
    let variants = |name: &str| -> Vec<TargetType> {
        graph
            .active()
            .filter(|(_, module)| module.name() == name)
            .filter_map(|(_, module)| module.variant())
            .collect()
    };
    ensure!(variants("libutil") == [TargetType::Host, TargetType::Target]);
    ensure!(variants("app") == [TargetType::Target]);
    ensure!(variants("hosttool") == [TargetType::Host]);
    ensure!(matches!(
        graph.lookup("hosttool", Some(TargetType::Target)),
        Err(GraphError::MissingVariant { .. })
    ));
    Ok(())
}

#[rstest]
fn summaries_skip_defaults_and_disabled_modules(context: BuildContext) -> Result<()> {
    let graph = resolve(&context, "tests/data/modules.yml")?;
    let modules = summaries(&context, &graph)?;
    let mut names: Vec<_> = modules
        .iter()
        .map(|module| (module.name.as_str(), module.variant))
        .collect();
    names.sort();
    ensure!(
        names
            == [
                ("app", Some(TargetType::Target)),
                ("hosttool", Some(TargetType::Host)),
                ("libutil", Some(TargetType::Host)),
                ("libutil", Some(TargetType::Target)),
            ],
        "modules: {names:?}"
    );
    ensure!(modules.iter().all(|module| module.kind != ModuleKind::Defaults));
    ensure!(
        modules
            .iter()
            .all(|module| module.toolchain == Some(ToolchainFamily::ArmClang))
    );

    let hosttool = modules
        .iter()
        .find(|module| module.name == "hosttool")
        .context("hosttool")?;
    let deps = serde_json::to_value(&hosttool.dependencies)?;
    ensure!(
        deps == json!([{ "tag": "build", "name": "libutil", "variant": "host" }]),
        "dependencies: {deps}"
    );
    Ok(())
}

#[rstest]
fn host_only_module_cannot_link_target_only_library(context: BuildContext) -> Result<()> {
    let err = resolve(&context, "tests/data/missing_variant.yml").expect_err("missing variant");
    let resolve_err = err.downcast_ref::<ResolveError>().context("resolve error")?;
    ensure!(
        matches!(
            resolve_err,
            ResolveError::Graph(GraphError::MissingVariant { variant: TargetType::Host, .. })
        ),
        "unexpected error: {resolve_err}"
    );
    Ok(())
}

#[rstest]
fn declaration_type_mismatches_are_all_reported() -> Result<()> {
    let err = BuildDescription::from_path("tests/data/mismatch.yml")
        .and_then(BuildDescription::into_modules)
        .expect_err("mismatch");
    let DeclarationError::Properties { errors, .. } = err else {
        anyhow::bail!("unexpected error: {err}");
    };
    let mut properties: Vec<_> = errors.iter().map(|e| e.property.as_str()).collect();
    properties.sort_unstable();
    ensure!(properties == ["enabled", "srcs"], "properties: {properties:?}");
    ensure!(errors.iter().all(|e| e.module == "app"));
    Ok(())
}

#[rstest]
fn support_flags_are_inherited_and_unsupported_modules_vanish(
    context: BuildContext,
) -> Result<()> {
    let graph = resolve(&context, "tests/data/support.yml")?;
    let builder: Vec<_> = graph
        .active()
        .filter(|(_, module)| module.name() == "builder")
        .filter_map(|(_, module)| module.variant())
        .collect();
    ensure!(builder == [TargetType::Host], "builder variants: {builder:?}");
    ensure!(
        graph.lookup("nowhere", None)
            == Err(GraphError::ModuleDisabled {
                name: "nowhere".to_owned()
            })
    );

    let names: Vec<_> = summaries(&context, &graph)?
        .into_iter()
        .map(|module| (module.name, module.variant))
        .collect();
    ensure!(
        names == [("builder".to_owned(), Some(TargetType::Host))],
        "modules: {names:?}"
    );
    Ok(())
}
