//! Hand-off from the resolved graph to action generation.
//!
//! [`emit`] walks the active modules of a resolved graph and passes each one,
//! with the toolchain for its variant, to an [`ActionSink`]. Defaults bundles
//! and modules whose `enabled` property resolved to `false` produce nothing.
//! [`JsonSummarySink`] is a sink that records a serialisable summary instead
//! of generating build actions.

use serde::Serialize;

use crate::context::BuildContext;
use crate::graph::{DependencyTag, ModuleGraph, ModuleIndex};
use crate::module::{Module, ModuleKind, TargetType};
use crate::properties::BagKind;
use crate::toolchain::{Toolchain, ToolchainFamily};

/// Build-time dependency of a [`ResolvedModule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    /// Edge meaning.
    pub tag: DependencyTag,
    /// Provider name.
    pub name: String,
    /// Provider variant, if it was split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<TargetType>,
}

/// A module ready for action generation.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedModule<'a> {
    /// Graph node of the module.
    pub index: ModuleIndex,
    /// Fully resolved properties.
    pub module: &'a Module,
    /// Variant the module is built for.
    pub variant: Option<TargetType>,
    /// Toolchain for [`Self::variant`].
    pub toolchain: Option<&'a dyn Toolchain>,
    graph: &'a ModuleGraph,
}

impl ResolvedModule<'_> {
    /// Non-defaults dependencies, in edge order.
    #[must_use]
    pub fn dependencies(&self) -> Vec<ResolvedDependency> {
        self.graph
            .dependencies(self.index)
            .filter(|(tag, _)| !tag.is_defaults())
            .filter_map(|(tag, provider)| {
                let module = self.graph.module(provider)?;
                Some(ResolvedDependency {
                    tag,
                    name: module.name().to_owned(),
                    variant: module.variant(),
                })
            })
            .collect()
    }
}

/// Consumer of resolved modules.
pub trait ActionSink {
    /// Failure type of the sink.
    type Error;

    /// Handle one resolved module.
    ///
    /// # Errors
    ///
    /// Sink-specific; the first error stops [`emit`].
    fn accept(&mut self, resolved: ResolvedModule<'_>) -> Result<(), Self::Error>;
}

/// Whether `module` should produce build actions.
fn is_buildable(module: &Module) -> bool {
    if module.kind() == ModuleKind::Defaults {
        return false;
    }
    module
        .bag(BagKind::Common)
        .and_then(|bag| bag.flag("enabled"))
        .unwrap_or(true)
}

/// Feed every buildable active module of `graph` to `sink`.
///
/// Returns the number of modules handed over.
///
/// # Errors
///
/// Returns the first error reported by `sink`.
pub fn emit<S: ActionSink>(
    graph: &ModuleGraph,
    context: &BuildContext,
    sink: &mut S,
) -> Result<usize, S::Error> {
    let mut count = 0;
    for (index, module) in graph.active() {
        if !is_buildable(module) {
            tracing::debug!(module = module.name(), "no actions for module");
            continue;
        }
        let variant = module.variant();
        sink.accept(ResolvedModule {
            index,
            module,
            variant,
            toolchain: variant.map(|axis| context.toolchains().get(axis)),
            graph,
        })?;
        count += 1;
    }
    tracing::info!(modules = count, "handed modules to action generation");
    Ok(count)
}

/// Serialisable record of one resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    /// Module name.
    pub name: String,
    /// Module kind.
    pub kind: ModuleKind,
    /// Variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<TargetType>,
    /// Toolchain family used for the variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainFamily>,
    /// Non-empty property bags.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Build-time dependencies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ResolvedDependency>,
}

/// Sink that collects [`ModuleSummary`] records.
#[derive(Debug, Default)]
pub struct JsonSummarySink {
    modules: Vec<ModuleSummary>,
}

impl JsonSummarySink {
    /// An empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Collected summaries, in graph order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleSummary] {
        &self.modules
    }

    /// Consume the sink.
    #[must_use]
    pub fn into_modules(self) -> Vec<ModuleSummary> {
        self.modules
    }
}

impl ActionSink for JsonSummarySink {
    type Error = serde_json::Error;

    fn accept(&mut self, resolved: ResolvedModule<'_>) -> Result<(), Self::Error> {
        let module = resolved.module;
        let mut properties = serde_json::Map::new();
        for bag in module.bags().iter().filter(|bag| !bag.is_empty()) {
            let fields = bag
                .iter()
                .map(|(field, value)| {
                    serde_json::to_value(value).map(|json| (field.to_owned(), json))
                })
                .collect::<Result<serde_json::Map<_, _>, _>>()?;
            properties.insert(
                bag.kind().as_str().to_owned(),
                serde_json::Value::Object(fields),
            );
        }
        self.modules.push(ModuleSummary {
            name: module.name().to_owned(),
            kind: module.kind(),
            variant: resolved.variant,
            toolchain: resolved.toolchain.map(|toolchain| toolchain.family()),
            properties,
            dependencies: resolved.dependencies(),
        });
        Ok(())
    }
}
