//! Variant-support propagation and host/target splitting.

use crate::graph::ModuleGraph;
use crate::properties::{BagKind, MergePolicy};

use super::{ResolveError, StepErrors};

/// Merge the `splittable` bag of every reachable defaults bundle into each
/// splittable module, with prepend semantics.
///
/// In the full pipeline defaults inheritance has already merged this bag.
/// The bag only holds flags and prepending never overwrites a set flag, so
/// running again leaves it unchanged.
///
/// # Errors
///
/// Returns [`ResolveError::Properties`] for shape conflicts.
pub fn propagate_support(graph: &mut ModuleGraph) -> Result<(), ResolveError> {
    let mut errors = StepErrors::new("variant support propagation");
    let splittable: Vec<_> = graph
        .active()
        .filter(|(_, module)| !module.is_defaults() && module.is_splittable())
        .map(|(index, _)| index)
        .collect();
    for index in splittable {
        for bundle in graph.defaults_order(index) {
            let Some((module, defaults)) = graph.pair_mut(index, bundle) else {
                continue;
            };
            let Some(src) = defaults.bag(BagKind::Splittable) else {
                continue;
            };
            let Some(dst) = module.bag_mut(BagKind::Splittable) else {
                continue;
            };
            if let Err(err) = dst.extend(src, MergePolicy::Prepend) {
                let name = module.name().to_owned();
                errors.record(&name, err)?;
            }
        }
    }
    errors.finish()
}

/// Clone every splittable module once per supported variant and re-target
/// edges to the matching provider variants.
///
/// Modules supporting no variant are disabled.
///
/// # Errors
///
/// Returns [`ResolveError::Graph`] when an edge needs a provider variant that
/// does not exist.
pub fn split_variants(graph: &mut ModuleGraph) -> Result<(), ResolveError> {
    for index in graph.indices() {
        let Some(module) = graph.module(index) else {
            continue;
        };
        if !module.is_splittable() {
            continue;
        }
        let variants = module.supported_variants();
        if variants.is_empty() {
            tracing::debug!(module = module.name(), "module supports no variant; disabling");
        }
        graph.create_variations(index, &variants);
    }
    graph.retarget_edges()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphError;
    use crate::module::{Module, ModuleKind, TargetType};
    use crate::phases::apply_defaults;
    use crate::properties::PropertyValue;
    use rstest::rstest;

    fn variants_of(graph: &ModuleGraph, name: &str) -> Vec<TargetType> {
        graph
            .active()
            .filter(|(_, module)| module.name() == name)
            .filter_map(|(_, module)| module.variant())
            .collect()
    }

    #[rstest]
    fn support_flows_through_defaults_chains() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("host_capable", ModuleKind::Defaults)
                .with_property("host_supported", PropertyValue::bool(true))
                .expect("host"),
            Module::new("middle", ModuleKind::Defaults).with_defaults(["host_capable"]),
            Module::new("tool", ModuleKind::Binary).with_defaults(["middle"]),
            Module::new("lib", ModuleKind::StaticLibrary),
        ])
        .expect("graph");
        propagate_support(&mut graph).expect("propagate");
        split_variants(&mut graph).expect("split");

        assert_eq!(variants_of(&graph, "tool"), TargetType::ALL.to_vec());
        assert_eq!(variants_of(&graph, "lib"), vec![TargetType::Target]);
        assert_eq!(variants_of(&graph, "middle"), TargetType::ALL.to_vec());
    }

    fn host_only_bundle() -> Module {
        Module::new("host_only", ModuleKind::Defaults)
            .with_property("host_supported", PropertyValue::bool(true))
            .expect("host")
            .with_property("target_supported", PropertyValue::bool(false))
            .expect("target")
    }

    #[rstest]
    fn modules_without_flags_take_support_from_defaults() {
        let mut graph = ModuleGraph::from_modules([
            host_only_bundle(),
            Module::new("builder", ModuleKind::Binary).with_defaults(["host_only"]),
        ])
        .expect("graph");
        propagate_support(&mut graph).expect("propagate");
        split_variants(&mut graph).expect("split");
        assert_eq!(variants_of(&graph, "builder"), vec![TargetType::Host]);
    }

    #[rstest]
    fn propagation_after_defaults_changes_nothing() {
        let mut graph = ModuleGraph::from_modules([
            host_only_bundle(),
            Module::new("builder", ModuleKind::Binary)
                .with_defaults(["host_only"])
                .with_property("target_supported", PropertyValue::bool(true))
                .expect("target"),
        ])
        .expect("graph");
        apply_defaults(&mut graph).expect("defaults");
        let before = graph.clone();
        propagate_support(&mut graph).expect("propagate");

        let builder = graph.lookup("builder", None).expect("builder");
        let splittable = |snapshot: &ModuleGraph| {
            snapshot
                .module(builder)
                .and_then(|module| module.bag(BagKind::Splittable))
                .cloned()
        };
        assert_eq!(splittable(&graph), splittable(&before));
        split_variants(&mut graph).expect("split");
        assert_eq!(variants_of(&graph, "builder"), TargetType::ALL.to_vec());
    }

    #[rstest]
    fn modules_supporting_nothing_are_disabled() {
        let nowhere = Module::new("nowhere", ModuleKind::StaticLibrary)
            .with_property("host_supported", PropertyValue::bool(false))
            .expect("host")
            .with_property("target_supported", PropertyValue::bool(false))
            .expect("target");
        let mut graph = ModuleGraph::from_modules([nowhere]).expect("graph");
        propagate_support(&mut graph).expect("propagate");
        split_variants(&mut graph).expect("split");
        assert!(variants_of(&graph, "nowhere").is_empty());
        assert_eq!(
            graph.lookup("nowhere", None),
            Err(GraphError::ModuleDisabled {
                name: "nowhere".into()
            })
        );
    }

    #[rstest]
    fn unsupported_modules_are_disabled() {
        let mut graph = ModuleGraph::from_modules([Module::new("off", ModuleKind::Binary)
            .with_property("target_supported", PropertyValue::bool(false))
            .expect("target")])
        .expect("graph");
        split_variants(&mut graph).expect("split");
        assert_eq!(graph.active().count(), 0);
        assert_eq!(
            graph.lookup("off", None),
            Err(GraphError::ModuleDisabled { name: "off".into() })
        );
    }

    #[rstest]
    fn dependencies_on_missing_variants_fail() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("lib", ModuleKind::StaticLibrary),
            Module::new("tool", ModuleKind::Binary)
                .with_deps(["lib"])
                .with_property("host_supported", PropertyValue::bool(true))
                .expect("host"),
        ])
        .expect("graph");
        let err = split_variants(&mut graph).expect_err("missing host lib");
        assert_eq!(
            err.to_string(),
            "module `tool` (host) depends on `lib`, which has no host variant"
        );
    }
}
