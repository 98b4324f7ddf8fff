//! Defaults inheritance.

use crate::graph::{ModuleGraph, ModuleIndex};
use crate::module::{Module, TargetSpecific, TargetType};
use crate::properties::{MergeError, MergePolicy, find_bag};

use super::{ResolveError, StepErrors};

/// Merge every defaults bundle reachable through defaults references into
/// each consuming module, with prepend semantics.
///
/// Bundles are visited depth-first in preorder, each at most once per
/// consumer. Host and target sub-bundles merge into their counterparts.
///
/// # Errors
///
/// Returns [`ResolveError::Properties`] for missing bag kinds and shape
/// conflicts, or [`ResolveError::Internal`] when the merge engine sees bags of
/// different kinds.
pub fn apply_defaults(graph: &mut ModuleGraph) -> Result<(), ResolveError> {
    let mut errors = StepErrors::new("defaults inheritance");
    for index in consumers(graph) {
        for bundle in graph.defaults_order(index) {
            let Some((module, defaults)) = graph.pair_mut(index, bundle) else {
                continue;
            };
            tracing::debug!(
                module = module.name(),
                defaults = defaults.name(),
                "inheriting defaults"
            );
            let failures = inherit(module, defaults);
            errors.record_all(module.name(), failures)?;
        }
    }
    errors.finish()
}

/// Active, non-defaults modules with at least one defaultable bag.
pub(super) fn consumers(graph: &ModuleGraph) -> Vec<ModuleIndex> {
    graph
        .active()
        .filter(|(_, module)| !module.is_defaults() && !module.defaultable_kinds().is_empty())
        .map(|(index, _)| index)
        .collect()
}

fn inherit(module: &mut Module, defaults: &Module) -> Vec<MergeError> {
    let mut failures = Vec::new();
    for kind in module.defaultable_kinds() {
        let Some(src) = defaults.bag(kind) else {
            failures.push(MergeError::field(
                kind.as_str(),
                format!(
                    "defaults `{}` has no `{kind}` property bag to inherit",
                    defaults.name()
                ),
            ));
            continue;
        };
        if let Some(dst) = module.bag_mut(kind)
            && let Err(err) = dst.extend(src, MergePolicy::Prepend)
        {
            failures.push(err);
        }
    }

    let Some(pair) = module.target_specific_mut() else {
        return failures;
    };
    let Some(source_pair) = defaults.target_specific() else {
        failures.push(MergeError::field(
            "target_specific",
            format!("defaults `{}` has no host/target properties", defaults.name()),
        ));
        return failures;
    };
    for variant in TargetType::ALL {
        inherit_target(
            pair.get_mut(variant),
            source_pair.get(variant),
            variant,
            defaults.name(),
            &mut failures,
        );
    }
    failures
}

fn inherit_target(
    dst: &mut TargetSpecific,
    src: &TargetSpecific,
    variant: TargetType,
    defaults: &str,
    failures: &mut Vec<MergeError>,
) {
    for bag in &mut dst.bags {
        let kind = bag.kind();
        let Some(source) = find_bag(&src.bags, kind) else {
            failures.push(MergeError::field(
                format!("{variant}.{kind}"),
                format!("defaults `{defaults}` has no {variant} `{kind}` property bag to inherit"),
            ));
            continue;
        };
        if let Err(err) = bag.extend(source, MergePolicy::Prepend) {
            failures.push(err.scoped(variant.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleKind;
    use crate::properties::{BagKind, PropertyBag, PropertyValue};
    use rstest::rstest;

    fn cflags(module: Module, flags: &[&str]) -> Module {
        module
            .with_property("cflags", PropertyValue::list(flags.iter().copied()))
            .expect("cflags")
    }

    fn resolved_cflags(graph: &ModuleGraph, name: &str) -> Vec<String> {
        let index = graph.lookup(name, None).expect("module");
        graph
            .module(index)
            .and_then(|module| module.bag(BagKind::Common))
            .map(|bag| bag.list("cflags").to_vec())
            .unwrap_or_default()
    }

    #[rstest]
    fn diamond_bundles_are_merged_once() {
        let mut graph = ModuleGraph::from_modules([
            cflags(Module::new("root", ModuleKind::Defaults), &["-root"]),
            cflags(
                Module::new("left", ModuleKind::Defaults).with_defaults(["root"]),
                &["-left"],
            ),
            cflags(
                Module::new("right", ModuleKind::Defaults).with_defaults(["root"]),
                &["-right"],
            ),
            cflags(
                Module::new("lib", ModuleKind::StaticLibrary).with_defaults(["left", "right"]),
                &["-own"],
            ),
        ])
        .expect("graph");
        apply_defaults(&mut graph).expect("defaults");

        let flags = resolved_cflags(&graph, "lib");
        assert_eq!(flags.iter().filter(|flag| *flag == "-root").count(), 1);
        assert_eq!(flags.last().map(String::as_str), Some("-own"));
        // Defaults bundles themselves are left untouched.
        assert_eq!(resolved_cflags(&graph, "left"), ["-left"]);
    }

    #[rstest]
    fn explicit_false_survives_inheritance() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("base", ModuleKind::Defaults)
                .with_property("enabled", PropertyValue::bool(true))
                .expect("enabled"),
            Module::new("lib", ModuleKind::StaticLibrary)
                .with_defaults(["base"])
                .with_property("enabled", PropertyValue::bool(false))
                .expect("enabled"),
        ])
        .expect("graph");
        apply_defaults(&mut graph).expect("defaults");
        let lib = graph.lookup("lib", None).expect("lib");
        let enabled = graph
            .module(lib)
            .and_then(|module| module.bag(BagKind::Common))
            .and_then(|bag| bag.flag("enabled"));
        assert_eq!(enabled, Some(false));
    }

    #[rstest]
    fn missing_bag_kinds_name_the_bundle() {
        let flags_only = Module::with_bags(
            "flags",
            ModuleKind::Defaults,
            vec![
                PropertyBag::new(BagKind::Common),
                PropertyBag::new(BagKind::Install),
                PropertyBag::new(BagKind::Splittable),
            ],
        );
        let mut graph = ModuleGraph::from_modules([
            flags_only,
            Module::new("lib", ModuleKind::StaticLibrary).with_flag_defaults(["flags"]),
        ])
        .expect("graph");
        let err = apply_defaults(&mut graph).expect_err("mismatch");
        let ResolveError::Properties { errors, .. } = err else {
            panic!("expected property errors, got {err:?}");
        };
        let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
        assert!(
            messages
                .iter()
                .any(|m| m.contains("`flags`") && m.contains("`linkable`")),
            "unexpected errors: {messages:?}"
        );
    }

    #[rstest]
    fn target_specific_properties_merge_per_variant() {
        let mut base = Module::new("base", ModuleKind::Defaults);
        let mut lib = Module::new("lib", ModuleKind::StaticLibrary).with_defaults(["base"]);
        for (module, flag) in [(&mut base, "-base"), (&mut lib, "-lib")] {
            if let Some(pair) = module.target_specific_mut() {
                let mut bag = PropertyBag::new(BagKind::Common);
                bag.set("cflags", PropertyValue::list([flag])).expect("cflags");
                if let Some(slot) = pair.host.bags.iter_mut().find(|b| b.kind() == BagKind::Common) {
                    *slot = bag;
                }
            }
        }
        let mut graph = ModuleGraph::from_modules([base, lib]).expect("graph");
        apply_defaults(&mut graph).expect("defaults");

        let index = graph.lookup("lib", None).expect("lib");
        let host_flags = graph
            .module(index)
            .and_then(Module::target_specific)
            .and_then(|pair| find_bag(&pair.host.bags, BagKind::Common))
            .map(|bag| bag.list("cflags").to_vec());
        assert_eq!(host_flags, Some(vec!["-base".to_owned(), "-lib".to_owned()]));
    }
}
