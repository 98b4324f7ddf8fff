//! Link-dependency edges derived from resolved properties.

use crate::graph::{DependencyTag, ModuleGraph};
use crate::module::TargetType;
use crate::properties::{BagKind, PropertyBag, find_bag};

use super::ResolveError;

const LIBRARY_FIELDS: [&str; 3] = ["static_libs", "whole_static_libs", "shared_libs"];

/// Add build edges for every library a module links against, and host-tool
/// edges for generator `host_bin` programs.
///
/// Libraries named in a host or target sub-bundle only bind to that clone.
///
/// # Errors
///
/// Returns [`ResolveError::Graph`] when a named library or tool is not
/// declared.
pub fn link_dependencies(graph: &mut ModuleGraph) -> Result<(), ResolveError> {
    for index in graph.indices() {
        let Some(module) = graph.module(index) else {
            continue;
        };
        if module.is_defaults() {
            continue;
        }
        let shared = libraries(module.bag(BagKind::Linkable));
        let per_variant: Vec<(TargetType, Vec<String>)> = module
            .target_specific()
            .map(|pair| {
                TargetType::ALL
                    .into_iter()
                    .map(|variant| {
                        let bags = &pair.get(variant).bags;
                        (variant, libraries(find_bag(bags, BagKind::Linkable)))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let host_bin = module
            .bag(BagKind::Generate)
            .and_then(|bag| bag.string("host_bin"))
            .map(str::to_owned);

        for name in shared {
            graph.add_dependency(index, &name, DependencyTag::Build)?;
        }
        for (variant, names) in per_variant {
            for name in names {
                graph.add_variant_dependency(index, &name, DependencyTag::Build, variant)?;
            }
        }
        if let Some(tool) = host_bin {
            graph.add_dependency(index, &tool, DependencyTag::HostTool)?;
        }
    }
    Ok(())
}

fn libraries(linkable: Option<&PropertyBag>) -> Vec<String> {
    let Some(bag) = linkable else {
        return Vec::new();
    };
    LIBRARY_FIELDS
        .iter()
        .flat_map(|field| bag.list(field).iter().cloned())
        .collect()
}
