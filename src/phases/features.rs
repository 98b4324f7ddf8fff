//! Feature flattening.

use std::mem;

use crate::config::ConfigStore;
use crate::graph::ModuleGraph;
use crate::module::{Module, TargetType};
use crate::properties::MergeError;

use super::{ResolveError, StepErrors};

/// Merge every enabled feature bundle into its owner, then drop the bundles.
///
/// The core feature set is applied to the core bags first, then each
/// host/target feature set to its own sub-bundle. Defaults bundles are
/// flattened too, so inheritance later sees their final values.
///
/// # Errors
///
/// Returns [`ResolveError::Properties`] listing unknown features, feature
/// bags without a destination and shape conflicts for every module.
pub fn flatten_features(graph: &mut ModuleGraph, config: &ConfigStore) -> Result<(), ResolveError> {
    let mut errors = StepErrors::new("feature flattening");
    for index in graph.indices() {
        let Some(module) = graph.module_mut(index) else {
            continue;
        };
        if !module.is_featurable() {
            continue;
        }
        let failures = flatten_module(module, config);
        errors.record_all(module.name(), failures)?;
    }
    errors.finish()
}

fn flatten_module(module: &mut Module, config: &ConfigStore) -> Vec<MergeError> {
    let mut failures = Vec::new();
    let core = mem::take(module.features_mut());
    if let Err(err) = core.append_enabled(module.bags_mut(), config) {
        failures.push(err);
    }
    if let Some(pair) = module.target_specific_mut() {
        for variant in TargetType::ALL {
            let slot = pair.get_mut(variant);
            let features = mem::take(&mut slot.features);
            if let Err(err) = features.append_enabled(&mut slot.bags, config) {
                failures.push(err.scoped(variant.as_str()));
            }
        }
    }
    failures
}
