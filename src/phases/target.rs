//! Target-specific property application.

use crate::graph::ModuleGraph;

use super::{ResolveError, StepErrors};

/// Append each split module's host or target sub-bundle onto its core bags
/// and discard both sub-bundles.
///
/// # Errors
///
/// Returns [`ResolveError::Properties`] for shape conflicts.
pub fn apply_target_specific(graph: &mut ModuleGraph) -> Result<(), ResolveError> {
    let mut errors = StepErrors::new("target-specific properties");
    for index in graph.indices() {
        let Some(module) = graph.module_mut(index) else {
            continue;
        };
        if let Err(err) = module.apply_target_specific() {
            let name = module.name().to_owned();
            errors.record(&name, err)?;
        }
    }
    errors.finish()
}
