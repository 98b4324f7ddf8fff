//! Whole-graph resolution pipeline.
//!
//! [`Pipeline::run`] applies the resolution steps in a fixed order. Each step
//! visits every active module before the next one starts:
//!
//! 1. validate defaults references
//! 2. flatten enabled feature bundles ([`flatten_features`])
//! 3. expand templated strings ([`expand_templates`])
//! 4. inherit defaults ([`apply_defaults`])
//! 5. derive link-dependency edges ([`link_dependencies`])
//! 6. propagate variant support and split ([`propagate_support`],
//!    [`split_variants`])
//! 7. apply host/target properties ([`apply_target_specific`])
//! 8. run post-split hooks
//!
//! Field-scoped problems are collected for the whole step and reported
//! together as [`ResolveError::Properties`]; anything else aborts at once.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

mod defaults;
mod deps;
mod features;
mod splitter;
mod target;
mod template;

pub use defaults::apply_defaults;
pub use deps::link_dependencies;
pub use features::flatten_features;
pub use splitter::{propagate_support, split_variants};
pub use target::apply_target_specific;
pub use template::expand_templates;

use miette::Diagnostic;
use thiserror::Error;

use crate::context::BuildContext;
use crate::graph::{GraphError, ModuleGraph};
use crate::module::Module;
use crate::properties::{MergeError, PropertyError};

/// Failure of a pipeline step.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    /// The graph is malformed or a variant is missing.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    /// One or more modules have invalid properties.
    #[error("{step}: {} module propert{} could not be resolved", errors.len(), if errors.len() == 1 { "y" } else { "ies" })]
    #[diagnostic(code(modresolve::resolve::properties))]
    Properties {
        /// Step that reported the errors.
        step: &'static str,
        /// Every failure reported by the step.
        #[related]
        errors: Vec<PropertyError>,
    },

    /// The merge engine was misused; this is a bug, not a user error.
    #[error("{step}: internal error while resolving module `{module}`")]
    #[diagnostic(code(modresolve::resolve::internal))]
    Internal {
        /// Step that failed.
        step: &'static str,
        /// Module being resolved.
        module: String,
        /// Underlying merge failure.
        #[source]
        source: MergeError,
    },
}

/// Collects field-scoped errors for one step.
pub(crate) struct StepErrors {
    step: &'static str,
    errors: Vec<PropertyError>,
}

impl StepErrors {
    pub(crate) const fn new(step: &'static str) -> Self {
        Self {
            step,
            errors: Vec::new(),
        }
    }

    /// Record `err` against `module`.
    ///
    /// Field errors are kept for the end of the step; kind mismatches abort.
    pub(crate) fn record(&mut self, module: &str, err: MergeError) -> Result<(), ResolveError> {
        match err {
            MergeError::Field { property, message } => {
                self.errors
                    .push(PropertyError::new(module, property, message));
                Ok(())
            }
            other @ MergeError::KindMismatch { .. } => Err(ResolveError::Internal {
                step: self.step,
                module: module.to_owned(),
                source: other,
            }),
        }
    }

    /// Record every error in `errors`.
    pub(crate) fn record_all(
        &mut self,
        module: &str,
        errors: impl IntoIterator<Item = MergeError>,
    ) -> Result<(), ResolveError> {
        for err in errors {
            self.record(module, err)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<(), ResolveError> {
        if self.errors.is_empty() {
            tracing::debug!(step = self.step, "step complete");
            Ok(())
        } else {
            Err(ResolveError::Properties {
                step: self.step,
                errors: self.errors,
            })
        }
    }
}

/// Host-registered mutation run on every active module after splitting.
pub trait PostSplitHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Adjust `module`, which already carries its variant tag.
    ///
    /// # Errors
    ///
    /// Field-scoped errors are collected with the other hooks' errors; a
    /// [`MergeError::KindMismatch`] aborts the run.
    fn apply(&self, module: &mut Module, context: &BuildContext) -> Result<(), MergeError>;
}

/// Ordered resolution pipeline bound to a build context.
pub struct Pipeline<'a> {
    context: &'a BuildContext,
    hooks: Vec<Box<dyn PostSplitHook + 'a>>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline with no hooks.
    #[must_use]
    pub fn new(context: &'a BuildContext) -> Self {
        Self {
            context,
            hooks: Vec::new(),
        }
    }

    /// Register a post-split hook. Hooks run in registration order.
    #[must_use]
    pub fn with_hook(mut self, hook: impl PostSplitHook + 'a) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Run every step over `graph`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's [`ResolveError`].
    pub fn run(&self, graph: &mut ModuleGraph) -> Result<(), ResolveError> {
        let config = self.context.config();
        tracing::info!(modules = graph.len(), "resolving module graph");
        graph.validate()?;
        flatten_features(graph, config)?;
        expand_templates(graph, config)?;
        apply_defaults(graph)?;
        link_dependencies(graph)?;
        propagate_support(graph)?;
        split_variants(graph)?;
        apply_target_specific(graph)?;
        self.run_hooks(graph)?;
        tracing::info!(active = graph.active().count(), "module graph resolved");
        Ok(())
    }

    fn run_hooks(&self, graph: &mut ModuleGraph) -> Result<(), ResolveError> {
        let mut errors = StepErrors::new("post-split hooks");
        for hook in &self.hooks {
            tracing::debug!(hook = hook.name(), "running post-split hook");
            for index in graph.indices() {
                let Some(module) = graph.module_mut(index) else {
                    continue;
                };
                if let Err(err) = hook.apply(module, self.context) {
                    let name = module.name().to_owned();
                    errors.record(&name, err)?;
                }
            }
        }
        errors.finish()
    }
}
