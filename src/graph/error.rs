//! Errors raised while building or querying the module graph.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use thiserror::Error;

use crate::module::{ModuleKind, TargetType};

/// Graph construction and lookup failures. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GraphError {
    /// Two declarations share a name.
    #[error("module `{name}` is declared more than once")]
    #[diagnostic(code(modresolve::graph::duplicate))]
    DuplicateModule {
        /// Repeated name.
        name: String,
    },

    /// A module references a name nobody declares.
    #[error("module `{module}` depends on undeclared module `{dependency}`")]
    #[diagnostic(code(modresolve::graph::unknown_dependency))]
    UnknownDependency {
        /// Dependent module.
        module: String,
        /// Missing provider.
        dependency: String,
    },

    /// A lookup named a module that does not exist.
    #[error("no module named `{name}`")]
    #[diagnostic(code(modresolve::graph::not_found))]
    NotFound {
        /// Requested name.
        name: String,
    },

    /// A defaults reference points at something other than a defaults bundle.
    #[error("module `{module}` lists `{dependency}` as defaults, but it is a `{kind}` module")]
    #[diagnostic(
        code(modresolve::graph::not_defaults),
        help("only modules of type `defaults` can be inherited from")
    )]
    NotDefaults {
        /// Dependent module.
        module: String,
        /// Referenced module.
        dependency: String,
        /// Actual kind of the referenced module.
        kind: ModuleKind,
    },

    /// Defaults bundles inherit from each other in a loop.
    #[error("defaults cycle detected: {}", cycle.join(" -> "))]
    #[diagnostic(code(modresolve::graph::defaults_cycle))]
    DefaultsCycle {
        /// Bundles on the cycle, starting and ending with the same name.
        cycle: Vec<String>,
    },

    /// A lookup named a module that was disabled by the splitter.
    #[error("module `{name}` is disabled: it supports no build variant")]
    #[diagnostic(code(modresolve::graph::disabled))]
    ModuleDisabled {
        /// Requested name.
        name: String,
    },

    /// An edge needs a provider variant that does not exist.
    #[error("module `{module}` ({variant}) depends on `{dependency}`, which has no {variant} variant")]
    #[diagnostic(
        code(modresolve::graph::missing_variant),
        help("set `host_supported` or `target_supported` on the dependency")
    )]
    MissingVariant {
        /// Dependent module.
        module: String,
        /// Provider lacking the variant.
        dependency: String,
        /// Variant required by the edge.
        variant: TargetType,
    },
}
