//! Module-attributed property diagnostics.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use thiserror::Error;

/// A user-facing error attributed to one property of one module.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("module `{module}`: property `{property}`: {message}")]
#[diagnostic(code(modresolve::property))]
pub struct PropertyError {
    /// Module the error is reported against.
    pub module: String,
    /// Dotted property path within the module.
    pub property: String,
    /// Reason for the failure.
    pub message: String,
}

impl PropertyError {
    /// Build an error for `module`.
    pub fn new(
        module: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            property: property.into(),
            message: message.into(),
        }
    }
}
