//! Module resolution core.
//!
//! This library turns declarative build-module descriptions into a resolved,
//! per-variant module graph. Properties are inherited from defaults bundles,
//! enabled feature bundles are flattened, templated strings are expanded
//! against the build configuration, and every module is split into the host
//! and target variants it supports. A toolchain registry supplies the GNU,
//! Clang or armclang tools for each variant.
//!
//! The usual flow is [`context::BuildContext`] → [`module::BuildDescription`]
//! → [`graph::ModuleGraph`] → [`phases::Pipeline::run`] → [`action::emit`].

pub mod action;
pub mod cli;
pub mod config;
pub mod context;
pub mod graph;
pub mod module;
pub mod phases;
pub mod properties;
pub mod runner;
pub mod toolchain;
