//! YAML build descriptions.
//!
//! A description lists modules under a top-level `modules` key. Each entry
//! names its `type` and `name`, optional `defaults`, `flag_defaults` and
//! `deps` references, and any number of properties inline. Feature bundles
//! live under `features`, and per-variant properties under `host` and
//! `target`:
//!
//! ```yaml
//! modules:
//!   - type: static_library
//!     name: libfoo
//!     defaults: [common_flags]
//!     srcs: [foo.c]
//!     features:
//!       debug:
//!         cflags: [-g]
//!     target:
//!       cflags: [-DTARGET]
//! ```
//!
//! The YAML is parsed into a [`serde_json::Value`] first and then decoded
//! into typed declarations, so data errors point at the failing key.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

use crate::properties::{BagKind, Features, PropertyBag, PropertyError, RawValue};

use super::{Module, ModuleKind, TargetSpecific, TargetType};

/// Errors raised while loading a build description.
#[derive(Debug, Error, Diagnostic)]
pub enum DeclarationError {
    /// The description file could not be read.
    #[error("failed to read build description {path}")]
    #[diagnostic(code(modresolve::decl::read))]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The description is not valid YAML.
    #[error("failed to parse build description {name}: {message}")]
    #[diagnostic(code(modresolve::decl::parse))]
    Parse {
        /// Display name of the description.
        name: String,
        /// Parser message, including the location when known.
        message: String,
    },

    /// The YAML is valid but does not describe modules.
    #[error("invalid build description {name}")]
    #[diagnostic(
        code(modresolve::decl::data),
        help("each module needs a `type` and a `name`")
    )]
    Data {
        /// Display name of the description.
        name: String,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// One or more declared properties do not fit their module.
    #[error("build description {name} declares {} invalid propert{}", errors.len(), if errors.len() == 1 { "y" } else { "ies" })]
    #[diagnostic(code(modresolve::decl::properties))]
    Properties {
        /// Display name of the description.
        name: String,
        /// Every property failure, in declaration order.
        #[related]
        errors: Vec<PropertyError>,
    },
}

/// Top-level build description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildDescription {
    /// Declared modules, in declaration order.
    #[serde(default)]
    pub modules: Vec<ModuleDecl>,
}

/// A single module declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDecl {
    /// Module type.
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    /// Unique module name.
    pub name: String,
    /// Defaults bundles to inherit from.
    #[serde(default)]
    pub defaults: Vec<String>,
    /// Flag-only defaults bundles to inherit from.
    #[serde(default)]
    pub flag_defaults: Vec<String>,
    /// Ordinary build dependencies.
    #[serde(default)]
    pub deps: Vec<String>,
    /// Feature bundles keyed by configuration name.
    #[serde(default)]
    pub features: IndexMap<String, IndexMap<String, RawValue>>,
    /// Host-only properties.
    #[serde(default)]
    pub host: Option<TargetDecl>,
    /// Target-only properties.
    #[serde(default)]
    pub target: Option<TargetDecl>,
    /// Core properties.
    #[serde(flatten)]
    pub properties: IndexMap<String, RawValue>,
}

/// Properties declared under `host` or `target`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetDecl {
    /// Feature bundles that apply to this variant only.
    #[serde(default)]
    pub features: IndexMap<String, IndexMap<String, RawValue>>,
    /// Variant properties.
    #[serde(flatten)]
    pub properties: IndexMap<String, RawValue>,
}

impl BuildDescription {
    /// Load a description from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::Read`] when the file cannot be read and
    /// [`DeclarationError::Parse`] or [`DeclarationError::Data`] when it does
    /// not describe modules.
    pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<Self, DeclarationError> {
        let path_ref = path.as_ref();
        let data = fs::read_to_string(path_ref).map_err(|source| DeclarationError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        Self::from_str_named(&data, path_ref.as_str())
    }

    /// Parse a description from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::Parse`] or [`DeclarationError::Data`] when
    /// `yaml` does not describe modules.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DeclarationError> {
        Self::from_str_named(yaml, "<string>")
    }

    fn from_str_named(yaml: &str, name: &str) -> Result<Self, DeclarationError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let doc: serde_json::Value =
            serde_saphyr::from_str(yaml).map_err(|err| DeclarationError::Parse {
                name: name.to_owned(),
                message: err.to_string(),
            })?;
        if doc.is_null() {
            return Ok(Self::default());
        }
        let description: Self =
            serde_json::from_value(doc).map_err(|source| DeclarationError::Data {
                name: name.to_owned(),
                source,
            })?;
        tracing::debug!(
            source = name,
            modules = description.modules.len(),
            "parsed build description"
        );
        Ok(description)
    }

    /// Convert every declaration into a [`Module`].
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::Properties`] listing every property that
    /// does not fit the schema of its module.
    pub fn into_modules(self) -> Result<Vec<Module>, DeclarationError> {
        let mut modules = Vec::with_capacity(self.modules.len());
        let mut errors = Vec::new();
        for decl in self.modules {
            match decl.into_module() {
                Ok(module) => modules.push(module),
                Err(mut failures) => errors.append(&mut failures),
            }
        }
        if errors.is_empty() {
            Ok(modules)
        } else {
            Err(DeclarationError::Properties {
                name: "build description".to_owned(),
                errors,
            })
        }
    }
}

impl ModuleDecl {
    /// Convert the declaration into a [`Module`].
    ///
    /// # Errors
    ///
    /// Returns every property that is unknown to the module's bags or has the
    /// wrong shape.
    pub fn into_module(self) -> Result<Module, Vec<PropertyError>> {
        let Self {
            kind,
            name,
            defaults,
            flag_defaults,
            deps,
            features,
            host,
            target,
            properties,
        } = self;
        let mut module = Module::new(name, kind)
            .with_defaults(defaults)
            .with_flag_defaults(flag_defaults)
            .with_deps(deps);
        let mut sink = ErrorSink::new(module.name());

        fill_bags(module.bags_mut(), properties, "", &mut sink);
        let kinds: Vec<_> = module.bags().iter().map(PropertyBag::kind).collect();
        *module.features_mut() = build_features(&kinds, features, "features", &mut sink);

        for (variant, slot) in [(TargetType::Host, host), (TargetType::Target, target)] {
            let Some(decl) = slot else { continue };
            match module.target_specific_mut() {
                Some(pair) => fill_target(pair.get_mut(variant), decl, variant, &mut sink),
                None => sink.push(
                    variant.as_str(),
                    format!("`{kind}` modules have no {variant}-specific properties"),
                ),
            }
        }

        sink.finish(module)
    }
}

struct ErrorSink {
    module: String,
    errors: Vec<PropertyError>,
}

impl ErrorSink {
    fn new(module: &str) -> Self {
        Self {
            module: module.to_owned(),
            errors: Vec::new(),
        }
    }

    fn push(&mut self, property: impl Into<String>, message: impl Into<String>) {
        self.errors
            .push(PropertyError::new(&self.module, property, message));
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<PropertyError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn scoped(scope: &str, field: &str) -> String {
    if scope.is_empty() {
        field.to_owned()
    } else {
        format!("{scope}.{field}")
    }
}

fn fill_bags(
    bags: &mut [PropertyBag],
    properties: IndexMap<String, RawValue>,
    scope: &str,
    sink: &mut ErrorSink,
) {
    for (field, value) in properties {
        let Some(bag) = bags
            .iter_mut()
            .find(|bag| bag.kind().shape_of(&field).is_some())
        else {
            sink.push(scoped(scope, &field), "unknown property");
            continue;
        };
        if let Err(err) = bag.set_raw(&field, value) {
            sink.push(scoped(scope, &field), err.to_string());
        }
    }
}

/// Build sparse feature bags drawn from `kinds`; only kinds that receive a
/// field are kept.
fn build_features(
    kinds: &[BagKind],
    features: IndexMap<String, IndexMap<String, RawValue>>,
    scope: &str,
    sink: &mut ErrorSink,
) -> Features {
    let mut out = Features::new();
    for (feature, properties) in features {
        let mut bags: Vec<_> = kinds.iter().copied().map(PropertyBag::new).collect();
        fill_bags(&mut bags, properties, &format!("{scope}.{feature}"), sink);
        bags.retain(|bag| !bag.is_empty());
        out.insert(feature, bags);
    }
    out
}

fn fill_target(
    slot: &mut TargetSpecific,
    decl: TargetDecl,
    variant: TargetType,
    sink: &mut ErrorSink,
) {
    let scope = variant.as_str();
    fill_bags(&mut slot.bags, decl.properties, scope, sink);
    let kinds: Vec<_> = slot.bags.iter().map(PropertyBag::kind).collect();
    slot.features = build_features(&kinds, decl.features, &format!("{scope}.features"), sink);
}
