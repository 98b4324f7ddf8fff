//! Declared build modules.
//!
//! A [`Module`] has a fixed [`ModuleKind`], a unique name, its core property
//! bags, optional feature bundles, and, for kinds whose build differs per
//! variant, a pair of host/target sub-bundles. The variant tag is unset until
//! the splitter assigns one.

mod decl;

pub use decl::{BuildDescription, DeclarationError, ModuleDecl, TargetDecl};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::properties::{
    BagKind, Features, MergeError, PropertyBag, PropertyValue, find_bag, find_bag_mut,
};

/// The declared type of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Property bundle inherited by other modules; never built.
    Defaults,
    /// Static library.
    StaticLibrary,
    /// Shared library.
    SharedLibrary,
    /// Executable.
    Binary,
    /// Source generation rule.
    GenerateSource,
}

impl ModuleKind {
    /// Bag kinds every module of this kind carries.
    #[must_use]
    pub const fn bag_kinds(self) -> &'static [BagKind] {
        match self {
            Self::Defaults | Self::StaticLibrary | Self::SharedLibrary | Self::Binary => &[
                BagKind::Common,
                BagKind::Linkable,
                BagKind::Install,
                BagKind::Splittable,
            ],
            Self::GenerateSource => &[
                BagKind::Common,
                BagKind::Generate,
                BagKind::Install,
                BagKind::Splittable,
            ],
        }
    }

    /// Whether modules of this kind carry host/target sub-bundles.
    #[must_use]
    pub const fn has_target_specific(self) -> bool {
        !matches!(self, Self::GenerateSource)
    }

    /// Name used in declarations.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defaults => "defaults",
            Self::StaticLibrary => "static_library",
            Self::SharedLibrary => "shared_library",
            Self::Binary => "binary",
            Self::GenerateSource => "generate_source",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build target variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Built to run on the build machine.
    Host,
    /// Cross-compiled for the target device.
    Target,
}

impl TargetType {
    /// Both variants, in clone order.
    pub const ALL: [Self; 2] = [Self::Host, Self::Target];

    /// Lower-case name of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Properties applied only to one variant of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSpecific {
    /// Variant-specific bags.
    pub bags: Vec<PropertyBag>,
    /// Features gating further variant-specific bags.
    pub features: Features,
}

impl TargetSpecific {
    /// Empty sub-bundle carrying the target-specific subset of `kinds`.
    #[must_use]
    pub fn for_kinds(kinds: &[BagKind]) -> Self {
        Self {
            bags: kinds
                .iter()
                .copied()
                .filter(|kind| kind.is_target_specific())
                .map(PropertyBag::new)
                .collect(),
            features: Features::new(),
        }
    }
}

/// Host and target sub-bundles of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSpecificPair {
    /// Applied to the host variant.
    pub host: TargetSpecific,
    /// Applied to the target variant.
    pub target: TargetSpecific,
}

impl TargetSpecificPair {
    /// Sub-bundle for `variant`.
    #[must_use]
    pub const fn get(&self, variant: TargetType) -> &TargetSpecific {
        match variant {
            TargetType::Host => &self.host,
            TargetType::Target => &self.target,
        }
    }

    /// Mutable sub-bundle for `variant`.
    pub const fn get_mut(&mut self, variant: TargetType) -> &mut TargetSpecific {
        match variant {
            TargetType::Host => &mut self.host,
            TargetType::Target => &mut self.target,
        }
    }
}

/// A declared build module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    name: String,
    kind: ModuleKind,
    bags: Vec<PropertyBag>,
    #[serde(skip_serializing_if = "Features::is_empty")]
    features: Features,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_specific: Option<TargetSpecificPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant: Option<TargetType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    defaults: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    flag_defaults: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deps: Vec<String>,
}

impl Module {
    /// Create a module with the standard bag set for `kind`.
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        let bags = kind.bag_kinds().iter().copied().map(PropertyBag::new).collect();
        Self::with_bags(name, kind, bags)
    }

    /// Create a module with an explicit bag set, for integrations that
    /// register custom module shapes.
    pub fn with_bags(name: impl Into<String>, kind: ModuleKind, bags: Vec<PropertyBag>) -> Self {
        let target_specific = kind.has_target_specific().then(|| {
            let kinds: Vec<_> = bags.iter().map(PropertyBag::kind).collect();
            TargetSpecificPair {
                host: TargetSpecific::for_kinds(&kinds),
                target: TargetSpecific::for_kinds(&kinds),
            }
        });
        Self {
            name: name.into(),
            kind,
            bags,
            features: Features::new(),
            target_specific,
            variant: None,
            defaults: Vec::new(),
            flag_defaults: Vec::new(),
            deps: Vec::new(),
        }
    }

    /// Builder: declare defaults references.
    #[must_use]
    pub fn with_defaults<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builder: declare flag-defaults references.
    #[must_use]
    pub fn with_flag_defaults<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flag_defaults.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builder: declare ordinary build dependencies.
    #[must_use]
    pub fn with_deps<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builder: set a core property, locating the owning bag by schema.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped [`MergeError`] when no bag of this module
    /// declares `field` or the value has the wrong shape.
    pub fn with_property(mut self, field: &str, value: PropertyValue) -> Result<Self, MergeError> {
        set_in(&mut self.bags, field, value)?;
        Ok(self)
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module kind.
    #[must_use]
    pub const fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Whether the module is a defaults bundle.
    #[must_use]
    pub const fn is_defaults(&self) -> bool {
        matches!(self.kind, ModuleKind::Defaults)
    }

    /// Variant assigned by the splitter.
    #[must_use]
    pub const fn variant(&self) -> Option<TargetType> {
        self.variant
    }

    pub(crate) const fn set_variant(&mut self, variant: TargetType) {
        self.variant = Some(variant);
    }

    /// Core property bags.
    #[must_use]
    pub fn bags(&self) -> &[PropertyBag] {
        &self.bags
    }

    /// Mutable core property bags.
    pub fn bags_mut(&mut self) -> &mut [PropertyBag] {
        &mut self.bags
    }

    /// Core bag of `kind`.
    #[must_use]
    pub fn bag(&self, kind: BagKind) -> Option<&PropertyBag> {
        find_bag(&self.bags, kind)
    }

    /// Mutable core bag of `kind`.
    pub fn bag_mut(&mut self, kind: BagKind) -> Option<&mut PropertyBag> {
        find_bag_mut(&mut self.bags, kind)
    }

    /// Kinds of the core bags that defaults bundles may supply.
    #[must_use]
    pub fn defaultable_kinds(&self) -> Vec<BagKind> {
        self.bags
            .iter()
            .map(PropertyBag::kind)
            .filter(|kind| kind.is_defaultable())
            .collect()
    }

    /// Core feature bundles.
    #[must_use]
    pub const fn features(&self) -> &Features {
        &self.features
    }

    /// Mutable core feature bundles.
    pub const fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    /// Whether the module supports feature bundles.
    #[must_use]
    pub fn is_featurable(&self) -> bool {
        !self.bags.is_empty()
    }

    /// Host/target sub-bundles, when the kind has them.
    #[must_use]
    pub const fn target_specific(&self) -> Option<&TargetSpecificPair> {
        self.target_specific.as_ref()
    }

    /// Mutable host/target sub-bundles.
    pub const fn target_specific_mut(&mut self) -> Option<&mut TargetSpecificPair> {
        self.target_specific.as_mut()
    }

    /// Apply the sub-bundle for the module's variant onto its core bags and
    /// drop both sub-bundles.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped [`MergeError`] when a sub-bundle bag has no core
    /// counterpart or shapes conflict.
    pub(crate) fn apply_target_specific(&mut self) -> Result<(), MergeError> {
        let Some(variant) = self.variant else {
            return Ok(());
        };
        let Some(pair) = self.target_specific.take() else {
            return Ok(());
        };
        let scope = variant.as_str();
        for bag in &pair.get(variant).bags {
            let core = find_bag_mut(&mut self.bags, bag.kind()).ok_or_else(|| {
                MergeError::field(scope, format!("no core `{}` property bag", bag.kind()))
            })?;
            core.extend(bag, crate::properties::MergePolicy::Append)
                .map_err(|err| err.scoped(scope))?;
        }
        Ok(())
    }

    /// Whether the module takes part in variant splitting.
    #[must_use]
    pub fn is_splittable(&self) -> bool {
        self.bag(BagKind::Splittable).is_some()
    }

    /// Variants this module supports.
    ///
    /// Defaults bundles always support both. Otherwise an unset
    /// `host_supported` reads as `false` and an unset `target_supported`
    /// reads as `true`.
    #[must_use]
    pub fn supported_variants(&self) -> Vec<TargetType> {
        if self.is_defaults() {
            return TargetType::ALL.to_vec();
        }
        let Some(splittable) = self.bag(BagKind::Splittable) else {
            return Vec::new();
        };
        let mut variants = Vec::with_capacity(2);
        if splittable.flag("host_supported").unwrap_or(false) {
            variants.push(TargetType::Host);
        }
        if splittable.flag("target_supported").unwrap_or(true) {
            variants.push(TargetType::Target);
        }
        variants
    }

    /// Declared defaults references.
    #[must_use]
    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// Declared flag-defaults references.
    #[must_use]
    pub fn flag_defaults(&self) -> &[String] {
        &self.flag_defaults
    }

    /// Declared ordinary dependencies.
    #[must_use]
    pub fn deps(&self) -> &[String] {
        &self.deps
    }
}

/// Set `field` on whichever bag in `bags` declares it.
pub(crate) fn set_in(
    bags: &mut [PropertyBag],
    field: &str,
    value: PropertyValue,
) -> Result<(), MergeError> {
    let bag = bags
        .iter_mut()
        .find(|bag| bag.kind().shape_of(field).is_some())
        .ok_or_else(|| MergeError::field(field, "unknown property"))?;
    bag.set(field, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn with_support(host: Option<bool>, target: Option<bool>) -> Module {
        let mut module = Module::new("lib", ModuleKind::StaticLibrary);
        if let Some(value) = host {
            module = module
                .with_property("host_supported", PropertyValue::bool(value))
                .expect("host");
        }
        if let Some(value) = target {
            module = module
                .with_property("target_supported", PropertyValue::bool(value))
                .expect("target");
        }
        module
    }

    #[rstest]
    #[case(None, None, vec![TargetType::Target])]
    #[case(Some(true), None, vec![TargetType::Host, TargetType::Target])]
    #[case(Some(true), Some(false), vec![TargetType::Host])]
    #[case(Some(false), Some(false), vec![])]
    fn supported_variants_use_tri_state_defaults(
        #[case] host: Option<bool>,
        #[case] target: Option<bool>,
        #[case] expected: Vec<TargetType>,
    ) {
        assert_eq!(with_support(host, target).supported_variants(), expected);
    }

    #[rstest]
    fn defaults_support_every_variant() {
        let defaults = Module::new("d", ModuleKind::Defaults)
            .with_property("host_supported", PropertyValue::bool(false))
            .expect("host")
            .with_property("target_supported", PropertyValue::bool(false))
            .expect("target");
        assert_eq!(defaults.supported_variants(), TargetType::ALL.to_vec());
    }

    #[rstest]
    fn generators_have_no_target_specific_bundles() {
        let module = Module::new("gen", ModuleKind::GenerateSource);
        assert!(module.target_specific().is_none());
        assert!(!module.defaultable_kinds().contains(&BagKind::Generate));
    }

    #[rstest]
    fn target_specific_bags_are_appended_for_the_variant() {
        let mut module = Module::new("lib", ModuleKind::StaticLibrary)
            .with_property("cflags", PropertyValue::list(["-O2"]))
            .expect("cflags");
        if let Some(pair) = module.target_specific_mut() {
            set_in(&mut pair.host.bags, "cflags", PropertyValue::list(["-DHOST"]))
                .expect("host cflags");
            set_in(&mut pair.target.bags, "cflags", PropertyValue::list(["-DTARGET"]))
                .expect("target cflags");
        }
        module.set_variant(TargetType::Target);
        module.apply_target_specific().expect("apply");

        let cflags = module.bag(BagKind::Common).map(|bag| bag.list("cflags").to_vec());
        assert_eq!(cflags, Some(vec!["-O2".to_owned(), "-DTARGET".to_owned()]));
        assert!(module.target_specific().is_none());
    }
}
