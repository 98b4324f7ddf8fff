//! Property bags and their merge policies.
//!
//! Every module stores its declared properties in a small, closed set of
//! tagged bags ([`BagKind`]). Each kind has a fixed schema mapping field
//! names to value shapes. Bags are sparse: only fields that were declared
//! (or merged in) are stored, so an absent list reads as empty and an absent
//! boolean reads as unset.
//!
//! Two merge policies exist:
//!
//! - [`MergePolicy::Prepend`] is used when inheriting from defaults bundles.
//!   Source lists are placed before the destination's entries and scalars are
//!   copied only when the destination is unset.
//! - [`MergePolicy::Append`] is used when flattening features. Source lists
//!   are placed after the destination's entries and scalars set in the source
//!   always override the destination.
//!
//! ```
//! use modresolve::properties::{BagKind, MergePolicy, PropertyBag, PropertyValue};
//!
//! let mut module = PropertyBag::new(BagKind::Common);
//! module.set("cflags", PropertyValue::list(["-a", "-b"]))?;
//! let mut defaults = PropertyBag::new(BagKind::Common);
//! defaults.set("cflags", PropertyValue::list(["-c", "-d"]))?;
//!
//! module.extend(&defaults, MergePolicy::Prepend)?;
//! assert_eq!(module.list("cflags"), ["-c", "-d", "-a", "-b"]);
//! # Ok::<(), modresolve::properties::MergeError>(())
//! ```

mod error;
mod features;
mod merge;

pub use error::PropertyError;
pub use features::Features;
pub use merge::{MergeError, MergePolicy};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Ordered list of strings.
    List,
    /// Tri-state boolean.
    Bool,
    /// Optional string.
    Str,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "list",
            Self::Bool => "bool",
            Self::Str => "string",
        })
    }
}

/// A single property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Ordered list of strings.
    List(Vec<String>),
    /// Boolean; `None` means unset.
    Bool(Option<bool>),
    /// String; `None` means unset.
    Str(Option<String>),
}

impl PropertyValue {
    /// Build a list value from anything yielding string-likes.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a set boolean value.
    #[must_use]
    pub const fn bool(value: bool) -> Self {
        Self::Bool(Some(value))
    }

    /// Build a set string value.
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(Some(value.into()))
    }

    /// Shape of this value.
    #[must_use]
    pub const fn shape(&self) -> ValueShape {
        match self {
            Self::List(_) => ValueShape::List,
            Self::Bool(_) => ValueShape::Bool,
            Self::Str(_) => ValueShape::Str,
        }
    }
}

/// Declaration-level value before it has been checked against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A YAML/JSON boolean.
    Bool(bool),
    /// A YAML/JSON string.
    Str(String),
    /// A YAML/JSON sequence of strings.
    List(Vec<String>),
    /// Anything else: null, numbers, mappings and sequences holding
    /// non-strings. Never valid for a property; kept so the error can name
    /// the field.
    Other(serde_json::Value),
}

impl RawValue {
    const fn describe(&self) -> &'static str {
        match self {
            Self::Bool(_) | Self::Other(serde_json::Value::Bool(_)) => "a bool",
            Self::Str(_) | Self::Other(serde_json::Value::String(_)) => "a string",
            Self::List(_) => "a list",
            Self::Other(serde_json::Value::Null) => "nothing",
            Self::Other(serde_json::Value::Number(_)) => "a number",
            Self::Other(serde_json::Value::Array(_)) => "a list with non-string entries",
            Self::Other(serde_json::Value::Object(_)) => "a mapping",
        }
    }

    /// Convert into a [`PropertyValue`] of the requested shape. A single
    /// string is accepted where a list is expected.
    fn into_shape(self, shape: ValueShape) -> Option<PropertyValue> {
        match (self, shape) {
            (Self::List(items), ValueShape::List) => Some(PropertyValue::List(items)),
            (Self::Str(item), ValueShape::List) => Some(PropertyValue::List(vec![item])),
            (Self::Bool(value), ValueShape::Bool) => Some(PropertyValue::bool(value)),
            (Self::Str(value), ValueShape::Str) => Some(PropertyValue::str(value)),
            _ => None,
        }
    }
}

/// Closed set of property bag kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BagKind {
    /// Sources and compiler flags shared by every buildable module.
    Common,
    /// Link-time inputs and exported include paths.
    Linkable,
    /// Installation placement.
    Install,
    /// Host/target variant support flags.
    Splittable,
    /// Source generation command and outputs.
    Generate,
}

use ValueShape::{Bool, List, Str};

const COMMON_FIELDS: &[(&str, ValueShape)] = &[
    ("srcs", List),
    ("exclude_srcs", List),
    ("cflags", List),
    ("conlyflags", List),
    ("cxxflags", List),
    ("asflags", List),
    ("ldflags", List),
    ("include_dirs", List),
    ("local_include_dirs", List),
    ("export_cflags", List),
    ("enabled", Bool),
    ("build_by_default", Bool),
];

const LINKABLE_FIELDS: &[(&str, ValueShape)] = &[
    ("static_libs", List),
    ("whole_static_libs", List),
    ("shared_libs", List),
    ("ldlibs", List),
    ("export_include_dirs", List),
    ("export_local_include_dirs", List),
    ("forwarding_shlib", Bool),
];

const INSTALL_FIELDS: &[(&str, ValueShape)] = &[
    ("install_group", Str),
    ("relative_install_path", Str),
    ("post_install_cmd", Str),
];

const SPLITTABLE_FIELDS: &[(&str, ValueShape)] =
    &[("host_supported", Bool), ("target_supported", Bool)];

const GENERATE_FIELDS: &[(&str, ValueShape)] = &[
    ("cmd", Str),
    ("tool", Str),
    ("host_bin", Str),
    ("out", List),
    ("export_gen_include_dirs", List),
    ("depfile", Bool),
];

impl BagKind {
    /// Every bag kind, in schema order.
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Linkable,
        Self::Install,
        Self::Splittable,
        Self::Generate,
    ];

    /// Field schema for this kind.
    #[must_use]
    pub const fn fields(self) -> &'static [(&'static str, ValueShape)] {
        match self {
            Self::Common => COMMON_FIELDS,
            Self::Linkable => LINKABLE_FIELDS,
            Self::Install => INSTALL_FIELDS,
            Self::Splittable => SPLITTABLE_FIELDS,
            Self::Generate => GENERATE_FIELDS,
        }
    }

    /// Shape of `field`, if the kind declares it.
    #[must_use]
    pub fn shape_of(self, field: &str) -> Option<ValueShape> {
        self.fields()
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, shape)| *shape)
    }

    /// Whether defaults bundles can supply this kind.
    #[must_use]
    pub const fn is_defaultable(self) -> bool {
        !matches!(self, Self::Generate)
    }

    /// Whether host/target sub-bundles carry this kind.
    #[must_use]
    pub const fn is_target_specific(self) -> bool {
        matches!(self, Self::Common | Self::Linkable | Self::Install)
    }

    /// Lower-case name used in property paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Linkable => "linkable",
            Self::Install => "install",
            Self::Splittable => "splittable",
            Self::Generate => "generate",
        }
    }
}

impl fmt::Display for BagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sparse bag of properties of one [`BagKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyBag {
    kind: BagKind,
    fields: IndexMap<String, PropertyValue>,
}

impl PropertyBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new(kind: BagKind) -> Self {
        Self {
            kind,
            fields: IndexMap::new(),
        }
    }

    /// Kind tag of this bag.
    #[must_use]
    pub const fn kind(&self) -> BagKind {
        self.kind
    }

    /// Whether no field has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Set `field`, checking it against the kind's schema.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Field`] when the field is not part of the schema
    /// or the value has the wrong shape.
    pub fn set(&mut self, field: &str, value: PropertyValue) -> Result<(), MergeError> {
        let expected = self.schema_shape(field)?;
        if expected != value.shape() {
            return Err(MergeError::field(
                field,
                format!("expected a {expected}, found a {}", value.shape()),
            ));
        }
        self.fields.insert(field.to_owned(), value);
        Ok(())
    }

    /// Set `field` from an unchecked declaration value.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Field`] when the field is unknown or the value
    /// cannot take the field's shape.
    pub fn set_raw(&mut self, field: &str, value: RawValue) -> Result<(), MergeError> {
        let expected = self.schema_shape(field)?;
        let found = value.describe();
        let converted = value.into_shape(expected).ok_or_else(|| {
            MergeError::field(field, format!("expected a {expected}, found {found}"))
        })?;
        self.fields.insert(field.to_owned(), converted);
        Ok(())
    }

    fn schema_shape(&self, field: &str) -> Result<ValueShape, MergeError> {
        self.kind.shape_of(field).ok_or_else(|| {
            MergeError::field(
                field,
                format!("unknown property for a `{}` property bag", self.kind),
            )
        })
    }

    /// Raw value stored for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&PropertyValue> {
        self.fields.get(field)
    }

    /// List value of `field`; empty when unset or not a list.
    #[must_use]
    pub fn list(&self, field: &str) -> &[String] {
        match self.fields.get(field) {
            Some(PropertyValue::List(items)) => items,
            _ => &[],
        }
    }

    /// Boolean value of `field`; `None` when unset.
    #[must_use]
    pub fn flag(&self, field: &str) -> Option<bool> {
        match self.fields.get(field) {
            Some(PropertyValue::Bool(value)) => *value,
            _ => None,
        }
    }

    /// String value of `field`; `None` when unset.
    #[must_use]
    pub fn string(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(PropertyValue::Str(value)) => value.as_deref(),
            _ => None,
        }
    }

    /// Iterate over the set fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Mutable access to every set field, used by in-place rewrites such as
    /// template expansion.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PropertyValue)> {
        self.fields
            .iter_mut()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Find the bag of `kind` in `bags`.
#[must_use]
pub fn find_bag(bags: &[PropertyBag], kind: BagKind) -> Option<&PropertyBag> {
    bags.iter().find(|bag| bag.kind() == kind)
}

/// Find the bag of `kind` in `bags`, mutably.
pub fn find_bag_mut(bags: &mut [PropertyBag], kind: BagKind) -> Option<&mut PropertyBag> {
    bags.iter_mut().find(|bag| bag.kind() == kind)
}
