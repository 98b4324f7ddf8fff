//! Prepend and append merging between bags of the same kind.

use std::mem;

use thiserror::Error;

use super::{BagKind, PropertyBag, PropertyValue};

/// Ordering and override policy for [`PropertyBag::extend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Source lists go first; source scalars fill unset destination values.
    Prepend,
    /// Source lists go last; set source scalars override the destination.
    Append,
}

/// Failure while merging or setting properties.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A problem attributable to a single property.
    #[error("{property}: {message}")]
    Field {
        /// Property path, relative to the bag being merged.
        property: String,
        /// Human-readable reason.
        message: String,
    },

    /// The merge engine was asked to combine bags of different kinds.
    #[error("cannot merge a `{src}` property bag into a `{dst}` property bag")]
    KindMismatch {
        /// Destination kind.
        dst: BagKind,
        /// Source kind.
        src: BagKind,
    },
}

impl MergeError {
    pub(crate) fn field(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Property path for field-scoped errors.
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::Field { property, .. } => Some(property),
            Self::KindMismatch { .. } => None,
        }
    }

    /// Prefix the property path with `scope` (for example a feature name).
    #[must_use]
    pub fn scoped(self, scope: &str) -> Self {
        match self {
            Self::Field { property, message } => Self::Field {
                property: format!("{scope}.{property}"),
                message,
            },
            other @ Self::KindMismatch { .. } => other,
        }
    }
}

impl PropertyBag {
    /// Merge `src` into `self` under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::KindMismatch`] when the bags have different
    /// kinds and [`MergeError::Field`] when a field holds different shapes on
    /// each side.
    pub fn extend(&mut self, src: &Self, policy: MergePolicy) -> Result<(), MergeError> {
        if self.kind != src.kind {
            return Err(MergeError::KindMismatch {
                dst: self.kind,
                src: src.kind,
            });
        }
        for (name, value) in &src.fields {
            match self.fields.get_mut(name) {
                Some(dst) => merge_value(name, dst, value, policy)?,
                None => {
                    self.fields.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}

fn merge_value(
    name: &str,
    current: &mut PropertyValue,
    incoming: &PropertyValue,
    policy: MergePolicy,
) -> Result<(), MergeError> {
    match (current, incoming) {
        (PropertyValue::List(dst), PropertyValue::List(src)) => match policy {
            MergePolicy::Prepend => {
                let own = mem::take(dst);
                dst.reserve(src.len() + own.len());
                dst.extend(src.iter().cloned());
                dst.extend(own);
            }
            MergePolicy::Append => dst.extend(src.iter().cloned()),
        },
        (PropertyValue::Bool(dst), PropertyValue::Bool(src)) => merge_scalar(dst, *src, policy),
        (PropertyValue::Str(dst), PropertyValue::Str(src)) => {
            merge_scalar(dst, src.clone(), policy);
        }
        (dst, src) => {
            return Err(MergeError::field(
                name,
                format!(
                    "cannot merge a {} value into a {} value",
                    src.shape(),
                    dst.shape()
                ),
            ));
        }
    }
    Ok(())
}

fn merge_scalar<T>(dst: &mut Option<T>, src: Option<T>, policy: MergePolicy) {
    match policy {
        MergePolicy::Prepend => {
            if dst.is_none() {
                *dst = src;
            }
        }
        MergePolicy::Append => {
            if src.is_some() {
                *dst = src;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn common(cflags: &[&str], enabled: Option<bool>) -> PropertyBag {
        let mut bag = PropertyBag::new(BagKind::Common);
        bag.set("cflags", PropertyValue::list(cflags.iter().copied()))
            .expect("cflags");
        if let Some(value) = enabled {
            bag.set("enabled", PropertyValue::bool(value)).expect("enabled");
        }
        bag
    }

    #[rstest]
    fn prepend_places_source_lists_first() {
        let mut module = common(&["a", "b"], None);
        module
            .extend(&common(&["c", "d"], None), MergePolicy::Prepend)
            .expect("merge");
        assert_eq!(module.list("cflags"), ["c", "d", "a", "b"]);
    }

    #[rstest]
    fn append_places_source_lists_last() {
        let mut module = common(&["x"], None);
        module
            .extend(&common(&["y"], None), MergePolicy::Append)
            .expect("merge");
        assert_eq!(module.list("cflags"), ["x", "y"]);
    }

    #[rstest]
    #[case::explicit_false_survives(Some(false), Some(true), Some(false))]
    #[case::unset_takes_default(None, Some(true), Some(true))]
    #[case::unset_source_is_ignored(Some(true), None, Some(true))]
    fn prepend_fills_only_unset_booleans(
        #[case] own: Option<bool>,
        #[case] defaults: Option<bool>,
        #[case] expected: Option<bool>,
    ) {
        let mut module = common(&[], own);
        module
            .extend(&common(&[], defaults), MergePolicy::Prepend)
            .expect("merge");
        assert_eq!(module.flag("enabled"), expected);
    }

    #[rstest]
    #[case::feature_overrides_true(Some(true), Some(false), Some(false))]
    #[case::feature_sets_unset(None, Some(true), Some(true))]
    #[case::unset_feature_keeps_value(Some(true), None, Some(true))]
    fn append_overrides_booleans(
        #[case] own: Option<bool>,
        #[case] feature: Option<bool>,
        #[case] expected: Option<bool>,
    ) {
        let mut module = common(&[], own);
        module
            .extend(&common(&[], feature), MergePolicy::Append)
            .expect("merge");
        assert_eq!(module.flag("enabled"), expected);
    }

    #[rstest]
    fn strings_follow_scalar_rules() {
        let mut own = PropertyBag::new(BagKind::Install);
        own.set("install_group", PropertyValue::str("lib"))
            .expect("group");
        let mut other = PropertyBag::new(BagKind::Install);
        other
            .set("install_group", PropertyValue::str("bin"))
            .expect("group");

        let mut prepended = own.clone();
        prepended
            .extend(&other, MergePolicy::Prepend)
            .expect("prepend");
        assert_eq!(prepended.string("install_group"), Some("lib"));

        own.extend(&other, MergePolicy::Append).expect("append");
        assert_eq!(own.string("install_group"), Some("bin"));
    }

    #[rstest]
    fn kind_mismatch_is_not_field_scoped() {
        let mut module = PropertyBag::new(BagKind::Common);
        let err = module
            .extend(&PropertyBag::new(BagKind::Install), MergePolicy::Append)
            .expect_err("mismatch");
        assert_eq!(err.property(), None);
    }

    #[rstest]
    fn scoped_errors_prefix_the_property_path() {
        let err = MergeError::field("cflags", "bad").scoped("features.debug");
        assert_eq!(err.property(), Some("features.debug.cflags"));
    }
}
