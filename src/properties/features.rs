//! Feature-gated property bundles.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{ConfigError, ConfigStore};

use super::{MergeError, MergePolicy, PropertyBag, find_bag_mut};

/// Ordered map from feature name to the bags it contributes when enabled.
///
/// A feature is enabled when the configuration boolean of the same name is
/// `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Features {
    bundles: IndexMap<String, Vec<PropertyBag>>,
}

impl Features {
    /// Create an empty feature set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bags contributed by `feature`.
    pub fn insert(&mut self, feature: impl Into<String>, bags: Vec<PropertyBag>) {
        self.bundles.insert(feature.into(), bags);
    }

    /// Whether no feature bundle is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Iterate over declared features in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PropertyBag])> {
        self.bundles
            .iter()
            .map(|(name, bags)| (name.as_str(), bags.as_slice()))
    }

    /// Mutable access to every bundle's bags.
    pub fn bags_mut(&mut self) -> impl Iterator<Item = &mut PropertyBag> {
        self.bundles.values_mut().flatten()
    }

    /// Names of the features enabled by `config`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped [`MergeError`] naming the first feature that is
    /// unknown to the configuration or not a boolean there.
    pub fn enabled<'a>(&'a self, config: &ConfigStore) -> Result<Vec<&'a str>, MergeError> {
        let mut enabled = Vec::new();
        for name in self.bundles.keys() {
            let on = config.get_bool(name).map_err(|err| match err {
                ConfigError::MissingKey { .. } => MergeError::field(
                    format!("features.{name}"),
                    "unknown feature; no configuration value of that name",
                ),
                other => MergeError::field(format!("features.{name}"), other.to_string()),
            })?;
            if on {
                enabled.push(name.as_str());
            }
        }
        Ok(enabled)
    }

    /// Append every enabled feature's bags onto `dst`.
    ///
    /// Lists land after existing entries and set scalars override, so the
    /// more specific feature values win.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped [`MergeError`] when a feature is unknown, when a
    /// feature bag has no destination bag of the same kind, or when shapes
    /// conflict. Kind mismatches from the merge engine are returned as-is.
    pub fn append_enabled(
        &self,
        dst: &mut [PropertyBag],
        config: &ConfigStore,
    ) -> Result<(), MergeError> {
        for name in self.enabled(config)? {
            let scope = format!("features.{name}");
            let bags = self.bundles.get(name).map_or(&[][..], Vec::as_slice);
            for bag in bags {
                let target = find_bag_mut(dst, bag.kind()).ok_or_else(|| {
                    MergeError::field(
                        scope.clone(),
                        format!("no `{}` property bag to receive feature values", bag.kind()),
                    )
                })?;
                target
                    .extend(bag, MergePolicy::Append)
                    .map_err(|err| err.scoped(&scope))?;
            }
            tracing::debug!(feature = name, "applied feature bundle");
        }
        Ok(())
    }
}
