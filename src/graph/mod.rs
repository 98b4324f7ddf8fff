//! Module graph: an arena of modules joined by tagged dependency edges.
//!
//! Modules are stored once and addressed by [`ModuleIndex`]. Edges point
//! from a dependent to its provider and carry a [`DependencyTag`]. Before the
//! splitter runs every name maps to exactly one node; afterwards a name maps
//! to one node per supported variant, and edges are re-targeted so each one
//! binds to the provider variant it needs.
//!
//! Disabled modules stay in the arena so indices remain stable, but they are
//! skipped by [`ModuleGraph::active`] and looking one up by name fails with
//! [`GraphError::ModuleDisabled`].

mod cycle;
mod error;

pub use error::GraphError;

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::module::{Module, TargetType};

/// Stable handle to a node in a [`ModuleGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleIndex(usize);

impl fmt::Display for ModuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Meaning of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyTag {
    /// Inherit every defaultable bag.
    Defaults,
    /// Inherit from a flag-only defaults bundle.
    FlagDefaults,
    /// Ordinary build dependency, bound to the dependent's own variant.
    Build,
    /// Tool run at build time, always bound to the host variant.
    HostTool,
}

impl DependencyTag {
    /// Whether the edge is a defaults reference.
    #[must_use]
    pub const fn is_defaults(self) -> bool {
        matches!(self, Self::Defaults | Self::FlagDefaults)
    }

    /// Provider variant this edge binds to for a dependent of `variant`.
    #[must_use]
    pub const fn provider_variant(self, variant: TargetType) -> TargetType {
        match self {
            Self::HostTool => TargetType::Host,
            Self::Defaults | Self::FlagDefaults | Self::Build => variant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    tag: DependencyTag,
    target: ModuleIndex,
    /// Restricts the edge to one variant of the dependent.
    only: Option<TargetType>,
}

#[derive(Debug, Clone)]
struct Node {
    module: Module,
    disabled: bool,
    edges: Vec<Edge>,
}

/// One step of [`ModuleGraph::walk_deps`].
#[derive(Debug, Clone, Copy)]
pub struct DepVisit<'a> {
    /// Index of the provider being visited.
    pub index: ModuleIndex,
    /// Provider being visited.
    pub dep: &'a Module,
    /// Module holding the edge.
    pub parent: &'a Module,
    /// Tag of the edge.
    pub tag: DependencyTag,
}

/// Arena-backed module graph.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    nodes: Vec<Node>,
    names: IndexMap<String, Vec<ModuleIndex>>,
}

impl ModuleGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from declared modules and wire their `defaults`,
    /// `flag_defaults` and `deps` references, then validate it.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] for duplicate names, unknown references,
    /// defaults references to non-defaults modules and defaults cycles.
    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for module in modules {
            graph.add_module(module)?;
        }
        for index in graph.indices() {
            let Some(module) = graph.module(index) else {
                continue;
            };
            let references: Vec<(DependencyTag, String)> = module
                .defaults()
                .iter()
                .map(|name| (DependencyTag::Defaults, name.clone()))
                .chain(
                    module
                        .flag_defaults()
                        .iter()
                        .map(|name| (DependencyTag::FlagDefaults, name.clone())),
                )
                .chain(
                    module
                        .deps()
                        .iter()
                        .map(|name| (DependencyTag::Build, name.clone())),
                )
                .collect();
            for (tag, name) in references {
                graph.add_dependency(index, &name, tag)?;
            }
        }
        graph.validate()?;
        Ok(graph)
    }

    /// Add a module, returning its index.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateModule`] when the name is taken.
    pub fn add_module(&mut self, module: Module) -> Result<ModuleIndex, GraphError> {
        if self.names.contains_key(module.name()) {
            return Err(GraphError::DuplicateModule {
                name: module.name().to_owned(),
            });
        }
        let index = ModuleIndex(self.nodes.len());
        self.names.insert(module.name().to_owned(), vec![index]);
        self.nodes.push(Node {
            module,
            disabled: false,
            edges: Vec::new(),
        });
        Ok(index)
    }

    /// Add an edge from `from` to the module named `to`.
    ///
    /// Repeated identical edges are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDependency`] when `to` is not declared.
    pub fn add_dependency(
        &mut self,
        from: ModuleIndex,
        to: &str,
        tag: DependencyTag,
    ) -> Result<(), GraphError> {
        self.insert_edge(from, to, tag, None)
    }

    /// Add an edge that only applies to the `variant` clone of `from`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDependency`] when `to` is not declared.
    pub fn add_variant_dependency(
        &mut self,
        from: ModuleIndex,
        to: &str,
        tag: DependencyTag,
        variant: TargetType,
    ) -> Result<(), GraphError> {
        self.insert_edge(from, to, tag, Some(variant))
    }

    fn insert_edge(
        &mut self,
        from: ModuleIndex,
        to: &str,
        tag: DependencyTag,
        only: Option<TargetType>,
    ) -> Result<(), GraphError> {
        let maybe_target = self.first_index(to);
        let Some(node) = self.nodes.get_mut(from.0) else {
            return Err(GraphError::NotFound {
                name: from.to_string(),
            });
        };
        let target = maybe_target.ok_or_else(|| GraphError::UnknownDependency {
            module: node.module.name().to_owned(),
            dependency: to.to_owned(),
        })?;
        let edge = Edge { tag, target, only };
        if !node.edges.contains(&edge) {
            node.edges.push(edge);
        }
        Ok(())
    }

    fn first_index(&self, name: &str) -> Option<ModuleIndex> {
        self.names
            .get(name)
            .and_then(|indices| indices.first().copied())
    }

    /// Check defaults references and reject defaults cycles.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotDefaults`] or [`GraphError::DefaultsCycle`].
    pub fn validate(&self) -> Result<(), GraphError> {
        for node in &self.nodes {
            for edge in node.edges.iter().filter(|edge| edge.tag.is_defaults()) {
                let Some(target) = self.nodes.get(edge.target.0) else {
                    continue;
                };
                if !target.module.is_defaults() {
                    return Err(GraphError::NotDefaults {
                        module: node.module.name().to_owned(),
                        dependency: target.module.name().to_owned(),
                        kind: target.module.kind(),
                    });
                }
            }
        }
        if let Some(cycle) = cycle::find_defaults_cycle(self) {
            return Err(GraphError::DefaultsCycle { cycle });
        }
        Ok(())
    }

    /// Number of nodes, including disabled ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indices of every active node, in arena order.
    #[must_use]
    pub fn indices(&self) -> Vec<ModuleIndex> {
        self.active().map(|(index, _)| index).collect()
    }

    /// Iterate over active modules in arena order.
    pub fn active(&self) -> impl Iterator<Item = (ModuleIndex, &Module)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.disabled)
            .map(|(index, node)| (ModuleIndex(index), &node.module))
    }

    /// Module at `index`, including disabled modules.
    #[must_use]
    pub fn module(&self, index: ModuleIndex) -> Option<&Module> {
        self.nodes.get(index.0).map(|node| &node.module)
    }

    /// Mutable module at `index`.
    pub fn module_mut(&mut self, index: ModuleIndex) -> Option<&mut Module> {
        self.nodes.get_mut(index.0).map(|node| &mut node.module)
    }

    /// Borrow `dst` mutably and `src` immutably at the same time.
    ///
    /// Returns `None` when the indices are equal or out of range.
    pub fn pair_mut(&mut self, dst: ModuleIndex, src: ModuleIndex) -> Option<(&mut Module, &Module)> {
        if dst == src || dst.0.max(src.0) >= self.nodes.len() {
            return None;
        }
        if dst.0 < src.0 {
            let (head, tail) = self.nodes.split_at_mut(src.0);
            Some((&mut head.get_mut(dst.0)?.module, &tail.first()?.module))
        } else {
            let (head, tail) = self.nodes.split_at_mut(dst.0);
            Some((&mut tail.first_mut()?.module, &head.get(src.0)?.module))
        }
    }

    /// Whether the node at `index` is disabled.
    #[must_use]
    pub fn is_disabled(&self, index: ModuleIndex) -> bool {
        self.nodes.get(index.0).is_some_and(|node| node.disabled)
    }

    /// Disable the node at `index`.
    pub fn disable(&mut self, index: ModuleIndex) {
        if let Some(node) = self.nodes.get_mut(index.0) {
            node.disabled = true;
        }
    }

    /// Outgoing edges of `index` as `(tag, provider)` pairs.
    pub fn dependencies(
        &self,
        index: ModuleIndex,
    ) -> impl Iterator<Item = (DependencyTag, ModuleIndex)> + '_ {
        self.nodes
            .get(index.0)
            .into_iter()
            .flat_map(|node| node.edges.iter().map(|edge| (edge.tag, edge.target)))
    }

    /// Find the active module called `name`, optionally of one variant.
    ///
    /// Without a variant the first active clone is returned.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] for unknown names,
    /// [`GraphError::ModuleDisabled`] when every node of that name is
    /// disabled, and [`GraphError::MissingVariant`] when the requested variant
    /// does not exist.
    pub fn lookup(
        &self,
        name: &str,
        variant: Option<TargetType>,
    ) -> Result<ModuleIndex, GraphError> {
        let indices = self.names.get(name).ok_or_else(|| GraphError::NotFound {
            name: name.to_owned(),
        })?;
        let mut active = indices
            .iter()
            .copied()
            .filter(|index| !self.is_disabled(*index))
            .peekable();
        if active.peek().is_none() {
            return Err(GraphError::ModuleDisabled {
                name: name.to_owned(),
            });
        }
        let Some(wanted) = variant else {
            return active.next().ok_or_else(|| GraphError::ModuleDisabled {
                name: name.to_owned(),
            });
        };
        active
            .find(|index| self.module(*index).and_then(Module::variant) == Some(wanted))
            .ok_or_else(|| GraphError::MissingVariant {
                module: name.to_owned(),
                dependency: name.to_owned(),
                variant: wanted,
            })
    }

    /// Walk the dependencies of `start` depth-first in preorder.
    ///
    /// `visit` is called once per edge reached; returning `Ok(true)` descends
    /// into the provider's own edges. Only edges accepted by `follow` are
    /// considered. A node already on the current path is never re-entered,
    /// and disabled providers are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `visit`.
    pub fn walk_deps<E, F, V>(&self, start: ModuleIndex, follow: F, mut visit: V) -> Result<(), E>
    where
        F: Fn(DependencyTag) -> bool,
        V: FnMut(DepVisit<'_>) -> Result<bool, E>,
    {
        let mut path = vec![start];
        self.walk_from(start, &follow, &mut visit, &mut path)
    }

    fn walk_from<E, F, V>(
        &self,
        parent: ModuleIndex,
        follow: &F,
        visit: &mut V,
        path: &mut Vec<ModuleIndex>,
    ) -> Result<(), E>
    where
        F: Fn(DependencyTag) -> bool,
        V: FnMut(DepVisit<'_>) -> Result<bool, E>,
    {
        let Some(parent_node) = self.nodes.get(parent.0) else {
            return Ok(());
        };
        for edge in parent_node.edges.iter().filter(|edge| follow(edge.tag)) {
            if path.contains(&edge.target) {
                continue;
            }
            let Some(dep_node) = self.nodes.get(edge.target.0) else {
                continue;
            };
            if dep_node.disabled {
                continue;
            }
            let descend = visit(DepVisit {
                index: edge.target,
                dep: &dep_node.module,
                parent: &parent_node.module,
                tag: edge.tag,
            })?;
            if descend {
                path.push(edge.target);
                self.walk_from(edge.target, follow, visit, path)?;
                path.pop();
            }
        }
        Ok(())
    }

    /// Defaults bundles reachable from `start`, in preorder, each listed once.
    #[must_use]
    pub fn defaults_order(&self, start: ModuleIndex) -> Vec<ModuleIndex> {
        let mut order: Vec<ModuleIndex> = Vec::new();
        let walked: Result<(), std::convert::Infallible> =
            self.walk_deps(start, DependencyTag::is_defaults, |step| {
                if order.contains(&step.index) {
                    return Ok(false);
                }
                order.push(step.index);
                Ok(true)
            });
        match walked {
            Ok(()) => order,
            Err(never) => match never {},
        }
    }

    /// Replace the node at `index` with one clone per variant, in the given
    /// order. The first clone reuses the node; later clones are appended to
    /// the arena with copies of the outgoing edges that apply to them. An
    /// empty `variants` slice disables the node.
    ///
    /// Returns the indices of the clones.
    pub fn create_variations(
        &mut self,
        index: ModuleIndex,
        variants: &[TargetType],
    ) -> Vec<ModuleIndex> {
        let Some(original) = self.nodes.get(index.0).cloned() else {
            return Vec::new();
        };
        let Some((first, rest)) = variants.split_first() else {
            self.disable(index);
            return Vec::new();
        };
        let mut created = Vec::with_capacity(variants.len());
        if let Some(node) = self.nodes.get_mut(index.0) {
            node.module.set_variant(*first);
            node.edges.retain(|edge| applies_to(edge, *first));
            created.push(index);
        }
        for variant in rest {
            let mut clone = original.clone();
            clone.module.set_variant(*variant);
            clone.edges.retain(|edge| applies_to(edge, *variant));
            let clone_index = ModuleIndex(self.nodes.len());
            self.nodes.push(clone);
            if let Some(indices) = self.names.get_mut(original.module.name()) {
                indices.push(clone_index);
            }
            created.push(clone_index);
        }
        created
    }

    /// Re-bind every edge of every active node to the provider variant it
    /// needs: host-tool edges to the host variant, all others to the
    /// dependent's own variant. A dependent that was never split binds its
    /// non-host-tool edges to the provider's first active variant.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingVariant`] when the provider has no such
    /// variant, including when it is disabled, and
    /// [`GraphError::ModuleDisabled`] when an unsplit dependent needs a
    /// provider that has no active variant at all.
    pub fn retarget_edges(&mut self) -> Result<(), GraphError> {
        for position in 0..self.nodes.len() {
            let Some(node) = self.nodes.get(position) else {
                continue;
            };
            if node.disabled {
                continue;
            }
            let own = node.module.variant();
            let mut edges = node.edges.clone();
            for edge in &mut edges {
                let wanted = match own {
                    Some(variant) => Some(edge.tag.provider_variant(variant)),
                    None if edge.tag == DependencyTag::HostTool => Some(TargetType::Host),
                    None => None,
                };
                edge.target = self.variant_of(node, edge.target, wanted)?;
            }
            if let Some(slot) = self.nodes.get_mut(position) {
                slot.edges = edges;
            }
        }
        Ok(())
    }

    fn variant_of(
        &self,
        dependent: &Node,
        provider: ModuleIndex,
        wanted: Option<TargetType>,
    ) -> Result<ModuleIndex, GraphError> {
        let Some(provider_module) = self.module(provider) else {
            return Ok(provider);
        };
        // Modules without a splittable bag are never cloned and serve every
        // variant.
        if provider_module.variant().is_none() && !self.is_disabled(provider) {
            return Ok(provider);
        }
        let name = provider_module.name();
        let mut active = self
            .names
            .get(name)
            .into_iter()
            .flatten()
            .copied()
            .filter(|index| !self.is_disabled(*index));
        let Some(variant) = wanted else {
            return active.next().ok_or_else(|| GraphError::ModuleDisabled {
                name: name.to_owned(),
            });
        };
        active
            .find(|index| self.module(*index).and_then(Module::variant) == Some(variant))
            .ok_or_else(|| GraphError::MissingVariant {
                module: dependent.module.name().to_owned(),
                dependency: name.to_owned(),
                variant,
            })
    }
}

fn applies_to(edge: &Edge, variant: TargetType) -> bool {
    edge.only.is_none_or(|only| only == variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleKind;
    use crate::properties::{BagKind, PropertyBag, PropertyValue};
    use rstest::rstest;

    fn defaults(name: &str, parents: &[&str]) -> Module {
        Module::new(name, ModuleKind::Defaults).with_defaults(parents.iter().copied())
    }

    #[rstest]
    fn diamond_defaults_are_listed_once() {
        let graph = ModuleGraph::from_modules([
            defaults("root", &[]),
            defaults("left", &["root"]),
            defaults("right", &["root"]),
            Module::new("lib", ModuleKind::StaticLibrary).with_defaults(["left", "right"]),
        ])
        .expect("graph");
        let lib = graph.lookup("lib", None).expect("lib");
        let names: Vec<_> = graph
            .defaults_order(lib)
            .into_iter()
            .filter_map(|index| graph.module(index).map(Module::name))
            .collect();
        assert_eq!(names, ["left", "root", "right"]);
    }

    #[rstest]
    fn defaults_must_reference_defaults_modules() {
        let err = ModuleGraph::from_modules([
            Module::new("base", ModuleKind::StaticLibrary),
            Module::new("lib", ModuleKind::StaticLibrary).with_defaults(["base"]),
        ])
        .expect_err("not defaults");
        assert!(matches!(err, GraphError::NotDefaults { .. }));
    }

    #[rstest]
    fn unknown_references_are_rejected() {
        let err = ModuleGraph::from_modules([
            Module::new("lib", ModuleKind::StaticLibrary).with_deps(["ghost"]),
        ])
        .expect_err("unknown");
        assert_eq!(
            err,
            GraphError::UnknownDependency {
                module: "lib".into(),
                dependency: "ghost".into(),
            }
        );
    }

    #[rstest]
    fn duplicate_names_are_rejected() {
        let err = ModuleGraph::from_modules([
            Module::new("a", ModuleKind::Binary),
            Module::new("a", ModuleKind::Binary),
        ])
        .expect_err("duplicate");
        assert!(matches!(err, GraphError::DuplicateModule { .. }));
    }

    #[rstest]
    fn variations_reuse_the_first_node_and_retarget_edges() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("lib", ModuleKind::StaticLibrary),
            Module::new("app", ModuleKind::Binary).with_deps(["lib"]),
        ])
        .expect("graph");
        let lib = graph.lookup("lib", None).expect("lib");
        let app = graph.lookup("app", None).expect("app");
        let clones = graph.create_variations(lib, &TargetType::ALL);
        assert_eq!(clones.first(), Some(&lib));
        assert_eq!(clones.len(), 2);
        graph.create_variations(app, &[TargetType::Target]);
        graph.retarget_edges().expect("retarget");

        let target_lib = graph.lookup("lib", Some(TargetType::Target)).expect("target lib");
        let deps: Vec<_> = graph.dependencies(app).collect();
        assert_eq!(deps, vec![(DependencyTag::Build, target_lib)]);
    }

    #[rstest]
    fn host_tools_bind_to_the_host_variant() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("tool", ModuleKind::Binary)
                .with_property("host_supported", PropertyValue::bool(true))
                .expect("host"),
            Module::new("gen", ModuleKind::GenerateSource),
        ])
        .expect("graph");
        let tool = graph.lookup("tool", None).expect("tool");
        let generator = graph.lookup("gen", None).expect("gen");
        graph
            .add_dependency(generator, "tool", DependencyTag::HostTool)
            .expect("edge");
        graph.create_variations(tool, &TargetType::ALL);
        graph.create_variations(generator, &[TargetType::Target]);
        graph.retarget_edges().expect("retarget");
        let deps: Vec<_> = graph.dependencies(generator).collect();
        assert_eq!(deps, vec![(DependencyTag::HostTool, tool)]);
    }

    #[rstest]
    fn disabled_modules_fail_lookup_and_edges() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("lib", ModuleKind::StaticLibrary),
            Module::new("app", ModuleKind::Binary).with_deps(["lib"]),
        ])
        .expect("graph");
        let lib = graph.lookup("lib", None).expect("lib");
        let app = graph.lookup("app", None).expect("app");
        graph.create_variations(lib, &[]);
        graph.create_variations(app, &[TargetType::Target]);

        assert_eq!(
            graph.lookup("lib", None),
            Err(GraphError::ModuleDisabled { name: "lib".into() })
        );
        assert_eq!(graph.active().count(), 1);
        let err = graph.retarget_edges().expect_err("missing variant");
        assert!(matches!(err, GraphError::MissingVariant { .. }));
    }

    #[rstest]
    fn variant_edges_only_reach_their_clone() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("hostlib", ModuleKind::StaticLibrary)
                .with_property("host_supported", PropertyValue::bool(true))
                .expect("host"),
            Module::new("app", ModuleKind::Binary)
                .with_property("host_supported", PropertyValue::bool(true))
                .expect("host"),
        ])
        .expect("graph");
        let hostlib = graph.lookup("hostlib", None).expect("hostlib");
        let app = graph.lookup("app", None).expect("app");
        graph
            .add_variant_dependency(app, "hostlib", DependencyTag::Build, TargetType::Host)
            .expect("edge");
        graph.create_variations(hostlib, &[TargetType::Host]);
        let clones = graph.create_variations(app, &TargetType::ALL);
        graph.retarget_edges().expect("retarget");

        let edge_counts: Vec<_> = clones
            .iter()
            .map(|clone| graph.dependencies(*clone).count())
            .collect();
        assert_eq!(edge_counts, [1, 0]);
    }

    fn unsplit(name: &str) -> Module {
        Module::with_bags(
            name,
            ModuleKind::Binary,
            vec![
                PropertyBag::new(BagKind::Common),
                PropertyBag::new(BagKind::Linkable),
            ],
        )
    }

    #[rstest]
    fn unsplit_dependents_bind_host_tools_to_the_host_clone() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("tool", ModuleKind::Binary)
                .with_property("host_supported", PropertyValue::bool(true))
                .expect("host"),
            unsplit("shim"),
        ])
        .expect("graph");
        let tool = graph.lookup("tool", None).expect("tool");
        let shim = graph.lookup("shim", None).expect("shim");
        graph
            .add_dependency(shim, "tool", DependencyTag::HostTool)
            .expect("edge");
        graph.create_variations(tool, &[TargetType::Target, TargetType::Host]);
        graph.retarget_edges().expect("retarget");

        let host_tool = graph.lookup("tool", Some(TargetType::Host)).expect("host tool");
        assert_ne!(host_tool, tool);
        let deps: Vec<_> = graph.dependencies(shim).collect();
        assert_eq!(deps, vec![(DependencyTag::HostTool, host_tool)]);
    }

    #[rstest]
    fn unsplit_dependents_reject_disabled_providers() {
        let mut graph = ModuleGraph::from_modules([
            Module::new("lib", ModuleKind::StaticLibrary),
            unsplit("shim").with_deps(["lib"]),
        ])
        .expect("graph");
        let lib = graph.lookup("lib", None).expect("lib");
        graph.create_variations(lib, &[]);
        assert_eq!(
            graph.retarget_edges(),
            Err(GraphError::ModuleDisabled { name: "lib".into() })
        );
    }
}
