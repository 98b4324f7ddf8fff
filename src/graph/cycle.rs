//! Cycle detection over defaults references.

use std::collections::HashMap;

use super::{ModuleGraph, ModuleIndex};

/// Tracks the visitation state of a node during cycle detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Return the first defaults cycle found, as module names starting and
/// ending with the same (lexicographically smallest) name.
pub(super) fn find_defaults_cycle(graph: &ModuleGraph) -> Option<Vec<String>> {
    let mut detector = CycleDetector::new(graph);
    for (index, _) in graph.active() {
        if detector.is_visited(index) {
            continue;
        }
        if let Some(found) = detector.visit(index) {
            return Some(found);
        }
    }
    None
}

struct CycleDetector<'a> {
    graph: &'a ModuleGraph,
    stack: Vec<ModuleIndex>,
    states: HashMap<ModuleIndex, VisitState>,
}

impl<'a> CycleDetector<'a> {
    fn new(graph: &'a ModuleGraph) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn is_visited(&self, node: ModuleIndex) -> bool {
        matches!(self.states.get(&node), Some(VisitState::Visited))
    }

    fn visit(&mut self, node: ModuleIndex) -> Option<Vec<String>> {
        match self.states.get(&node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self.stack.iter().position(|n| *n == node).unwrap_or_else(|| {
                    debug_assert!(false, "visiting node must be on the stack");
                    0
                });
                let mut cycle: Vec<String> = self
                    .stack
                    .iter()
                    .skip(idx)
                    .map(|index| self.name(*index))
                    .collect();
                cycle.push(self.name(node));
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node, VisitState::Visiting);
            }
        }

        self.stack.push(node);
        let providers: Vec<ModuleIndex> = self
            .graph
            .dependencies(node)
            .filter(|(tag, _)| tag.is_defaults())
            .map(|(_, provider)| provider)
            .collect();
        for provider in providers {
            if let Some(cycle) = self.visit(provider) {
                return Some(cycle);
            }
        }
        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        None
    }

    fn name(&self, index: ModuleIndex) -> String {
        self.graph
            .module(index)
            .map(|module| module.name().to_owned())
            .unwrap_or_default()
    }
}

fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        slot.clone_from(&first);
    }
    cycle
}
