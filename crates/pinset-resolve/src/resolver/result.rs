use std::collections::{HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};

use crate::package::{Candidate, CandidateKey, Identifier, PackageName};

use super::{Criteria, Mapping, State};

/// Edges from each parent (`None` for the user) to the identifiers it requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: IndexMap<Option<Identifier>, IndexSet<Identifier>>,
}

impl DependencyGraph {
    fn connect(&mut self, parent: Option<Identifier>, child: Identifier) {
        self.edges.entry(parent).or_default().insert(child);
    }

    /// Identifiers required by `parent`; pass `None` for the root requirements.
    pub fn children(&self, parent: Option<&Identifier>) -> impl Iterator<Item = &Identifier> {
        self.edges
            .get(&parent.cloned())
            .into_iter()
            .flat_map(|children| children.iter())
    }

    /// Parents of an identifier; `None` stands for the user.
    pub fn parents<'a>(&'a self, child: &'a Identifier) -> impl Iterator<Item = Option<&'a Identifier>> + 'a {
        self.edges
            .iter()
            .filter(move |(_, children)| children.contains(child))
            .map(|(parent, _)| parent.as_ref())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexSet::len).sum()
    }
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    mapping: Mapping,
    graph: DependencyGraph,
    criteria: Criteria,
}

impl ResolutionResult {
    /// Build the result from the final state.
    ///
    /// Pins that are no longer reachable from a root requirement are dropped;
    /// they can be left behind when the pin that required them was replaced.
    pub(crate) fn from_state(state: State) -> Self {
        let keys: HashMap<CandidateKey, Identifier> = state
            .mapping
            .iter()
            .map(|(identifier, candidate)| (candidate.key(), identifier.clone()))
            .collect();

        let mut full = DependencyGraph::default();
        for (identifier, criterion) in &state.criteria {
            for parent in criterion.iter_parent() {
                match parent {
                    None => full.connect(None, identifier.clone()),
                    Some(key) => {
                        if let Some(parent) = keys.get(key) {
                            full.connect(Some(parent.clone()), identifier.clone());
                        }
                    }
                }
            }
        }

        let mut connected: IndexSet<Identifier> = IndexSet::new();
        let mut queue: VecDeque<&Identifier> = full.children(None).collect();
        while let Some(identifier) = queue.pop_front() {
            if connected.insert(identifier.clone()) {
                queue.extend(full.children(Some(identifier)));
            }
        }

        let mut graph = DependencyGraph::default();
        for (parent, children) in &full.edges {
            if parent.as_ref().is_some_and(|p| !connected.contains(p)) {
                continue;
            }
            for child in children.iter().filter(|c| connected.contains(*c)) {
                graph.connect(parent.clone(), child.clone());
            }
        }

        let mapping: Mapping = state
            .mapping
            .into_iter()
            .filter(|(identifier, _)| connected.contains(identifier))
            .collect();
        let criteria: Criteria = state
            .criteria
            .into_iter()
            .filter(|(identifier, _)| connected.contains(identifier))
            .collect();

        Self {
            mapping,
            graph,
            criteria,
        }
    }

    /// Pinned candidates by identifier, in pin order.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn get(&self, identifier: &Identifier) -> Option<&Candidate> {
        self.mapping.get(identifier)
    }

    /// The candidate pinned for a plain package name.
    pub fn package(&self, name: &str) -> Option<&Candidate> {
        self.mapping.get(&Identifier::package(name))
    }

    /// Flat, name-sorted `(name, version)` pairs of every pinned package.
    pub fn pins(&self) -> Vec<(PackageName, String)> {
        let mut pins: Vec<(PackageName, String)> = self
            .mapping
            .iter()
            .filter(|(identifier, _)| identifier.extras().is_some_and(|e| e.is_empty()))
            .filter_map(|(_, candidate)| {
                candidate
                    .name()
                    .map(|name| (name.clone(), candidate.version().to_string()))
            })
            .collect();
        pins.sort();
        pins
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
