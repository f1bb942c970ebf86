//! Path search over the store's topology
//!
//! Both searches run on an [`AdjacencyView`], a snapshot of which nodes may be
//! reached from which, so the store itself is never borrowed during traversal.

use crate::store::GraphStore;
use onering_core::{Direction, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Reachability snapshot used by the path searches
#[derive(Debug, Clone, Default)]
pub struct AdjacencyView {
    adjacency: BTreeMap<NodeId, Vec<NodeId>>,
}

impl AdjacencyView {
    /// Build a view from the store.
    ///
    /// `Outgoing` keeps a neighbour `v` of `u` only when an edge is registered
    /// under the ordered names `(name(u), name(v))`; `Incoming` checks
    /// `(name(v), name(u))`; `Both` uses the raw adjacency sets.
    pub fn from_store(store: &GraphStore, direction: Direction) -> Self {
        let mut adjacency = BTreeMap::new();

        for node in store.get_all_nodes(None) {
            let reachable = node
                .neighbours
                .iter()
                .copied()
                .filter(|other| {
                    let Ok(other_name) = store.node_name(*other) else {
                        return false;
                    };
                    match direction {
                        Direction::Outgoing => store.has_endpoint_pair(&node.name, other_name),
                        Direction::Incoming => store.has_endpoint_pair(other_name, &node.name),
                        Direction::Both => true,
                    }
                })
                .collect();
            adjacency.insert(node.id, reachable);
        }

        Self { adjacency }
    }

    /// Build a view from explicit `(from, to)` pairs
    pub fn from_pairs<I: IntoIterator<Item = (NodeId, NodeId)>>(pairs: I) -> Self {
        let mut adjacency: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for (from, to) in pairs {
            adjacency.entry(to).or_default();
            let targets = adjacency.entry(from).or_default();
            if !targets.contains(&to) {
                targets.push(to);
                targets.sort();
            }
        }
        Self { adjacency }
    }

    /// Nodes reachable in one step, in ascending id order
    pub fn neighbours(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the view knows about a node
    pub fn contains(&self, id: NodeId) -> bool {
        self.adjacency.contains_key(&id)
    }
}

/// Inclusive bounds on path length, counted in edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathBounds {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl PathBounds {
    /// No bounds: every simple path
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Whether a completed path of `length` edges may be reported
    pub fn admits(&self, length: usize) -> bool {
        self.min_length.is_none_or(|min| length >= min)
            && self.max_length.is_none_or(|max| length <= max)
    }

    /// Whether a partial path of `length` edges may grow by one more edge
    pub fn can_extend(&self, length: usize) -> bool {
        self.max_length.is_none_or(|max| length < max)
    }
}

/// Breadth-first shortest path by edge count.
///
/// The result starts at `source` and ends at `target`; it is empty when the
/// target cannot be reached or either node is outside the view.
pub fn shortest_path(view: &AdjacencyView, source: NodeId, target: NodeId) -> Vec<NodeId> {
    if !view.contains(source) || !view.contains(target) {
        return Vec::new();
    }

    let mut queue = VecDeque::new();
    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();

    queue.push_back(source);
    parents.insert(source, None);

    while let Some(current) = queue.pop_front() {
        if current == target {
            let mut path = Vec::new();
            let mut cursor = Some(target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = parents.get(&node).copied().flatten();
            }
            path.reverse();
            return path;
        }

        for &next in view.neighbours(current) {
            if !parents.contains_key(&next) {
                parents.insert(next, Some(current));
                queue.push_back(next);
            }
        }
    }

    Vec::new()
}

/// Every simple path from `source` to `target` whose edge count fits `bounds`.
///
/// Partial paths are expanded breadth first, so shorter paths come first. A path
/// never revisits a node and is never extended past `target`. Without a maximum
/// the search is exhaustive and may be exponential in the size of the graph.
pub fn all_simple_paths(
    view: &AdjacencyView,
    source: NodeId,
    target: NodeId,
    bounds: PathBounds,
) -> Vec<Vec<NodeId>> {
    let mut found = Vec::new();
    if !view.contains(source) || !view.contains(target) {
        return found;
    }

    let mut queue: VecDeque<Vec<NodeId>> = VecDeque::new();
    queue.push_back(vec![source]);

    while let Some(path) = queue.pop_front() {
        let length = path.len() - 1;
        let Some(&last) = path.last() else {
            continue;
        };

        if last == target {
            if bounds.admits(length) {
                found.push(path);
            }
            continue;
        }

        if !bounds.can_extend(length) {
            continue;
        }

        let visited: HashSet<NodeId> = path.iter().copied().collect();
        for &next in view.neighbours(last) {
            if !visited.contains(&next) {
                let mut extended = path.clone();
                extended.push(next);
                queue.push_back(extended);
            }
        }
    }

    found
}
