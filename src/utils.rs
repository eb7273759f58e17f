use std::collections::VecDeque;

use bit_set::BitSet;
use petgraph::{
    graph::{Graph, IndexType, NodeIndex},
    Undirected,
};

/// Return `true` iff the nodes in `s` induce a connected subgraph of `g`.
///
/// The empty set is not connected; a single node always is.
pub fn is_subset_connected<N, E, Ix>(g: &Graph<N, E, Undirected, Ix>, s: &BitSet) -> bool
where
    Ix: IndexType,
{
    let Some(start) = s.iter().next() else {
        return false;
    };
    reachable_within(g, start, s).len() == s.len()
}

/// Partition the nodes of `g` into connected components, ordered by their
/// smallest node index.
pub fn connected_components<N, E, Ix>(g: &Graph<N, E, Undirected, Ix>) -> Vec<BitSet>
where
    Ix: IndexType,
{
    let all = BitSet::from_iter(g.node_indices().map(|ix| ix.index()));
    let mut seen = BitSet::with_capacity(g.node_count());
    let mut components = Vec::new();
    for v in g.node_indices().map(|ix| ix.index()) {
        if seen.contains(v) {
            continue;
        }
        let component = reachable_within(g, v, &all);
        seen.union_with(&component);
        components.push(component);
    }
    components
}

/// Breadth-first search from `start` that never leaves the node set `within`.
fn reachable_within<N, E, Ix>(
    g: &Graph<N, E, Undirected, Ix>,
    start: usize,
    within: &BitSet,
) -> BitSet
where
    Ix: IndexType,
{
    let mut visited = BitSet::with_capacity(g.node_count());
    let mut queue = VecDeque::from([start]);
    visited.insert(start);
    while let Some(v) = queue.pop_front() {
        for n in g.neighbors(NodeIndex::new(v)).map(|n| n.index()) {
            if within.contains(n) && visited.insert(n) {
                queue.push_back(n);
            }
        }
    }
    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Graph<(), (), Undirected, u32> {
        let mut g = Graph::default();
        let nodes: Vec<_> = (0..n).map(|_| g.add_node(())).collect();
        for w in nodes.windows(2) {
            g.add_edge(w[0], w[1], ());
        }
        g
    }

    #[test]
    fn subset_connectivity() {
        let g = path(4);
        assert!(is_subset_connected(&g, &BitSet::from_iter([1, 2])));
        assert!(is_subset_connected(&g, &BitSet::from_iter([3])));
        assert!(!is_subset_connected(&g, &BitSet::from_iter([0, 2])));
        assert!(!is_subset_connected(&g, &BitSet::new()));
    }

    #[test]
    fn components_split_on_isolated_nodes() {
        let mut g = path(3);
        g.add_node(());
        let components = connected_components(&g);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], BitSet::from_iter([0, 1, 2]));
        assert_eq!(components[1], BitSet::from_iter([3]));
    }
}
