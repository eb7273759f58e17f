//! Association/dissociation reactions: ways of splitting one species into two
//! connected, complementary fragments.

use bit_set::BitSet;
use petgraph::visit::EdgeRef;
use tracing::trace;

use crate::{
    canonize::{is_isomorphic, signature, Classes, Signature},
    config::{Config, Deadline},
    enumerate::{Combinations, Species},
    error::Result,
    graph::{NodeId, TypedEdge, TypedGraph},
};

/// One species splitting into two fragments (or, read backwards, two
/// fragments associating into one species).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReaction {
    parent: usize,
    parent_signature: Signature,
    fragment_a: Vec<NodeId>,
    fragment_b: Vec<NodeId>,
    fragment_signatures: (Signature, Signature),
    broken_edges: Vec<TypedEdge>,
}

impl SplitReaction {
    /// Discovery index of the parent species.
    pub fn parent(&self) -> usize {
        self.parent
    }

    pub fn parent_signature(&self) -> Signature {
        self.parent_signature
    }

    /// Sorted node ids of the smaller (or equal) fragment.
    pub fn fragment_a(&self) -> &[NodeId] {
        &self.fragment_a
    }

    /// Sorted node ids of the complementary fragment.
    pub fn fragment_b(&self) -> &[NodeId] {
        &self.fragment_b
    }

    pub fn fragment_signatures(&self) -> (Signature, Signature) {
        self.fragment_signatures
    }

    /// Bonds of the parent crossing between the fragments, each oriented
    /// from fragment A to fragment B.
    pub fn broken_edges(&self) -> &[TypedEdge] {
        &self.broken_edges
    }

    /// Order-independent key of the two fragment signatures.
    pub fn key(&self) -> (Signature, Signature) {
        let (a, b) = self.fragment_signatures;
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Return every distinct split of `species`, in generation order.
///
/// `index` is the species' discovery index and is recorded on each reaction.
pub fn split_reactions(
    index: usize,
    species: &Species,
    config: &Config,
) -> Result<Vec<SplitReaction>> {
    split_reactions_until(index, species, config, &Deadline::none())
}

pub(crate) fn split_reactions_until(
    index: usize,
    species: &Species,
    config: &Config,
    deadline: &Deadline,
) -> Result<Vec<SplitReaction>> {
    deadline.check("split derivation")?;

    let g = species.graph();
    let n = g.node_count();
    let all = g.all_nodes();

    let mut reactions = Vec::new();
    let mut fragments: Vec<(TypedGraph, TypedGraph)> = Vec::new();
    let mut classes = Classes::<(Signature, Signature)>::new(config.dedup);

    for r in 1..=n / 2 {
        for combo in Combinations::new(n, r) {
            let a = BitSet::from_iter(combo);
            let b = all.difference(&a).collect::<BitSet>();
            if !g.is_connected(&a) || !g.is_connected(&b) {
                continue;
            }

            let ga = g.induced_subgraph(&a).to_graph();
            let gb = g.induced_subgraph(&b).to_graph();
            let sa = signature(&ga, config.rounds);
            let sb = signature(&gb, config.rounds);
            let key = if sa <= sb { (sa, sb) } else { (sb, sa) };

            let same = |m: usize| {
                let (x, y): &(TypedGraph, TypedGraph) = &fragments[m];
                (is_isomorphic(x, &ga) && is_isomorphic(y, &gb))
                    || (is_isomorphic(x, &gb) && is_isomorphic(y, &ga))
            };
            if !classes.admit(key, reactions.len(), same) {
                continue;
            }

            reactions.push(SplitReaction {
                parent: index,
                parent_signature: species.signature(),
                fragment_a: g.ids_of(&a),
                fragment_b: g.ids_of(&b),
                fragment_signatures: (sa, sb),
                broken_edges: crossing_edges(g, &a, &b),
            });
            fragments.push((ga, gb));
        }
    }

    trace!(species = index, splits = reactions.len(), "derived splits");
    Ok(reactions)
}

/// Edges of `g` with one endpoint in `a` and the other in `b`, oriented a→b.
fn crossing_edges(g: &TypedGraph, a: &BitSet, b: &BitSet) -> Vec<TypedEdge> {
    let graph = g.graph();
    graph
        .edge_references()
        .filter_map(|e| {
            let (s, t) = (e.source(), e.target());
            let (from, to) = if a.contains(s.index()) && b.contains(t.index()) {
                (s, t)
            } else if a.contains(t.index()) && b.contains(s.index()) {
                (t, s)
            } else {
                return None;
            };
            Some((graph[from].id(), graph[to].id(), e.weight().clone()))
        })
        .collect()
}
