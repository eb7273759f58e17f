//! Enumerate the species of a reference graph.
//!
//! A species is a connected, induced subgraph of the reference graph, kept up
//! to type-respecting isomorphism. Within every connected component we walk
//! all non-empty node subsets (smallest first, lexicographic within a size),
//! keep the connected ones, and file each under its [`Signature`]. The first
//! subgraph to produce a signature becomes the representative of its class.
//!
//! This costs 2^k subsets for a k-node component; use
//! [`Budget::max_component_size`](crate::config::Budget) to refuse
//! components that are too large rather than truncating silently.

use bit_set::BitSet;
use petgraph::graph::NodeIndex;
use tracing::{debug, info, instrument, warn};

use crate::{
    canonize::{is_isomorphic, signature, Classes, Signature},
    config::{Config, Deadline},
    error::{NetworkError, Result},
    graph::{NodeId, SiteType, TypedGraph},
};

/// How many subsets to visit between deadline checks.
const DEADLINE_STRIDE: usize = 4096;

/// Iterator over the `r`-element combinations of `0..n` in lexicographic
/// order, stepping an explicit index vector instead of recursing.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            indices: (0..r).collect(),
            started: false,
            done: r > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }

        // Find the rightmost index that can still move right.
        let r = self.indices.len();
        let Some(i) = (0..r).rev().find(|&i| self.indices[i] != i + self.n - r) else {
            self.done = true;
            return None;
        };
        self.indices[i] += 1;
        for j in i + 1..r {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.indices.clone())
    }
}

/// All non-empty subsets of `0..n`, by increasing size.
pub fn nonempty_subsets(n: usize) -> impl Iterator<Item = Vec<usize>> {
    (1..=n).flat_map(move |r| Combinations::new(n, r))
}

/// A connected subgraph of the reference graph, standing for its whole
/// isomorphism class.
#[derive(Debug, Clone)]
pub struct Species {
    graph: TypedGraph,
    signature: Signature,
}

impl Species {
    pub fn new(graph: TypedGraph, signature: Signature) -> Self {
        Self { graph, signature }
    }

    /// The subgraph, with the reference graph's node ids.
    pub fn graph(&self) -> &TypedGraph {
        &self.graph
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Sorted ids of the reference nodes this species was cut from.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = self.graph.ids();
        ids.sort_unstable();
        ids
    }

    pub fn composition(&self) -> Vec<SiteType> {
        self.graph.composition()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Return the species of `reference`, in discovery order.
pub fn enumerate_species(reference: &TypedGraph, config: &Config) -> Result<Vec<Species>> {
    enumerate_species_until(reference, config, &config.budget.start())
}

#[instrument(
    skip_all,
    fields(nodes = reference.node_count(), edges = reference.edge_count())
)]
pub(crate) fn enumerate_species_until(
    reference: &TypedGraph,
    config: &Config,
    deadline: &Deadline,
) -> Result<Vec<Species>> {
    let budget = &config.budget;
    let components = reference.components();

    if let Some(max) = budget.max_component_size {
        if let Some(big) = components.iter().find(|c| c.len() > max) {
            warn!(size = big.len(), max, "component too large to enumerate");
            return Err(NetworkError::budget(format!(
                "component of {} nodes exceeds the limit of {max}",
                big.len()
            )));
        }
    }

    let mut species: Vec<Species> = Vec::new();
    let mut classes = Classes::<Signature>::new(config.dedup);
    let mut visited = 0usize;

    for component in &components {
        let members: Vec<usize> = component.iter().collect();
        let before = species.len();

        for combo in nonempty_subsets(members.len()) {
            if visited % DEADLINE_STRIDE == 0 {
                deadline.check("species enumeration")?;
            }
            visited += 1;

            let subset = BitSet::from_iter(combo.iter().map(|&i| members[i]));
            if subset.len() == 1 {
                // Isolated sites are not species.
                if reference
                    .graph()
                    .neighbors(NodeIndex::new(members[combo[0]]))
                    .next()
                    .is_none()
                {
                    continue;
                }
            } else if !reference.is_connected(&subset) {
                continue;
            }

            let graph = reference.induced_subgraph(&subset).to_graph();
            let sig = signature(&graph, config.rounds);
            let same = |m: usize| is_isomorphic(species[m].graph(), &graph);
            if classes.admit(sig, species.len(), same) {
                species.push(Species::new(graph, sig));
                if budget.max_species.is_some_and(|max| species.len() > max) {
                    return Err(NetworkError::budget(format!(
                        "more than {} species",
                        species.len() - 1
                    )));
                }
            }
        }

        debug!(
            size = members.len(),
            new_species = species.len() - before,
            "enumerated component"
        );
    }

    info!(
        species = species.len(),
        subsets = visited,
        collisions = classes.collisions(),
        "enumerated species"
    );
    Ok(species)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Budget, DedupMode};

    #[test]
    fn combinations_in_lexicographic_order() {
        let combos: Vec<_> = Combinations::new(4, 2).collect();
        assert_eq!(
            combos,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Combinations::new(3, 3).count(), 1);
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(Combinations::new(3, 0).count(), 1);
        assert_eq!(Combinations::new(10, 4).count(), 210);
    }

    #[test]
    fn powerset_size() {
        assert_eq!(nonempty_subsets(5).count(), 31);
        assert_eq!(nonempty_subsets(0).count(), 0);
    }

    #[test]
    fn isolated_nodes_are_not_species() {
        let g = TypedGraph::builder()
            .node(0, "A")
            .node(1, "B")
            .node(2, "C")
            .edge(0, 1, "ab")
            .build()
            .unwrap();
        let species = enumerate_species(&g, &Config::serial()).unwrap();
        // A, B, A-B; never the lone C.
        assert_eq!(species.len(), 3);
        assert!(species
            .iter()
            .all(|s| s.composition() != vec![SiteType::from("C")]));
    }

    #[test]
    fn isomorphic_subgraphs_collapse() {
        // A path of four identical sites has one species per length.
        let g = TypedGraph::builder()
            .node(0, "A")
            .node(1, "A")
            .node(2, "A")
            .node(3, "A")
            .edge(0, 1, "x")
            .edge(1, 2, "x")
            .edge(2, 3, "x")
            .build()
            .unwrap();
        for dedup in [DedupMode::Signature, DedupMode::Verified] {
            let species = enumerate_species(&g, &Config::serial().with_dedup(dedup)).unwrap();
            let sizes: Vec<_> = species.iter().map(Species::node_count).collect();
            assert_eq!(sizes, vec![1, 2, 3, 4]);
            assert_eq!(species[1].ids(), vec![0, 1]);
        }
    }

    /// A 6-cycle with one long chord next to two triangles joined by a
    /// bridge. Both have six sites, seven bonds and degrees 3,3,2,2,2,2, and
    /// colour refinement cannot tell them apart.
    fn refinement_twins() -> TypedGraph {
        let chorded = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (0, 3)];
        let bridged = [
            (10, 11),
            (11, 12),
            (12, 10),
            (13, 14),
            (14, 15),
            (15, 13),
            (12, 13),
        ];
        let b = (0..6)
            .chain(10..16)
            .fold(TypedGraph::builder(), |b, i| b.node(i, "X"));
        chorded
            .into_iter()
            .chain(bridged)
            .fold(b, |b, (u, v)| b.edge(u, v, "a"))
            .build()
            .unwrap()
    }

    #[test]
    fn verified_mode_separates_signature_collisions() {
        let g = refinement_twins();
        let loose = enumerate_species(&g, &Config::serial()).unwrap();
        let strict =
            enumerate_species(&g, &Config::serial().with_dedup(DedupMode::Verified)).unwrap();
        assert_eq!(loose.len(), 12);
        assert_eq!(strict.len(), loose.len() + 1);

        let full: Vec<_> = strict.iter().filter(|s| s.node_count() == 6).collect();
        assert_eq!(full.len(), 2);
        assert_eq!(full[0].signature(), full[1].signature());
        assert!(!is_isomorphic(full[0].graph(), full[1].graph()));
        assert_eq!(full[1].ids(), vec![10, 11, 12, 13, 14, 15]);

        for (i, a) in strict.iter().enumerate() {
            for b in &strict[i + 1..] {
                assert!(!is_isomorphic(a.graph(), b.graph()));
            }
        }
    }

    #[test]
    fn component_budget_is_enforced() {
        let g = TypedGraph::builder()
            .node(0, "A")
            .node(1, "A")
            .node(2, "A")
            .edge(0, 1, "x")
            .edge(1, 2, "x")
            .build()
            .unwrap();
        let config = Config::serial().with_budget(Budget {
            max_component_size: Some(2),
            ..Budget::default()
        });
        assert!(matches!(
            enumerate_species(&g, &config),
            Err(NetworkError::ResourceBudgetExceeded(_))
        ));

        let config = Config::serial().with_budget(Budget {
            max_species: Some(2),
            ..Budget::default()
        });
        assert!(matches!(
            enumerate_species(&g, &config),
            Err(NetworkError::ResourceBudgetExceeded(_))
        ));
    }
}
