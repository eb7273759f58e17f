//! Typed graph representation of a molecular assembly.
//!
//! Nodes are binding sites carrying a [`SiteType`]; edges are formed bonds
//! carrying a [`BondType`]. A [`TypedGraph`] is immutable once built: node
//! subsets are [`BitSet`]s over its node indices, induced subgraphs are
//! borrowed [`SubgraphView`]s, and every mutation (only needed when trying
//! out bond changes) produces a new owned graph.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use bit_set::BitSet;
use petgraph::{
    graph::{Graph, NodeIndex},
    visit::EdgeRef,
    Undirected,
};

use crate::{
    error::{NetworkError, Result},
    utils::{connected_components, is_subset_connected},
};

pub(crate) type Index = u32;
pub(crate) type TGraph = Graph<Site, BondType, Undirected, Index>;

/// Caller-chosen identifier of a binding site.
pub type NodeId = u32;

macro_rules! type_label {
    ( $( $(#[$doc:meta])* $name:ident, )* ) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(label: impl Into<String>) -> Self {
                    Self(label.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<&str> for $name {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }

            impl From<String> for $name {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }
        )*
    };
}

type_label!(
    /// Type label of a binding site (e.g. the subunit it belongs to).
    SiteType,
    /// Type label of a bond (e.g. the interface it is formed across).
    BondType,
);

/// The nodes of a [`TypedGraph`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Site {
    id: NodeId,
    kind: SiteType,
}

impl Site {
    pub fn new(id: NodeId, kind: SiteType) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &SiteType {
        &self.kind
    }
}

/// A bond listed by the ids of its endpoints.
pub type TypedEdge = (NodeId, NodeId, BondType);

/// A simple, loopless, undirected graph with typed nodes and typed edges.
#[derive(Debug, Clone)]
pub struct TypedGraph {
    graph: TGraph,
    index_of: BTreeMap<NodeId, NodeIndex<Index>>,
}

impl TypedGraph {
    /// Start building a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Build a graph from node and edge lists in one go.
    pub fn new(
        nodes: impl IntoIterator<Item = (NodeId, SiteType)>,
        edges: impl IntoIterator<Item = TypedEdge>,
    ) -> Result<Self> {
        let mut builder = GraphBuilder::default();
        builder.nodes.extend(nodes);
        builder.edges.extend(edges);
        builder.build()
    }

    /// Construct from an already-validated petgraph graph.
    fn from_graph(graph: TGraph) -> Self {
        let index_of = graph
            .node_indices()
            .map(|ix| (graph[ix].id, ix))
            .collect();
        Self { graph, index_of }
    }

    pub(crate) fn graph(&self) -> &TGraph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over `(id, type)` for every node, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SiteType)> + '_ {
        self.graph.node_weights().map(|s| (s.id, &s.kind))
    }

    /// Iterate over `(u, v, type)` for every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &BondType)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].id,
                self.graph[e.target()].id,
                e.weight(),
            )
        })
    }

    /// Return the node ids, in insertion order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.graph.node_weights().map(|s| s.id).collect()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of.contains_key(&id)
    }

    pub(crate) fn index(&self, id: NodeId) -> Result<NodeIndex<Index>> {
        self.index_of
            .get(&id)
            .copied()
            .ok_or_else(|| {
                NetworkError::invalid_graph(format!("node {id} is not in the graph"))
            })
    }

    pub fn site_type(&self, id: NodeId) -> Result<&SiteType> {
        Ok(&self.graph[self.index(id)?].kind)
    }

    /// Return the type of the edge between `u` and `v`, if there is one.
    pub fn edge_type(&self, u: NodeId, v: NodeId) -> Option<&BondType> {
        let (u, v) = (self.index_of.get(&u)?, self.index_of.get(&v)?);
        self.graph
            .find_edge(*u, *v)
            .and_then(|e| self.graph.edge_weight(e))
    }

    pub fn neighbors(&self, id: NodeId) -> Result<impl Iterator<Item = NodeId> + '_> {
        let ix = self.index(id)?;
        Ok(self.graph.neighbors(ix).map(move |n| self.graph[n].id))
    }

    pub fn degree(&self, id: NodeId) -> Result<usize> {
        Ok(self.graph.neighbors(self.index(id)?).count())
    }

    /// Sorted multiset of node types.
    pub fn composition(&self) -> Vec<SiteType> {
        let mut kinds: Vec<SiteType> = self
            .graph
            .node_weights()
            .map(|s| s.kind.clone())
            .collect();
        kinds.sort();
        kinds
    }

    /// The set of all node indices.
    pub fn all_nodes(&self) -> BitSet {
        BitSet::from_iter(self.graph.node_indices().map(|ix| ix.index()))
    }

    /// Convert a set of node ids into a node-index subset.
    pub fn subset_of(&self, ids: impl IntoIterator<Item = NodeId>) -> Result<BitSet> {
        ids.into_iter()
            .map(|id| self.index(id).map(|ix| ix.index()))
            .collect()
    }

    /// Convert a node-index subset back into sorted node ids.
    pub fn ids_of(&self, subset: &BitSet) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = subset
            .iter()
            .filter_map(|i| self.graph.node_weight(NodeIndex::new(i)))
            .map(|s| s.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Borrow the subgraph induced by `subset`.
    pub fn induced_subgraph(&self, subset: &BitSet) -> SubgraphView<'_> {
        let mut nodes = subset.clone();
        nodes.intersect_with(&self.all_nodes());
        SubgraphView {
            parent: self,
            nodes,
        }
    }

    /// Return `true` iff `subset` induces a connected subgraph. A single node
    /// counts as connected; callers that want to exclude isolated nodes check
    /// [`TypedGraph::degree`] themselves.
    pub fn is_connected(&self, subset: &BitSet) -> bool {
        is_subset_connected(&self.graph, subset)
    }

    /// Partition the nodes into connected components.
    pub fn components(&self) -> Vec<BitSet> {
        connected_components(&self.graph)
    }

    /// Return an owned copy of this graph with `edges` added.
    ///
    /// Fails if an endpoint is missing or the pair is already bonded with a
    /// different type.
    pub fn with_edges_added(&self, edges: impl IntoIterator<Item = TypedEdge>) -> Result<Self> {
        let mut graph = self.graph.clone();
        for (u, v, kind) in edges {
            let (a, b) = (self.index(u)?, self.index(v)?);
            match graph.find_edge(a, b) {
                Some(e) if graph[e] != kind => {
                    return Err(NetworkError::invalid_graph(format!(
                        "edge ({u}, {v}) already has type {}, cannot add type {kind}",
                        graph[e]
                    )));
                }
                Some(_) => {}
                None if a == b => {
                    return Err(NetworkError::invalid_graph(format!("self-loop on node {u}")));
                }
                None => {
                    graph.add_edge(a, b, kind);
                }
            }
        }
        Ok(Self::from_graph(graph))
    }

    /// Return an owned copy of this graph with `edges` removed. Edges whose
    /// type does not match the stored bond are left in place.
    pub fn with_edges_removed(&self, edges: impl IntoIterator<Item = TypedEdge>) -> Result<Self> {
        let mut doomed = BTreeSet::new();
        for (u, v, kind) in edges {
            let (a, b) = (self.index(u)?, self.index(v)?);
            if let Some(e) = self.graph.find_edge(a, b) {
                if self.graph[e] == kind {
                    doomed.insert(e);
                }
            }
        }
        // Rebuild rather than `remove_edge`, which would reshuffle indices.
        let graph = self.graph.filter_map(
            |_, site| Some(site.clone()),
            |e, kind| (!doomed.contains(&e)).then(|| kind.clone()),
        );
        Ok(Self::from_graph(graph))
    }
}

/// A read-only view of the subgraph of a [`TypedGraph`] induced by a node
/// subset. Nothing is copied until [`SubgraphView::to_graph`] is called.
#[derive(Debug, Clone)]
pub struct SubgraphView<'a> {
    parent: &'a TypedGraph,
    nodes: BitSet,
}

impl<'a> SubgraphView<'a> {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_connected(&self) -> bool {
        self.parent.is_connected(&self.nodes)
    }

    /// Iterate over the parent's edges with both endpoints in the view.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &'a BondType)> + '_ {
        let g = &self.parent.graph;
        g.edge_references()
            .filter(move |e| {
                self.nodes.contains(e.source().index()) && self.nodes.contains(e.target().index())
            })
            .map(move |e| (g[e.source()].id, g[e.target()].id, e.weight()))
    }

    /// Copy the view into an owned graph with dense node indices. Node ids and
    /// the parent's node order are preserved.
    pub fn to_graph(&self) -> TypedGraph {
        let graph = self.parent.graph.filter_map(
            |ix, site| self.nodes.contains(ix.index()).then(|| site.clone()),
            |_, kind| Some(kind.clone()),
        );
        TypedGraph::from_graph(graph)
    }
}

/// Incrementally collects nodes and edges, validating everything in
/// [`GraphBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<(NodeId, SiteType)>,
    edges: Vec<TypedEdge>,
}

impl GraphBuilder {
    pub fn node(mut self, id: NodeId, kind: impl Into<SiteType>) -> Self {
        self.nodes.push((id, kind.into()));
        self
    }

    pub fn edge(mut self, u: NodeId, v: NodeId, kind: impl Into<BondType>) -> Self {
        self.edges.push((u, v, kind.into()));
        self
    }

    /// Validate and build the graph.
    ///
    /// Redeclaring a node or an edge with the same type is a no-op;
    /// redeclaring it with a different type, referencing an undeclared node,
    /// or bonding a node to itself is an [`NetworkError::InvalidGraph`].
    pub fn build(self) -> Result<TypedGraph> {
        let mut graph = TGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index_of = BTreeMap::<NodeId, NodeIndex<Index>>::new();

        for (id, kind) in self.nodes {
            if let Some(&ix) = index_of.get(&id) {
                if graph[ix].kind != kind {
                    return Err(NetworkError::invalid_graph(format!(
                        "node {id} declared with types {} and {kind}",
                        graph[ix].kind
                    )));
                }
                continue;
            }
            index_of.insert(id, graph.add_node(Site::new(id, kind)));
        }

        for (u, v, kind) in self.edges {
            let missing = |id| {
                NetworkError::invalid_graph(format!("edge ({u}, {v}) references unknown node {id}"))
            };
            let a = *index_of.get(&u).ok_or_else(|| missing(u))?;
            let b = *index_of.get(&v).ok_or_else(|| missing(v))?;
            if a == b {
                return Err(NetworkError::invalid_graph(format!("self-loop on node {u}")));
            }
            match graph.find_edge(a, b) {
                Some(e) if graph[e] != kind => {
                    return Err(NetworkError::invalid_graph(format!(
                        "edge ({u}, {v}) declared with types {} and {kind}",
                        graph[e]
                    )));
                }
                Some(_) => {}
                None => {
                    graph.add_edge(a, b, kind);
                }
            }
        }

        Ok(TypedGraph { graph, index_of })
    }
}
