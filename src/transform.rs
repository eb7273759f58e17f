//! Bond-rearrangement reactions between species of equal composition.
//!
//! Both species are renamed by type occurrence (the i-th site of type `T`, in
//! node order, becomes `T<i>`), which makes same-composition graphs directly
//! comparable edge by edge. If one renamed edge set strictly contains the
//! other, the difference is a candidate delta; it is applied to a private
//! copy of the first graph and accepted only if the result is exactly
//! isomorphic to the second.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use petgraph::visit::EdgeRef;
use tracing::{info, instrument, warn};

use crate::{
    canonize::is_isomorphic,
    config::{Config, Deadline},
    dispatch::dispatch_flat,
    enumerate::Species,
    error::{NetworkError, Result},
    graph::{BondType, NodeId, SiteType, TypedEdge, TypedGraph},
};

/// Whether a transformation forms or breaks bonds, read from species A to B.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
    Added,
    Removed,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Added => Direction::Removed,
            Direction::Removed => Direction::Added,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Added => write!(f, "added"),
            Direction::Removed => write!(f, "removed"),
        }
    }
}

/// The `occurrence`-th site of type `kind`, displayed as `<kind><occurrence>`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CanonicalLabel {
    kind: SiteType,
    occurrence: usize,
}

impl CanonicalLabel {
    pub fn kind(&self) -> &SiteType {
        &self.kind
    }

    pub fn occurrence(&self) -> usize {
        self.occurrence
    }
}

impl Display for CanonicalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind, self.occurrence)
    }
}

/// An undirected bond between canonical labels, smaller label first.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CanonicalEdge {
    pub u: CanonicalLabel,
    pub v: CanonicalLabel,
    pub kind: BondType,
}

impl CanonicalEdge {
    fn new(a: CanonicalLabel, b: CanonicalLabel, kind: BondType) -> Self {
        let (u, v) = if a <= b { (a, b) } else { (b, a) };
        Self { u, v, kind }
    }
}

impl Display for CanonicalEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.u, self.v, self.kind)
    }
}

/// A bond rearrangement turning species A into species B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    species_a: usize,
    species_b: usize,
    direction: Direction,
    delta: Vec<CanonicalEdge>,
}

impl Transformation {
    pub fn species_a(&self) -> usize {
        self.species_a
    }

    pub fn species_b(&self) -> usize {
        self.species_b
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The bonds formed (or broken) going from A to B, sorted.
    pub fn delta(&self) -> &[CanonicalEdge] {
        &self.delta
    }
}

/// A species graph renamed by type occurrence.
#[derive(Debug, Clone)]
pub struct CanonicalForm {
    composition: Vec<SiteType>,
    /// Node `i` of `graph` carries id `i` and label `labels[i]`.
    labels: Vec<CanonicalLabel>,
    ids: BTreeMap<CanonicalLabel, NodeId>,
    graph: TypedGraph,
    edges: BTreeSet<CanonicalEdge>,
}

impl CanonicalForm {
    pub fn new(g: &TypedGraph) -> Result<Self> {
        let mut seen = BTreeMap::<&SiteType, usize>::new();
        let labels: Vec<CanonicalLabel> = g
            .nodes()
            .map(|(_, kind)| {
                let count = seen.entry(kind).or_default();
                let label = CanonicalLabel {
                    kind: kind.clone(),
                    occurrence: *count,
                };
                *count += 1;
                label
            })
            .collect();

        let inner = g.graph();
        let edges: BTreeSet<CanonicalEdge> = inner
            .edge_references()
            .map(|e| {
                CanonicalEdge::new(
                    labels[e.source().index()].clone(),
                    labels[e.target().index()].clone(),
                    e.weight().clone(),
                )
            })
            .collect();

        let graph = TypedGraph::new(
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| (i as NodeId, label.kind.clone())),
            inner.edge_references().map(|e| {
                (
                    e.source().index() as NodeId,
                    e.target().index() as NodeId,
                    e.weight().clone(),
                )
            }),
        )?;

        let ids = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as NodeId))
            .collect();

        Ok(Self {
            composition: g.composition(),
            labels,
            ids,
            graph,
            edges,
        })
    }

    pub fn labels(&self) -> &[CanonicalLabel] {
        &self.labels
    }

    pub fn edges(&self) -> &BTreeSet<CanonicalEdge> {
        &self.edges
    }

    pub fn graph(&self) -> &TypedGraph {
        &self.graph
    }

    fn typed_edges<'a>(
        &'a self,
        delta: &'a [CanonicalEdge],
    ) -> impl Iterator<Item = Result<TypedEdge>> + 'a {
        delta.iter().map(move |e| {
            let id = |label: &CanonicalLabel| {
                self.ids.get(label).copied().ok_or_else(|| {
                    NetworkError::UnsupportedComposition(format!("no site labelled {label}"))
                })
            };
            Ok((id(&e.u)?, id(&e.v)?, e.kind.clone()))
        })
    }
}

/// Try to turn `a` into `b` by only forming or only breaking bonds.
pub fn compare(
    index_a: usize,
    a: &CanonicalForm,
    index_b: usize,
    b: &CanonicalForm,
) -> Result<Option<Transformation>> {
    if a.composition != b.composition {
        return Ok(None);
    }
    if a.labels.len() != b.labels.len() {
        return Err(NetworkError::UnsupportedComposition(format!(
            "species {index_a} and {index_b} share a composition but have {} and {} sites",
            a.labels.len(),
            b.labels.len()
        )));
    }

    let (direction, delta): (Direction, Vec<CanonicalEdge>) =
        if a.edges.len() < b.edges.len() && a.edges.is_subset(&b.edges) {
            (
                Direction::Added,
                b.edges.difference(&a.edges).cloned().collect(),
            )
        } else if a.edges.len() > b.edges.len() && a.edges.is_superset(&b.edges) {
            (
                Direction::Removed,
                a.edges.difference(&b.edges).cloned().collect(),
            )
        } else {
            return Ok(None);
        };

    let edits = a.typed_edges(&delta).collect::<Result<Vec<_>>>()?;
    let trial = match direction {
        Direction::Added => a.graph.with_edges_added(edits)?,
        Direction::Removed => a.graph.with_edges_removed(edits)?,
    };
    if !is_isomorphic(&trial, &b.graph) {
        return Ok(None);
    }

    Ok(Some(Transformation {
        species_a: index_a,
        species_b: index_b,
        direction,
        delta,
    }))
}

/// Return every transformation between pairs of `species`, ordered by the
/// pair's discovery indices.
pub fn transformations(species: &[Species], config: &Config) -> Result<Vec<Transformation>> {
    transformations_until(species, config, &config.budget.start())
}

#[instrument(skip_all, fields(species = species.len()))]
pub(crate) fn transformations_until(
    species: &[Species],
    config: &Config,
    deadline: &Deadline,
) -> Result<Vec<Transformation>> {
    let forms = species
        .iter()
        .map(|s| CanonicalForm::new(s.graph()))
        .collect::<Result<Vec<_>>>()?;

    let mut groups = BTreeMap::<&[SiteType], usize>::new();
    for form in &forms {
        *groups.entry(form.composition.as_slice()).or_default() += 1;
    }
    let pairs: usize = groups.values().map(|k| k * k.saturating_sub(1) / 2).sum();
    if let Some(max) = config.budget.max_pairs {
        if pairs > max {
            warn!(pairs, max, "too many candidate pairs");
            return Err(NetworkError::budget(format!(
                "{pairs} candidate species pairs exceed the limit of {max}"
            )));
        }
    }

    // Rows of the upper triangle are independent, so they go through the
    // dispatcher like any per-species task.
    let found = dispatch_flat(&forms, config.parallel, config.workers, |i, a| {
        deadline.check("transformation search")?;
        let mut row = Vec::new();
        for (j, b) in forms.iter().enumerate().skip(i + 1) {
            if let Some(t) = compare(i, a, j, b)? {
                row.push(t);
            }
        }
        Ok(row)
    })?;

    info!(pairs, transformations = found.len(), "derived transformations");
    Ok(found)
}
