//! Canonical signatures and exact isomorphism tests for typed graphs.
//!
//! A [`Signature`] is a Weisfeiler-Lehman style color-refinement hash: every
//! node starts with a color derived from its site type, and in each round its
//! color is rehashed together with the sorted multiset of `(bond type,
//! neighbor color)` pairs. The per-round color histograms are folded into one
//! BLAKE3 digest. Isomorphic graphs always get equal signatures, but distinct
//! graphs may collide, so [`is_isomorphic`] is the authority wherever a false
//! positive would corrupt results.
//!
//! Only types and topology enter the hash; node ids, insertion order, and
//! process state do not, so signatures agree across workers and runs.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Debug, Display},
    hash::Hash,
};

use petgraph::{algo::is_isomorphic_matching, visit::EdgeRef};

use crate::{
    config::DedupMode,
    graph::{BondType, Site, TypedGraph},
};

/// Number of refinement rounds used unless configured otherwise.
pub const DEFAULT_ROUNDS: usize = 3;

/// Bumped whenever the hashing scheme changes, so stale signatures never
/// compare equal to fresh ones.
const SCHEME: &[u8] = b"typed-wl/1";

type Color = [u8; 32];

/// A type-aware structural hash of a [`TypedGraph`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature([u8; 32]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Return the first 16 hex digits, enough to tell signatures apart in
    /// logs and tables.
    pub fn short(&self) -> String {
        self.to_string()[..16].to_string()
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.short())
    }
}

/// Compute the signature of `g` using `rounds` refinement rounds.
pub fn signature(g: &TypedGraph, rounds: usize) -> Signature {
    let graph = g.graph();

    let mut colors: Vec<Color> = graph
        .node_weights()
        .map(|site| {
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"site");
            update_str(&mut hasher, site.kind().as_str());
            *hasher.finalize().as_bytes()
        })
        .collect();

    let mut summary = blake3::Hasher::new();
    summary.update(SCHEME);
    fold_histogram(&mut summary, 0, &colors);

    for round in 1..=rounds {
        colors = graph
            .node_indices()
            .map(|v| {
                let mut neighborhood: Vec<(&BondType, &Color)> = graph
                    .edges(v)
                    .map(|e| {
                        let other = if e.source() == v {
                            e.target()
                        } else {
                            e.source()
                        };
                        (e.weight(), &colors[other.index()])
                    })
                    .collect();
                neighborhood.sort();

                let mut hasher = blake3::Hasher::new();
                hasher.update(&colors[v.index()]);
                for (bond, color) in neighborhood {
                    update_str(&mut hasher, bond.as_str());
                    hasher.update(color);
                }
                *hasher.finalize().as_bytes()
            })
            .collect();
        fold_histogram(&mut summary, round, &colors);
    }

    Signature(*summary.finalize().as_bytes())
}

/// Feed a length-prefixed string so that adjacent labels cannot run together.
fn update_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Feed the sorted color histogram of one round.
fn fold_histogram(summary: &mut blake3::Hasher, round: usize, colors: &[Color]) {
    let mut histogram = BTreeMap::<&Color, u64>::new();
    for c in colors {
        *histogram.entry(c).or_default() += 1;
    }
    summary.update(&(round as u64).to_le_bytes());
    summary.update(&(histogram.len() as u64).to_le_bytes());
    for (color, count) in histogram {
        summary.update(color);
        summary.update(&count.to_le_bytes());
    }
}

/// Exact type-respecting isomorphism test: node types must match one-to-one
/// and mapped edges must carry equal bond types.
pub fn is_isomorphic(g: &TypedGraph, h: &TypedGraph) -> bool {
    if g.node_count() != h.node_count()
        || g.edge_count() != h.edge_count()
        || g.composition() != h.composition()
    {
        return false;
    }
    is_isomorphic_matching(
        g.graph(),
        h.graph(),
        |a: &Site, b: &Site| a.kind() == b.kind(),
        |a: &BondType, b: &BondType| a == b,
    )
}

/// Equivalence classes keyed by a signature-like key.
///
/// In [`DedupMode::Signature`] a key seen before is a duplicate. In
/// [`DedupMode::Verified`] the caller's `same` check must also confirm the
/// match against one of the members already filed under that key; otherwise
/// the candidate opens a new class despite the key collision.
#[derive(Debug)]
pub(crate) struct Classes<K> {
    mode: DedupMode,
    buckets: HashMap<K, Vec<usize>>,
    collisions: usize,
}

impl<K: Hash + Eq> Classes<K> {
    pub fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            buckets: HashMap::new(),
            collisions: 0,
        }
    }

    /// File `member` under `key` unless it duplicates an existing member.
    /// Returns `true` iff `member` starts a new class.
    pub fn admit(&mut self, key: K, member: usize, mut same: impl FnMut(usize) -> bool) -> bool {
        let bucket = self.buckets.entry(key).or_default();
        let duplicate = match self.mode {
            DedupMode::Signature => !bucket.is_empty(),
            DedupMode::Verified => {
                let duplicate = bucket.iter().any(|&m| same(m));
                if !duplicate && !bucket.is_empty() {
                    self.collisions += 1;
                }
                duplicate
            }
        };
        if !duplicate {
            bucket.push(member);
        }
        !duplicate
    }

    /// Number of key collisions that exact verification split apart.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}
