//! Reference structural graphs: fully bound assemblies used as inputs for
//! examples, tests, and benchmarks.

use crate::{
    error::{NetworkError, Result},
    graph::{GraphBuilder, TypedGraph},
};

type Constructor = fn() -> Result<TypedGraph>;

const REGISTRY: [(&str, Constructor); 4] = [
    ("5l93", graph_5l93),
    ("8y7s", graph_8y7s),
    ("asymmetry_4mer", graph_asymmetry_4mer),
    ("hetero_8mer", graph_hetero_8mer),
];

/// Names of all registered reference graphs.
pub fn names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

/// Build the reference graph registered under `name`.
pub fn get(name: &str) -> Result<TypedGraph> {
    match REGISTRY.iter().find(|(n, _)| *n == name) {
        Some((_, build)) => build(),
        None => Err(NetworkError::UnknownReference {
            name: name.to_string(),
            available: names().join(", "),
        }),
    }
}

/// Hexameric ring of 18 `A` sites: six ring sites joined by `hex` bonds, each
/// carrying a `tri` triangle whose outer site reaches the next ring site
/// through a `di` bond.
pub fn graph_5l93() -> Result<TypedGraph> {
    let mut b = (0..18).fold(TypedGraph::builder(), |b, i| b.node(i, "A"));
    for i in 0..6 {
        let (ring, next) = (i, (i + 1) % 6);
        let (outer, inner) = (6 + 2 * i, 7 + 2 * i);
        b = b
            .edge(ring, next, "hex")
            .edge(outer, inner, "tri")
            .edge(inner, ring, "tri")
            .edge(ring, outer, "tri")
            .edge(inner, next, "di");
    }
    b.build()
}

/// Tetrahedron of four `X` sites where opposite edges share a bond type.
pub fn graph_8y7s() -> Result<TypedGraph> {
    (0..4)
        .fold(TypedGraph::builder(), |b, i| b.node(i, "X"))
        .edge(0, 1, "a")
        .edge(0, 2, "b")
        .edge(0, 3, "c")
        .edge(2, 3, "a")
        .edge(1, 3, "b")
        .edge(1, 2, "c")
        .build()
}

/// Four sites `A B C A` with a chord from the middle `B` to the second `A`.
pub fn graph_asymmetry_4mer() -> Result<TypedGraph> {
    TypedGraph::builder()
        .node(0, "A")
        .node(1, "B")
        .node(2, "C")
        .node(3, "A")
        .edge(0, 1, "ab")
        .edge(1, 2, "bc")
        .edge(2, 3, "ca")
        .edge(3, 1, "ab")
        .build()
}

/// Eight distinct sites `A`..`H` in a ring with distinct bond types.
pub fn graph_hetero_8mer() -> Result<TypedGraph> {
    const SITES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];
    let b: GraphBuilder = SITES
        .iter()
        .enumerate()
        .fold(TypedGraph::builder(), |b, (i, s)| b.node(i as u32, *s));
    (0..8u32)
        .fold(b, |b, i| {
            let j = (i + 1) % 8;
            let bond = format!(
                "{}{}",
                SITES[i as usize].to_lowercase(),
                SITES[j as usize].to_lowercase()
            );
            b.edge(i, j, bond)
        })
        .build()
}
