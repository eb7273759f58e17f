use proptest::{collection::vec, prelude::*};

use reaction_network::{
    canonize::{is_isomorphic, signature, DEFAULT_ROUNDS},
    config::Config,
    enumerate::enumerate_species,
    graph::{NodeId, TypedGraph},
};

/// Node types, one optional bond per unordered node pair, and a permutation
/// of the nodes.
type Raw = (Vec<&'static str>, Vec<Option<&'static str>>, Vec<usize>);

fn arb_raw(max_nodes: usize) -> impl Strategy<Value = Raw> {
    (1..=max_nodes).prop_flat_map(|n| {
        (
            vec(prop::sample::select(vec!["A", "B", "C"]), n),
            vec(
                prop::option::of(prop::sample::select(vec!["x", "y"])),
                n * (n - 1) / 2,
            ),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
    })
}

fn pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}

fn build(raw: &Raw) -> TypedGraph {
    let (types, bonds, _) = raw;
    let mut b = TypedGraph::builder();
    for (i, t) in types.iter().enumerate() {
        b = b.node(i as NodeId, *t);
    }
    for ((i, j), bond) in pairs(types.len()).zip(bonds) {
        if let Some(bond) = bond {
            b = b.edge(i as NodeId, j as NodeId, *bond);
        }
    }
    b.build().unwrap()
}

/// The same graph with node `i` renamed to `7 * perm[i] + 1`, nodes declared
/// in permuted order, and edges declared back to front.
fn build_relabeled(raw: &Raw) -> TypedGraph {
    let (types, bonds, perm) = raw;
    let id = |i: usize| (7 * perm[i] + 1) as NodeId;

    let mut order: Vec<usize> = (0..types.len()).collect();
    order.sort_by_key(|&i| perm[i]);

    let mut b = TypedGraph::builder();
    for i in order {
        b = b.node(id(i), types[i]);
    }
    let edges: Vec<_> = pairs(types.len()).zip(bonds).collect();
    for ((i, j), bond) in edges.into_iter().rev() {
        if let Some(bond) = bond {
            b = b.edge(id(j), id(i), *bond);
        }
    }
    b.build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn relabeling_preserves_signature(raw in arb_raw(8)) {
        let g = build(&raw);
        let h = build_relabeled(&raw);
        prop_assert_eq!(
            signature(&g, DEFAULT_ROUNDS),
            signature(&h, DEFAULT_ROUNDS)
        );
        prop_assert!(is_isomorphic(&g, &h));
    }

    #[test]
    fn new_site_type_changes_signature(raw in arb_raw(8)) {
        let g = build(&raw);
        let mut changed = raw.clone();
        changed.0[0] = "Z";
        let h = build(&changed);
        prop_assert_ne!(
            signature(&g, DEFAULT_ROUNDS),
            signature(&h, DEFAULT_ROUNDS)
        );
        prop_assert!(!is_isomorphic(&g, &h));
    }

    #[test]
    fn relabeling_preserves_species(raw in arb_raw(6)) {
        let config = Config::serial();
        let a = enumerate_species(&build(&raw), &config).unwrap();
        let b = enumerate_species(&build_relabeled(&raw), &config).unwrap();
        prop_assert_eq!(a.len(), b.len());

        let mut sa: Vec<_> = a.iter().map(|s| s.signature()).collect();
        let mut sb: Vec<_> = b.iter().map(|s| s.signature()).collect();
        sa.sort();
        sb.sort();
        prop_assert_eq!(sa, sb);
    }
}
