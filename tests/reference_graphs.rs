//! Test the reaction network of each bundled reference graph.

use std::collections::{BTreeMap, HashSet};

use reaction_network::{
    canonize::is_isomorphic,
    config::{Config, DedupMode, ParallelMode},
    enumerate::enumerate_species,
    error::NetworkError,
    graph::{NodeId, TypedEdge, TypedGraph},
    loader::parse_graph_str,
    network::ReactionNetwork,
    reference,
    split::split_reactions,
    transform::{compare, CanonicalEdge, CanonicalForm, Direction},
};

fn configs() -> Vec<Config> {
    let mut configs = Vec::new();
    for dedup in [DedupMode::Signature, DedupMode::Verified] {
        configs.push(Config::serial().with_dedup(dedup));
        configs.push(Config::default().with_dedup(dedup).with_workers(4));
    }
    configs
}

fn test_species_count(name: &str, expected: usize) {
    let g = reference::get(name).unwrap();
    for config in configs() {
        let species = enumerate_species(&g, &config).unwrap();
        assert_eq!(species.len(), expected, "{name} with {config:?}");
    }
}

#[test]
fn species_8y7s() {
    test_species_count("8y7s", 6);
}

#[test]
fn species_hetero_8mer() {
    test_species_count("hetero_8mer", 57);
}

#[test]
fn species_asymmetry_4mer() {
    test_species_count("asymmetry_4mer", 10);
}

#[test]
fn singleton_species_are_bonded_sites() {
    let g = reference::get("8y7s").unwrap();
    let species = enumerate_species(&g, &Config::serial()).unwrap();
    let singletons: Vec<_> = species.iter().filter(|s| s.node_count() == 1).collect();
    assert_eq!(singletons.len(), 1);
    for s in singletons {
        assert!(g.degree(s.ids()[0]).unwrap() >= 1);
    }

    // An isolated site next to a dimer is never a species on its own.
    let g = parse_graph_str("node 0 A\nnode 1 A\nedge 0 1 aa\nnode 2 Z\n").unwrap();
    let species = enumerate_species(&g, &Config::serial()).unwrap();
    assert!(species.iter().all(|s| !s.ids().contains(&2)));
}

#[test]
fn network_sizes() {
    let expected = [
        ("8y7s", 6, 10, 0),
        ("asymmetry_4mer", 10, 13, 1),
        ("hetero_8mer", 57, 196, 0),
    ];
    for (name, species, splits, transformations) in expected {
        let g = reference::get(name).unwrap();
        for config in configs() {
            let network = ReactionNetwork::build(&g, &config).unwrap();
            assert_eq!(network.species().len(), species, "{name}");
            assert_eq!(network.splits().len(), splits, "{name}");
            assert_eq!(network.transformations().len(), transformations, "{name}");
        }
    }
}

#[test]
fn splits_partition_their_parent() {
    for name in ["8y7s", "asymmetry_4mer", "hetero_8mer"] {
        let g = reference::get(name).unwrap();
        let network = ReactionNetwork::build(&g, &Config::serial()).unwrap();
        for split in network.splits() {
            let parent = &network.species()[split.parent()];
            let pg = parent.graph();

            let a: HashSet<NodeId> = split.fragment_a().iter().copied().collect();
            let b: HashSet<NodeId> = split.fragment_b().iter().copied().collect();
            assert!(a.is_disjoint(&b));
            let mut union: Vec<_> = a.union(&b).copied().collect();
            union.sort_unstable();
            assert_eq!(union, parent.ids());

            assert!(pg.is_connected(&pg.subset_of(a.iter().copied()).unwrap()));
            assert!(pg.is_connected(&pg.subset_of(b.iter().copied()).unwrap()));

            let crossing = pg
                .edges()
                .filter(|(u, v, _)| a.contains(u) != a.contains(v))
                .count();
            assert_eq!(split.broken_edges().len(), crossing);
        }
    }
}

#[test]
fn splits_are_unique_per_species() {
    for name in ["8y7s", "asymmetry_4mer", "hetero_8mer"] {
        let g = reference::get(name).unwrap();
        let network = ReactionNetwork::build(&g, &Config::serial()).unwrap();
        let mut seen = HashSet::new();
        for split in network.splits() {
            assert!(
                seen.insert((split.parent(), split.key())),
                "{name}: duplicate split"
            );
        }
    }
}

/// Apply `delta` to the canonical graph of `form`, naming sites by label.
fn apply(form: &CanonicalForm, direction: Direction, delta: &[CanonicalEdge]) -> TypedGraph {
    let id: BTreeMap<_, _> = form
        .labels()
        .iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), i as NodeId))
        .collect();
    let edits: Vec<TypedEdge> = delta
        .iter()
        .map(|e| (id[&e.u], id[&e.v], e.kind.clone()))
        .collect();
    match direction {
        Direction::Added => form.graph().with_edges_added(edits).unwrap(),
        Direction::Removed => form.graph().with_edges_removed(edits).unwrap(),
    }
}

#[test]
fn transformation_delta_reaches_the_product() {
    let g = reference::get("asymmetry_4mer").unwrap();
    let network = ReactionNetwork::build(&g, &Config::serial()).unwrap();

    let t = &network.transformations()[0];
    assert_eq!((t.species_a(), t.species_b()), (6, 8));
    assert_eq!(t.direction(), Direction::Added);
    let delta: Vec<String> = t.delta().iter().map(ToString::to_string).collect();
    assert_eq!(delta, vec!["(A0, C0, ca)"]);

    for t in network.transformations() {
        let species = network.species();
        let a = CanonicalForm::new(species[t.species_a()].graph()).unwrap();
        let b = CanonicalForm::new(species[t.species_b()].graph()).unwrap();
        assert!(is_isomorphic(&apply(&a, t.direction(), t.delta()), b.graph()));

        let swapped = compare(t.species_b(), &b, t.species_a(), &a).unwrap().unwrap();
        assert_eq!(swapped.direction(), t.direction().reversed());
        assert_eq!(swapped.delta(), t.delta());
        let back = apply(&b, swapped.direction(), swapped.delta());
        assert!(is_isomorphic(&back, a.graph()));
    }
}

#[test]
fn splits_do_not_depend_on_worker_count() {
    let g = reference::get("hetero_8mer").unwrap();
    let species = enumerate_species(&g, &Config::serial()).unwrap();

    let serial: Vec<_> = species
        .iter()
        .enumerate()
        .flat_map(|(i, s)| split_reactions(i, s, &Config::serial()).unwrap())
        .collect();

    for workers in [1, 2, 8] {
        let config = Config::default()
            .with_parallel(ParallelMode::Always)
            .with_workers(workers);
        let network = ReactionNetwork::build(&g, &config).unwrap();
        assert_eq!(network.splits(), serial.as_slice(), "{workers} workers");
    }
}

#[test]
fn text_format_round_trip() {
    let g = reference::get("asymmetry_4mer").unwrap();
    let mut text = String::from("# asymmetry_4mer\n");
    for (id, kind) in g.nodes() {
        text.push_str(&format!("node {id} {kind}\n"));
    }
    for (u, v, kind) in g.edges() {
        text.push_str(&format!("edge {u} {v} {kind}\n"));
    }
    let parsed = parse_graph_str(&text).unwrap();
    assert!(is_isomorphic(&g, &parsed));
    assert_eq!(parsed.ids(), g.ids());
}

#[test]
fn budgets_fail_fast() {
    let g = reference::get("5l93").unwrap();
    let mut config = Config::serial();
    config.budget.max_component_size = Some(12);
    assert!(matches!(
        ReactionNetwork::build(&g, &config),
        Err(NetworkError::ResourceBudgetExceeded(_))
    ));

    let mut config = Config::serial();
    config.budget.max_species = Some(100);
    assert!(matches!(
        ReactionNetwork::build(&g, &config),
        Err(NetworkError::ResourceBudgetExceeded(_))
    ));
}
