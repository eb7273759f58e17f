//! Tabular export of a reaction network.
//!
//! Each table is written as CSV with a header row. Node-id lists are joined
//! with spaces, edge lists with `;`.

use std::{
    fmt::Display,
    fs::{self, File},
    io,
    path::Path,
};

use csv::Writer;

use crate::{
    enumerate::Species, error::Result, network::ReactionNetwork, split::SplitReaction,
    transform::Transformation,
};

fn join<T: Display>(items: impl IntoIterator<Item = T>, sep: &str) -> String {
    items
        .into_iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// One row per species: discovery index, signature, size, composition,
/// reference node ids, and bonds.
pub fn write_species_csv<W: io::Write>(out: W, species: &[Species]) -> Result<()> {
    let mut w = Writer::from_writer(out);
    w.write_record([
        "species",
        "signature",
        "size",
        "composition",
        "nodes",
        "edges",
    ])?;
    for (i, s) in species.iter().enumerate() {
        let edges = s
            .graph()
            .edges()
            .map(|(u, v, kind)| format!("{u}-{v}:{kind}"));
        w.write_record([
            i.to_string(),
            s.signature().short(),
            s.node_count().to_string(),
            join(s.composition(), " "),
            join(s.ids(), " "),
            join(edges, ";"),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// One row per split reaction: parent species, the two fragments, and the
/// bonds broken between them.
pub fn write_splits_csv<W: io::Write>(out: W, splits: &[SplitReaction]) -> Result<()> {
    let mut w = Writer::from_writer(out);
    w.write_record(["product", "part1", "part2", "bonds_broken"])?;
    for s in splits {
        let broken = s
            .broken_edges()
            .iter()
            .map(|(u, v, kind)| format!("{u}-{v}:{kind}"));
        w.write_record([
            s.parent().to_string(),
            join(s.fragment_a(), " "),
            join(s.fragment_b(), " "),
            join(broken, ";"),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// One row per transformation: the species pair, direction, and edge delta.
pub fn write_transformations_csv<W: io::Write>(
    out: W,
    transformations: &[Transformation],
) -> Result<()> {
    let mut w = Writer::from_writer(out);
    w.write_record(["monomer_1", "monomer_2", "direction", "diff"])?;
    for t in transformations {
        w.write_record([
            t.species_a().to_string(),
            t.species_b().to_string(),
            t.direction().to_string(),
            join(t.delta(), ";"),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Write all three tables of `network` to `species.csv`, `splits.csv`, and
/// `transformations.csv` under `dir`, creating it if needed.
pub fn write_network(dir: &Path, network: &ReactionNetwork) -> Result<()> {
    fs::create_dir_all(dir)?;
    write_species_csv(File::create(dir.join("species.csv"))?, network.species())?;
    write_splits_csv(File::create(dir.join("splits.csv"))?, network.splits())?;
    write_transformations_csv(
        File::create(dir.join("transformations.csv"))?,
        network.transformations(),
    )?;
    Ok(())
}
