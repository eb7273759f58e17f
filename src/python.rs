use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{
    config::{Config, DedupMode},
    error::NetworkError,
    loader::parse_graph_str,
    network::ReactionNetwork,
    reference,
};

impl From<NetworkError> for PyErr {
    fn from(err: NetworkError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn config(verified: bool) -> Config {
    let dedup = if verified {
        DedupMode::Verified
    } else {
        DedupMode::Signature
    };
    Config::default().with_dedup(dedup)
}

/// Count the species, split reactions, and transformations of a graph given
/// in the text edge-list format.
#[pyfunction]
#[pyo3(signature = (graph, verified = false))]
fn reaction_counts(graph: String, verified: bool) -> PyResult<(usize, usize, usize)> {
    let reference = parse_graph_str(&graph)?;
    let network = ReactionNetwork::build(&reference, &config(verified))?;
    Ok((
        network.species().len(),
        network.splits().len(),
        network.transformations().len(),
    ))
}

/// Sizes of the distinct species of a graph, in discovery order.
#[pyfunction]
#[pyo3(signature = (graph, verified = false))]
fn species_sizes(graph: String, verified: bool) -> PyResult<Vec<usize>> {
    let reference = parse_graph_str(&graph)?;
    let species = crate::enumerate::enumerate_species(&reference, &config(verified))?;
    Ok(species.iter().map(|s| s.node_count()).collect())
}

/// Names of the bundled reference graphs.
#[pyfunction]
fn reference_graphs() -> Vec<&'static str> {
    reference::names()
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
#[pyo3(name = "reaction_network")]
fn _reaction_network(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(reaction_counts, m)?)?;
    m.add_function(wrap_pyfunction!(species_sizes, m)?)?;
    m.add_function(wrap_pyfunction!(reference_graphs, m)?)?;

    Ok(())
}
