//! The whole pipeline: reference graph → species → split reactions and
//! transformations.

use std::time::Instant;

use tracing::{info, instrument};

use crate::{
    config::Config,
    dispatch::dispatch_flat,
    enumerate::{enumerate_species_until, Species},
    error::Result,
    graph::TypedGraph,
    split::{split_reactions_until, SplitReaction},
    transform::{transformations_until, Transformation},
};

/// Species and reactions derived from one reference graph.
#[derive(Debug, Clone)]
pub struct ReactionNetwork {
    species: Vec<Species>,
    splits: Vec<SplitReaction>,
    transformations: Vec<Transformation>,
}

impl ReactionNetwork {
    /// Enumerate the species of `reference` and derive all reactions
    /// between them. The run's time budget covers all three stages.
    #[instrument(
        skip_all,
        fields(nodes = reference.node_count(), edges = reference.edge_count())
    )]
    pub fn build(reference: &TypedGraph, config: &Config) -> Result<Self> {
        let deadline = config.budget.start();

        let start = Instant::now();
        let species = enumerate_species_until(reference, config, &deadline)?;
        let enumerated = start.elapsed();

        let splits = dispatch_flat(&species, config.parallel, config.workers, |i, s| {
            split_reactions_until(i, s, config, &deadline)
        })?;
        let split_done = start.elapsed();

        let transformations = transformations_until(&species, config, &deadline)?;
        let total = start.elapsed();

        info!(
            species = species.len(),
            splits = splits.len(),
            transformations = transformations.len(),
            ?enumerated,
            splitting = ?(split_done - enumerated),
            transforming = ?(total - split_done),
            "built reaction network"
        );

        Ok(Self {
            species,
            splits,
            transformations,
        })
    }

    /// Species in discovery order; reactions refer to them by index.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Split reactions, grouped by parent species in discovery order.
    pub fn splits(&self) -> &[SplitReaction] {
        &self.splits
    }

    /// Transformations, ordered by species pair.
    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }
}
