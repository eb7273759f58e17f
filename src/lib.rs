//! Derive the reaction network of a self-assembling complex from its fully
//! bound structure: every connected sub-assembly (species), every way one
//! species splits into two, and every bond rearrangement between species of
//! the same composition.
//!
//! # Example
//!
//! ```
//! use reaction_network::{config::Config, network::ReactionNetwork, reference};
//!
//! let graph = reference::get("8y7s")?;
//! let network = ReactionNetwork::build(&graph, &Config::default())?;
//! assert_eq!(network.species().len(), 6);
//! # Ok::<(), reaction_network::error::NetworkError>(())
//! ```

// Typed graph storage, induced views, owned edits
pub mod graph;

// Data IO
pub mod loader;
pub mod export;

// Bundled reference structures
pub mod reference;

// Similarity signatures and exact isomorphism
pub mod canonize;

// Species enumeration
pub mod enumerate;

// Reaction derivation
pub mod split;
pub mod transform;

// Worker pool for per-species work
pub mod dispatch;

// Run configuration and errors
pub mod config;
pub mod error;

// The whole pipeline
pub mod network;

// Utility functions
mod utils;

// Python library
#[cfg(feature = "python")]
pub mod python;
