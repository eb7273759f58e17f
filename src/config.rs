//! Knobs for a reaction-network run: deduplication strictness, parallelism,
//! hash rounds, and resource budgets.

use std::time::{Duration, Instant};

use clap::ValueEnum;

use crate::{
    canonize::DEFAULT_ROUNDS,
    error::{NetworkError, Result},
};

/// How signature matches are treated when deduplicating species and splits.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum DedupMode {
    /// Equal signatures mean isomorphic graphs. Fast, but a hash collision
    /// silently merges two distinct species.
    #[default]
    Signature,
    /// Confirm every signature match with an exact isomorphism test.
    Verified,
}

/// Parallelization strategy for per-species derivation work.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum ParallelMode {
    /// Run everything on the calling thread.
    None,
    /// Fan per-species work out over a fixed-size worker pool.
    #[default]
    Always,
}

/// Upper limits on the work a run may do. `None` means unbounded.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Budget {
    /// Largest connected component of the reference graph to enumerate
    /// (each costs 2^size subsets).
    pub max_component_size: Option<usize>,
    /// Most distinct species enumeration may produce.
    pub max_species: Option<usize>,
    /// Most same-composition species pairs transformation search may test.
    pub max_pairs: Option<usize>,
    /// Wall-clock limit for the whole run.
    pub time_limit: Option<Duration>,
}

impl Budget {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Start the clock for this budget.
    pub fn start(&self) -> Deadline {
        Deadline {
            at: self.time_limit.map(|limit| (Instant::now() + limit, limit)),
        }
    }
}

/// A running wall-clock budget. Cheap to copy into workers.
#[derive(Copy, Clone, Debug)]
pub struct Deadline {
    at: Option<(Instant, Duration)>,
}

impl Deadline {
    pub fn none() -> Self {
        Self { at: None }
    }

    /// Fail with [`NetworkError::ResourceBudgetExceeded`] once past the
    /// deadline.
    pub fn check(&self, stage: &str) -> Result<()> {
        match self.at {
            Some((at, limit)) if Instant::now() > at => Err(NetworkError::budget(format!(
                "{stage} exceeded the time limit of {limit:?}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Configuration of a reaction-network run.
#[derive(Clone, Debug)]
pub struct Config {
    pub dedup: DedupMode,
    pub parallel: ParallelMode,
    /// Worker pool size; `None` uses one worker per core.
    pub workers: Option<usize>,
    /// Refinement rounds of the signature hash.
    pub rounds: usize,
    pub budget: Budget,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dedup: DedupMode::default(),
            parallel: ParallelMode::default(),
            workers: None,
            rounds: DEFAULT_ROUNDS,
            budget: Budget::default(),
        }
    }
}

impl Config {
    /// A sequential configuration, handy for tests and small graphs.
    pub fn serial() -> Self {
        Self {
            parallel: ParallelMode::None,
            ..Self::default()
        }
    }

    pub fn with_dedup(mut self, dedup: DedupMode) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelMode) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }
}
