//! Fan independent per-item work out over a fixed pool of workers.
//!
//! Workers only ever see shared references to the items, so no mutable state
//! crosses a worker boundary. Results come back in item order regardless of
//! which worker finished first, which keeps output identical for any pool
//! size.

use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use tracing::debug;

use crate::{config::ParallelMode, error::Result};

/// Run `task(index, item)` for every item and return the results in item
/// order. The first error (by item order) is returned if any task fails.
pub fn dispatch<T, R, F>(
    items: &[T],
    mode: ParallelMode,
    workers: Option<usize>,
    task: F,
) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> Result<R> + Sync + Send,
{
    match mode {
        ParallelMode::None => items
            .iter()
            .enumerate()
            .map(|(i, item)| task(i, item))
            .collect(),
        ParallelMode::Always => {
            let mut builder = ThreadPoolBuilder::new();
            if let Some(n) = workers {
                builder = builder.num_threads(n);
            }
            let pool = builder.build()?;
            debug!(
                workers = pool.current_num_threads(),
                items = items.len(),
                "dispatching"
            );
            pool.install(|| {
                items
                    .par_iter()
                    .enumerate()
                    .map(|(i, item)| task(i, item))
                    .collect()
            })
        }
    }
}

/// Like [`dispatch`], but concatenates the per-item result lists.
pub fn dispatch_flat<T, R, F>(
    items: &[T],
    mode: ParallelMode,
    workers: Option<usize>,
    task: F,
) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> Result<Vec<R>> + Sync + Send,
{
    Ok(dispatch(items, mode, workers, task)?
        .into_iter()
        .flatten()
        .collect())
}
