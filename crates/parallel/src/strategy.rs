//! Parallel processing strategies

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::collections::HashMap;
#[cfg(feature = "parallel")]
use std::sync::{Arc, Mutex};

/// Processing mode for algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing on the global Rayon pool
    #[default]
    Parallel,
    /// Parallel on a dedicated pool with the given number of workers.
    ///
    /// The pool is built on first use and shared by later runs with the
    /// same worker count.
    ParallelWith(usize),
}

/// Strategy for executing independent work items
pub trait ParallelStrategy {
    /// Map a function over indices and collect results in index order
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;

    /// Run `f` inside this mode's pool.
    ///
    /// Rayon iterators started inside `f` use the dedicated pool for
    /// `ParallelWith`; `Sequential` simply calls `f`.
    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send;
}

impl ProcessingMode {
    /// Whether work may be spread over several threads
    pub fn is_parallel(&self) -> bool {
        cfg!(feature = "parallel") && !matches!(self, ProcessingMode::Sequential)
    }
}

/// Dedicated pools, built once per worker count and kept for the process lifetime
#[cfg(feature = "parallel")]
static POOLS: std::sync::OnceLock<Mutex<HashMap<usize, Arc<rayon::ThreadPool>>>> =
    std::sync::OnceLock::new();

/// Pool with `threads` workers, or `None` if it cannot be built
#[cfg(feature = "parallel")]
fn pool(threads: usize) -> Option<Arc<rayon::ThreadPool>> {
    let pools = POOLS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut pools = pools.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(pool) = pools.get(&threads) {
        return Some(Arc::clone(pool));
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => {
            tracing::debug!(threads, "built worker pool");
            let pool = Arc::new(pool);
            pools.insert(threads, Arc::clone(&pool));
            Some(pool)
        }
        Err(e) => {
            tracing::warn!("cannot build a {threads}-thread pool ({e}), using the global pool");
            None
        }
    }
}

impl ParallelStrategy for ProcessingMode {
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            match self {
                ProcessingMode::Sequential => range.map(f).collect(),
                ProcessingMode::Parallel => range.into_par_iter().map(f).collect(),
                ProcessingMode::ParallelWith(threads) => match pool(*threads) {
                    Some(pool) => pool.install(|| range.into_par_iter().map(f).collect()),
                    None => range.into_par_iter().map(f).collect(),
                },
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            range.map(f).collect()
        }
    }

    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        #[cfg(feature = "parallel")]
        {
            if let ProcessingMode::ParallelWith(threads) = self {
                if let Some(pool) = pool(*threads) {
                    return pool.install(f);
                }
            }
        }
        f()
    }
}

/// Get the number of worker threads available
pub fn num_cpus() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_par_map_keeps_order() {
        for mode in [
            ProcessingMode::Sequential,
            ProcessingMode::Parallel,
            ProcessingMode::ParallelWith(3),
        ] {
            let out = mode.par_map(0..1000, |i| i * 2);
            assert_eq!(out.len(), 1000);
            assert!(out.iter().enumerate().all(|(i, &v)| v == i * 2), "{mode:?}");
        }
    }

    #[test]
    fn test_install_returns_value() {
        assert_eq!(ProcessingMode::ParallelWith(2).install(|| 41 + 1), 42);
        assert_eq!(ProcessingMode::Sequential.install(|| "done"), "done");
    }

    #[test]
    fn test_sequential_is_not_parallel() {
        assert!(!ProcessingMode::Sequential.is_parallel());
        assert!(num_cpus() >= 1);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_dedicated_pool_is_reused() {
        let first = pool(3).unwrap();
        let second = pool(3).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &pool(2).unwrap()));

        let mode = ProcessingMode::ParallelWith(3);
        assert_eq!(mode.install(rayon::current_num_threads), 3);
        assert_eq!(mode.install(rayon::current_num_threads), 3);
    }
}
