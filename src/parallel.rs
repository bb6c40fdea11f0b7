//! Parallel processing configuration
//!
//! Seasonal means, correlation maps and projections run on Rayon's global
//! thread pool. This module sizes that pool from the command line.

use crate::errors::{NpgoError, Result};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Create a configuration that uses all available CPU cores
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Use the requested thread count, or every CPU core when none is given
    pub fn from_threads(num_threads: Option<usize>) -> Self {
        num_threads.map_or_else(Self::all_cores, |n| Self::new(Some(n)))
    }

    /// Set up the global Rayon thread pool with the specified configuration
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    NpgoError::ThreadPool(format!(
                        "Failed to initialize thread pool with {} threads: {}",
                        num_threads, e
                    ))
                })?;
            tracing::debug!(num_threads, "configured global thread pool");
        } else {
            tracing::debug!(
                num_threads = rayon::current_num_threads(),
                available_cores = num_cpus::get(),
                "using default thread pool"
            );
        }

        Ok(())
    }
}
