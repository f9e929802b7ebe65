//! Single-threaded runtime for playback
//!
//! The player schedules its timers with `spawn_local`, so it has to be driven
//! from a current-thread runtime with a [`LocalSet`].

use std::future::Future;

use tokio::runtime::Builder;
use tokio::task::LocalSet;

use crate::error::{ReplayError, Result};

/// Run `fut` to completion on a current-thread runtime inside a `LocalSet`
pub fn run_local<F>(fut: F) -> Result<F::Output>
where
    F: Future,
{
    let rt = Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| ReplayError::Runtime(format!("Failed to build runtime: {}", e)))?;
    let local = LocalSet::new();
    Ok(local.block_on(&rt, fut))
}
