//! Worker error types.

use crate::net::NetError;
use crate::store::StoreError;
use crate::worker::state::WorkerState;
use thiserror::Error;

/// Errors surfaced by worker operations.
///
/// A network failure only reaches the caller when every fallback (cache
/// match, offline page) was exhausted; the host surfaces it as a failed
/// resource load.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Network failure with no cache fallback available
    #[error("network error: {0}")]
    Network(#[from] NetError),

    /// Storage backend failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Operation not valid in the worker's current lifecycle state
    #[error("worker is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: WorkerState,
    },
}
