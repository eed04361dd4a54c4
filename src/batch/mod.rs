//! Batch analysis of many patient records with bounded concurrency.
//!
//! [`BatchRunner`] drives the workers, [`BatchTracker`] holds the shared
//! per-item state and [`BatchRegistry`] keeps background jobs the API can
//! poll.

pub mod registry;
pub mod runner;
pub mod tracker;
pub mod types;

pub use registry::BatchRegistry;
pub use runner::{BatchRunner, HistorySink};
pub use tracker::{BatchTracker, TransitionError};
pub use types::{
    effective_concurrency, BatchEvent, BatchItem, BatchOptions, BatchSnapshot, BatchSummary,
    ItemStatus,
};
