//! Error types for the scheduler module.

use thiserror::Error;

/// Batch-fatal scheduler errors.
///
/// Per-item failures never surface here; they are collected in the
/// `BatchResult` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The pool must have at least one slot.
    #[error("Invalid pool size {pool_size}: at least one slot is required")]
    InvalidPoolSize { pool_size: usize },
}
