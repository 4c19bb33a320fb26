//! Error type shared by every stage of the descriptor pipeline.
//!
//! Input and partition errors are raised before any worker is dispatched.
//! Worker failures are raised at gather time. Nothing is retried: the
//! computation is pure, so a second attempt on the same input fails the same way.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LbpError {
    #[error("image must be at least 3x3 to have interior pixels, got {width}x{height}")]
    InvalidInput { width: u32, height: u32 },

    #[error("image must have at least 3 rows to partition, got {height}")]
    TooFewRows { height: u32 },

    #[error("sample buffer length mismatch: expected {expected}, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("worker count must be positive, got {0}")]
    InvalidPartition(usize),

    #[error("worker {worker_index} failed before producing a result: {reason}")]
    WorkerFailure { worker_index: usize, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl LbpError {
    /// True for errors caused by the caller's request rather than by a run.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LbpError::InvalidInput { .. }
                | LbpError::TooFewRows { .. }
                | LbpError::BufferMismatch { .. }
                | LbpError::InvalidPartition(_)
                | LbpError::Configuration(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LbpError>;
