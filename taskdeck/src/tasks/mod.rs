//! Per-user task collections.
//!
//! [`TaskRepository`] owns CRUD, bulk operations and derived views over one
//! user's collection, persisted through a
//! [`DurableStore`](crate::store::DurableStore). A user's first access seeds
//! the collection with generated sample tasks (see [`seed`]).

pub mod repository;
pub mod seed;

pub use repository::TaskRepository;
pub use seed::{SAMPLE_TASK_COUNT, generate_sample_tasks};

use taskdeck_proto::draft::DraftError;
use taskdeck_proto::task::TaskId;
use thiserror::Error;

/// Errors that can occur during task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The stored collection could not be read or decoded.
    #[error("could not read tasks: {0}")]
    StoreRead(String),
    /// The collection could not be encoded or written.
    #[error("could not save tasks: {0}")]
    StoreWrite(String),
    /// Task with the given ID was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// User input was rejected before reaching the repository.
    #[error("invalid task: {0}")]
    InvalidInput(#[from] DraftError),
}
