//! Shared task model and persisted representation for `Taskdeck`.

pub mod codec;
pub mod draft;
pub mod task;
