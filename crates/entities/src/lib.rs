//! Core entity definitions for Taskboard.
//!
//! This crate defines the three persisted entities (statuses, task types and
//! tasks), the payloads used to create and patch them, and the validation
//! rules those payloads must satisfy before they reach the store.

mod patch;
mod status;
mod task;
mod task_type;
mod validation;

pub use patch::*;
pub use status::*;
pub use task::*;
pub use task_type::*;
pub use validation::*;
