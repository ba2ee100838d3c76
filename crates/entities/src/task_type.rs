//! Task type entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Patch, Validate, ValidationResult, validation::non_null};

/// Name given to a task type created without one.
pub const DEFAULT_TASK_TYPE_NAME: &str = "task";

/// The kind of a task ("bug", "feature", ...). Stored in the `type` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TaskType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskType {
    /// Creates a new task type.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `patch`. Returns true if any were.
    pub fn apply(&mut self, patch: TaskTypePatch) -> bool {
        patch.name.apply_to(&mut self.name)
    }
}

fn default_task_type_name() -> String {
    DEFAULT_TASK_TYPE_NAME.to_string()
}

/// Payload for creating a task type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTaskType {
    #[serde(default = "default_task_type_name")]
    pub name: String,
}

impl Default for NewTaskType {
    fn default() -> Self {
        Self {
            name: default_task_type_name(),
        }
    }
}

impl Validate for NewTaskType {
    fn validate(&self) -> ValidationResult {
        Ok(())
    }
}

impl From<NewTaskType> for TaskType {
    fn from(input: NewTaskType) -> Self {
        TaskType::new(input.name)
    }
}

/// Partial update for a task type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskTypePatch {
    #[serde(default)]
    pub name: Patch<String>,
}

impl Validate for TaskTypePatch {
    fn validate(&self) -> ValidationResult {
        non_null("name", &self.name)
    }
}
