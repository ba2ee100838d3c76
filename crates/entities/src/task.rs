//! Task entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    MAX_SUMMARY_LENGTH, Patch, Status, TaskType, Validate, ValidationResult,
    validation::{max_chars, non_null},
};

/// A unit of work. Always references exactly one status and one task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Task {
    /// Unique identifier.
    pub id: Uuid,
    /// One-line summary, at most 255 characters.
    pub summary: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Referenced status.
    pub status_id: Uuid,
    /// Referenced task type.
    pub type_id: Uuid,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task.
    pub fn new(summary: impl Into<String>, status_id: Uuid, type_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            summary: summary.into(),
            description: None,
            status_id,
            type_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `patch`. Returns true if any were.
    pub fn apply(&mut self, patch: TaskPatch) -> bool {
        let TaskPatch {
            summary,
            description,
            status_id,
            type_id,
        } = patch;

        // Non-short-circuiting so every present field is written.
        summary.apply_to(&mut self.summary)
            | description.apply_to_option(&mut self.description)
            | status_id.apply_to(&mut self.status_id)
            | type_id.apply_to(&mut self.type_id)
    }
}

/// Payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTask {
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status_id: Uuid,
    pub type_id: Uuid,
}

impl Validate for NewTask {
    fn validate(&self) -> ValidationResult {
        max_chars("summary", &self.summary, MAX_SUMMARY_LENGTH)
    }
}

impl From<NewTask> for Task {
    fn from(input: NewTask) -> Self {
        let mut task = Task::new(input.summary, input.status_id, input.type_id);
        task.description = input.description;
        task
    }
}

/// Partial update for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub summary: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub status_id: Patch<Uuid>,
    #[serde(default)]
    pub type_id: Patch<Uuid>,
}

impl Validate for TaskPatch {
    fn validate(&self) -> ValidationResult {
        non_null("summary", &self.summary)?;
        non_null("status_id", &self.status_id)?;
        non_null("type_id", &self.type_id)?;
        if let Some(summary) = self.summary.as_value() {
            max_chars("summary", summary, MAX_SUMMARY_LENGTH)?;
        }
        Ok(())
    }
}

/// A task together with the status and task type it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub status: Status,
    #[serde(rename = "type")]
    pub task_type: TaskType,
}
