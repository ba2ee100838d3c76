//! Status entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Patch, Validate, ValidationResult, validation::non_null};

/// Name given to a status created without one.
pub const DEFAULT_STATUS_NAME: &str = "new";

/// A workflow state a task can be in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Status {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name. Not unique.
    pub name: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Status {
    /// Creates a new status.
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
    pub fn apply(&mut self, patch: StatusPatch) -> bool {
        patch.name.apply_to(&mut self.name)
    }
}

fn default_status_name() -> String {
    DEFAULT_STATUS_NAME.to_string()
}

/// Payload for creating a status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStatus {
    #[serde(default = "default_status_name")]
    pub name: String,
}

impl Default for NewStatus {
    fn default() -> Self {
        Self {
            name: default_status_name(),
        }
    }
}

impl Validate for NewStatus {
    fn validate(&self) -> ValidationResult {
        Ok(())
    }
}

impl From<NewStatus> for Status {
    fn from(input: NewStatus) -> Self {
        Status::new(input.name)
    }
}

/// Partial update for a status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusPatch {
    #[serde(default)]
    pub name: Patch<String>,
}

impl Validate for StatusPatch {
    fn validate(&self) -> ValidationResult {
        non_null("name", &self.name)
    }
}
