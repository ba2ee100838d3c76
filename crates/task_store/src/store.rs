//! Task store trait definitions.

use async_trait::async_trait;
use entities::TaskDetail;
use serde::Deserialize;
use uuid::Uuid;

use crate::{Record, TaskStoreResult};

/// Largest page a list operation returns.
pub const MAX_PAGE_SIZE: i64 = 10;

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

/// Offset/limit window for list operations.
///
/// Deserializable from a query string (`?offset=0&limit=10`); missing values
/// fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    /// Number of rows to skip.
    #[serde(default)]
    pub offset: i64,
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Creates a page.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Returns the window actually queried: limit capped at
    /// [`MAX_PAGE_SIZE`], negative values raised to zero.
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset.max(0),
            limit: self.limit.clamp(0, MAX_PAGE_SIZE),
        }
    }
}

/// Storage operations over every [`Record`] type.
///
/// Each call is one unit of work: it acquires a connection or transaction,
/// performs a single logical operation and releases it before returning.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists records in creation order, at most [`MAX_PAGE_SIZE`] at a time.
    async fn list<R: Record>(&self, page: Page) -> TaskStoreResult<Vec<R>>;

    /// Gets a record by ID.
    async fn get<R: Record>(&self, id: Uuid) -> TaskStoreResult<Option<R>>;

    /// Creates a record from a validated payload.
    ///
    /// Fails with [`crate::TaskStoreError::MissingReference`] if a foreign
    /// key does not resolve; nothing is written in that case.
    async fn create<R: Record>(&self, input: R::Create) -> TaskStoreResult<R>;

    /// Applies a validated patch to the record with the given ID.
    ///
    /// `updated_at` is refreshed only when the patch carries at least one
    /// field.
    async fn update<R: Record>(&self, id: Uuid, patch: R::Patch) -> TaskStoreResult<R>;

    /// Deletes a record.
    ///
    /// Fails with [`crate::TaskStoreError::InUse`] while other rows still
    /// reference it.
    async fn delete<R: Record>(&self, id: Uuid) -> TaskStoreResult<()>;

    /// Gets a task together with its status and task type.
    ///
    /// Fails with [`crate::TaskStoreError::DanglingReference`] if the stored
    /// task points at a row that is gone.
    async fn get_task_detail(&self, id: Uuid) -> TaskStoreResult<Option<TaskDetail>>;
}
