//! Table declarations for the persisted entities.
//!
//! Every entity the store can hold implements [`Record`], which tells the
//! generic CRUD code in [`crate::SqliteTaskStore`] which table it lives in,
//! which columns to read and write, how create and patch payloads map onto a
//! row, and which foreign keys point to or from it.

use chrono::{DateTime, Utc};
use entities::{
    NewStatus, NewTask, NewTaskType, Status, StatusPatch, Task, TaskPatch, TaskType,
    TaskTypePatch, Validate,
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{
    FromRow, Sqlite,
    query::Query,
    sqlite::{SqliteArguments, SqliteRow},
};
use uuid::Uuid;

/// A query under construction against SQLite.
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A column in another table that points at a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Entity name of the referencing table, used in error messages.
    pub entity_type: &'static str,
    /// Referencing table.
    pub table: &'static str,
    /// Foreign key column in the referencing table.
    pub column: &'static str,
}

/// A foreign key value held by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Entity name of the referenced table, used in error messages.
    pub entity_type: &'static str,
    /// Referenced table.
    pub table: &'static str,
    /// Referenced row.
    pub id: Uuid,
}

/// A row type stored in its own table with a UUID primary key named `id`.
pub trait Record:
    for<'r> FromRow<'r, SqliteRow> + Serialize + Clone + Send + Sync + Unpin + 'static
{
    /// Human readable entity name ("Status").
    const ENTITY: &'static str;
    /// Quoted table name.
    const TABLE: &'static str;
    /// Columns other than `id`, in the order [`Record::bind_columns`] binds them.
    const COLUMNS: &'static [&'static str];
    /// Foreign keys in other tables that point at this one.
    const REFERENCED_BY: &'static [Reference] = &[];

    /// Payload accepted by `create`.
    type Create: Validate + DeserializeOwned + Send + 'static;
    /// Payload accepted by `update`.
    type Patch: Validate + DeserializeOwned + Send + 'static;

    /// Primary key.
    fn id(&self) -> Uuid;

    /// Builds a new row, assigning its id and timestamps.
    fn from_create(input: Self::Create) -> Self;

    /// Applies a patch. Returns true if any field was present in it.
    fn apply(&mut self, patch: Self::Patch) -> bool;

    /// Records a modification time.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Foreign keys this row holds.
    fn foreign_keys(&self) -> Vec<ForeignKey> {
        Vec::new()
    }

    /// Binds every column in [`Record::COLUMNS`] order.
    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

pub(crate) fn select_sql<R: Record>() -> String {
    format!("SELECT id, {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

pub(crate) fn insert_sql<R: Record>() -> String {
    let placeholders = vec!["?"; R::COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO {} (id, {}) VALUES (?, {})",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders
    )
}

pub(crate) fn update_sql<R: Record>() -> String {
    let assignments = R::COLUMNS
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {} WHERE id = ?", R::TABLE, assignments)
}

const STATUS_TABLE: &str = "\"status\"";
const TYPE_TABLE: &str = "\"type\"";
const TASK_TABLE: &str = "\"task\"";

impl Record for Status {
    const ENTITY: &'static str = "Status";
    const TABLE: &'static str = STATUS_TABLE;
    const COLUMNS: &'static [&'static str] = &["name", "created_at", "updated_at"];
    const REFERENCED_BY: &'static [Reference] = &[Reference {
        entity_type: Task::ENTITY,
        table: TASK_TABLE,
        column: "status_id",
    }];

    type Create = NewStatus;
    type Patch = StatusPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(input: NewStatus) -> Self {
        Status::from(input)
    }

    fn apply(&mut self, patch: StatusPatch) -> bool {
        Status::apply(self, patch)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.name.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl Record for TaskType {
    const ENTITY: &'static str = "Type";
    const TABLE: &'static str = TYPE_TABLE;
    const COLUMNS: &'static [&'static str] = &["name", "created_at", "updated_at"];
    const REFERENCED_BY: &'static [Reference] = &[Reference {
        entity_type: Task::ENTITY,
        table: TASK_TABLE,
        column: "type_id",
    }];

    type Create = NewTaskType;
    type Patch = TaskTypePatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(input: NewTaskType) -> Self {
        TaskType::from(input)
    }

    fn apply(&mut self, patch: TaskTypePatch) -> bool {
        TaskType::apply(self, patch)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.name.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl Record for Task {
    const ENTITY: &'static str = "Task";
    const TABLE: &'static str = TASK_TABLE;
    const COLUMNS: &'static [&'static str] = &[
        "summary",
        "description",
        "status_id",
        "type_id",
        "created_at",
        "updated_at",
    ];

    type Create = NewTask;
    type Patch = TaskPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_create(input: NewTask) -> Self {
        Task::from(input)
    }

    fn apply(&mut self, patch: TaskPatch) -> bool {
        Task::apply(self, patch)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn foreign_keys(&self) -> Vec<ForeignKey> {
        vec![
            ForeignKey {
                entity_type: Status::ENTITY,
                table: STATUS_TABLE,
                id: self.status_id,
            },
            ForeignKey {
                entity_type: TaskType::ENTITY,
                table: TYPE_TABLE,
                id: self.type_id,
            },
        ]
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.summary.clone())
            .bind(self.description.clone())
            .bind(self.status_id)
            .bind(self.type_id)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_sql() {
        assert_eq!(
            select_sql::<Status>(),
            "SELECT id, name, created_at, updated_at FROM \"status\""
        );
    }

    #[test]
    fn test_insert_sql_has_one_placeholder_per_column() {
        let sql = insert_sql::<Task>();
        assert_eq!(sql.matches('?').count(), Task::COLUMNS.len() + 1);
        assert!(sql.starts_with("INSERT INTO \"task\" (id, summary,"));
    }

    #[test]
    fn test_update_sql() {
        assert_eq!(
            update_sql::<TaskType>(),
            "UPDATE \"type\" SET name = ?, created_at = ?, updated_at = ? WHERE id = ?"
        );
    }

    #[test]
    fn test_task_foreign_keys() {
        let task = Task::new("fix", Uuid::new_v4(), Uuid::new_v4());
        let keys = task.foreign_keys();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].id, task.status_id);
        assert_eq!(keys[1].id, task.type_id);
        assert!(Task::REFERENCED_BY.is_empty());
    }
}
