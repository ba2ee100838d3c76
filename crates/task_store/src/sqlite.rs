//! SQLite-backed task store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use entities::{Status, Task, TaskDetail, TaskType};
use sqlx::{
    Sqlite, SqliteConnection, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use uuid::Uuid;

use crate::{
    Page, Record, TaskStore, TaskStoreError, TaskStoreResult,
    record::{insert_sql, select_sql, update_sql},
    schema::SCHEMA_SQL,
};

/// How long a connection waits for another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Task store backed by a SQLite connection pool.
///
/// The pool is created once and shared; every operation checks out its own
/// connection or transaction and returns it before the call completes.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Connects to the database at `database_url` and applies the schema.
    ///
    /// The file is opened in WAL mode so readers never block the writer, and
    /// writers queue behind each other for up to [`BUSY_TIMEOUT`].
    pub async fn connect(database_url: &str) -> TaskStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds exactly one connection that is never recycled, since an
    /// in-memory database disappears with the connection that created it.
    pub async fn in_memory() -> TaskStoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> TaskStoreResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Starts a transaction that takes the write lock up front.
    ///
    /// Write paths read before they write. A deferred transaction would try
    /// to upgrade its read lock at the first write and fail with SQLITE_BUSY
    /// when another connection got there first; `BEGIN IMMEDIATE` waits on
    /// the busy timeout instead.
    async fn begin_write(&self) -> TaskStoreResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    async fn run_migrations(&self) -> TaskStoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("Database schema applied");
        Ok(())
    }
}

async fn fetch_record<R: Record>(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> TaskStoreResult<Option<R>> {
    let sql = format!("{} WHERE id = ?", select_sql::<R>());
    let record = sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(record)
}

/// Fails if any foreign key held by `record` does not resolve.
async fn ensure_references<R: Record>(
    conn: &mut SqliteConnection,
    record: &R,
) -> TaskStoreResult<()> {
    for key in record.foreign_keys() {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", key.table);
        let found = sqlx::query_scalar::<_, i64>(&sql)
            .bind(key.id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            return Err(TaskStoreError::missing_reference(key.entity_type, key.id));
        }
    }
    Ok(())
}

/// Fails if any row in another table still points at `id`.
async fn ensure_unreferenced<R: Record>(conn: &mut SqliteConnection, id: Uuid) -> TaskStoreResult<()> {
    for reference in R::REFERENCED_BY {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            reference.table, reference.column
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        if count > 0 {
            return Err(TaskStoreError::in_use(R::ENTITY, id, reference.entity_type));
        }
    }
    Ok(())
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list<R: Record>(&self, page: Page) -> TaskStoreResult<Vec<R>> {
        let page = page.clamped();
        let sql = format!("{} ORDER BY rowid LIMIT ? OFFSET ?", select_sql::<R>());

        let mut conn = self.pool.acquire().await?;
        let records = sqlx::query_as::<_, R>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&mut *conn)
            .await?;

        Ok(records)
    }

    async fn get<R: Record>(&self, id: Uuid) -> TaskStoreResult<Option<R>> {
        let mut conn = self.pool.acquire().await?;
        fetch_record::<R>(&mut conn, id).await
    }

    async fn create<R: Record>(&self, input: R::Create) -> TaskStoreResult<R> {
        let record = R::from_create(input);
        let sql = insert_sql::<R>();

        let mut tx = self.begin_write().await?;
        ensure_references(&mut tx, &record).await?;
        record
            .bind_columns(sqlx::query(&sql).bind(record.id()))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(entity = R::ENTITY, id = %record.id(), "Row inserted");
        Ok(record)
    }

    async fn update<R: Record>(&self, id: Uuid, patch: R::Patch) -> TaskStoreResult<R> {
        let mut tx = self.begin_write().await?;
        let mut record = fetch_record::<R>(&mut tx, id)
            .await?
            .ok_or_else(|| TaskStoreError::not_found(R::ENTITY, id))?;

        if !record.apply(patch) {
            // Nothing to write; dropping the transaction releases it.
            return Ok(record);
        }

        record.touch(Utc::now());
        ensure_references(&mut tx, &record).await?;

        let sql = update_sql::<R>();
        record
            .bind_columns(sqlx::query(&sql))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(entity = R::ENTITY, id = %id, "Row updated");
        Ok(record)
    }

    async fn delete<R: Record>(&self, id: Uuid) -> TaskStoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", R::TABLE);

        let mut tx = self.begin_write().await?;
        ensure_unreferenced::<R>(&mut tx, id).await?;
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|err| match TaskStoreError::from(err) {
                TaskStoreError::ForeignKeyViolation(_) => {
                    let referenced_by = R::REFERENCED_BY
                        .first()
                        .map_or("other rows", |reference| reference.entity_type);
                    TaskStoreError::in_use(R::ENTITY, id, referenced_by)
                }
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found(R::ENTITY, id));
        }
        tx.commit().await?;

        tracing::debug!(entity = R::ENTITY, id = %id, "Row deleted");
        Ok(())
    }

    async fn get_task_detail(&self, id: Uuid) -> TaskStoreResult<Option<TaskDetail>> {
        let mut tx = self.pool.begin().await?;

        let Some(task) = fetch_record::<Task>(&mut tx, id).await? else {
            return Ok(None);
        };
        let status = fetch_record::<Status>(&mut tx, task.status_id)
            .await?
            .ok_or_else(|| TaskStoreError::dangling_reference(Status::ENTITY, task.status_id))?;
        let task_type = fetch_record::<TaskType>(&mut tx, task.type_id)
            .await?
            .ok_or_else(|| TaskStoreError::dangling_reference(TaskType::ENTITY, task.type_id))?;

        tx.commit().await?;

        Ok(Some(TaskDetail {
            task,
            status,
            task_type,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use entities::{NewStatus, NewTask, NewTaskType, Patch, StatusPatch, TaskPatch};
    use tempfile::TempDir;

    use super::*;

    async fn store() -> SqliteTaskStore {
        SqliteTaskStore::in_memory().await.unwrap()
    }

    async fn file_store(dir: &TempDir) -> SqliteTaskStore {
        let path = dir.path().join("taskboard.db");
        SqliteTaskStore::connect(&format!("sqlite:{}?mode=rwc", path.display()))
            .await
            .unwrap()
    }

    async fn seed(store: &SqliteTaskStore) -> (Status, TaskType, Task) {
        let status = store
            .create::<Status>(NewStatus {
                name: "open".to_string(),
            })
            .await
            .unwrap();
        let task_type = store
            .create::<TaskType>(NewTaskType {
                name: "bug".to_string(),
            })
            .await
            .unwrap();
        let task = store
            .create::<Task>(NewTask {
                summary: "fix".to_string(),
                description: Some("steps to reproduce".to_string()),
                status_id: status.id,
                type_id: task_type.id,
            })
            .await
            .unwrap();
        (status, task_type, task)
    }

    #[tokio::test]
    async fn test_status_crud() {
        let store = store().await;

        // Create
        let created = store.create::<Status>(NewStatus::default()).await.unwrap();
        assert_eq!(created.name, "new");

        // Get
        let fetched = store.get::<Status>(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.created_at, created.created_at);

        // List
        let statuses = store.list::<Status>(Page::default()).await.unwrap();
        assert_eq!(statuses.len(), 1);

        // Update
        let patch = StatusPatch {
            name: Patch::Value("done".to_string()),
        };
        let updated = store.update::<Status>(created.id, patch).await.unwrap();
        assert_eq!(updated.name, "done");

        // Delete
        store.delete::<Status>(created.id).await.unwrap();
        assert!(store.get::<Status>(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = store().await;
        let mut ids = HashSet::new();

        for _ in 0..20 {
            let task_type = store.create::<TaskType>(NewTaskType::default()).await.unwrap();
            assert!(ids.insert(task_type.id));
        }
    }

    #[tokio::test]
    async fn test_list_caps_limit() {
        let store = store().await;
        for _ in 0..12 {
            let _ = store.create::<Status>(NewStatus::default()).await.unwrap();
        }

        let page = store.list::<Status>(Page::new(0, 100)).await.unwrap();
        assert_eq!(page.len(), 10);

        let rest = store.list::<Status>(Page::new(10, 10)).await.unwrap();
        assert_eq!(rest.len(), 2);

        let none = store.list::<Status>(Page::new(0, -1)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let store = store().await;
        let mut created = Vec::new();
        for name in ["a", "b", "c"] {
            let status = store
                .create::<Status>(NewStatus {
                    name: name.to_string(),
                })
                .await
                .unwrap();
            created.push(status.id);
        }

        let listed: Vec<Uuid> = store
            .list::<Status>(Page::default())
            .await
            .unwrap()
            .into_iter()
            .map(|status| status.id)
            .collect();
        assert_eq!(listed, created);
    }

    #[tokio::test]
    async fn test_empty_patch_leaves_record_unchanged() {
        let store = store().await;
        let (_, _, task) = seed(&store).await;

        let updated = store.update::<Task>(task.id, TaskPatch::default()).await.unwrap();
        let fetched = store.get::<Task>(task.id).await.unwrap().unwrap();

        assert_eq!(updated.updated_at, task.updated_at);
        assert_eq!(fetched.summary, task.summary);
        assert_eq!(fetched.description, task.description);
        assert_eq!(fetched.updated_at, task.updated_at);
    }

    #[tokio::test]
    async fn test_patch_changes_only_given_field() {
        let store = store().await;
        let (status, task_type, task) = seed(&store).await;

        let patch = TaskPatch {
            summary: Patch::Value("fixed".to_string()),
            ..Default::default()
        };
        let _ = store.update::<Task>(task.id, patch).await.unwrap();

        let fetched = store.get::<Task>(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.summary, "fixed");
        assert_eq!(fetched.description.as_deref(), Some("steps to reproduce"));
        assert_eq!(fetched.status_id, status.id);
        assert_eq!(fetched.type_id, task_type.id);
        assert_eq!(fetched.created_at, task.created_at);
        assert!(fetched.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = store().await;
        let result = store
            .update::<Status>(Uuid::new_v4(), StatusPatch::default())
            .await;

        assert!(matches!(
            result,
            Err(TaskStoreError::NotFound {
                entity_type: "Status",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_task_with_unknown_status_persists_nothing() {
        let store = store().await;
        let (_, task_type, _) = seed(&store).await;

        let result = store
            .create::<Task>(NewTask {
                summary: "orphan".to_string(),
                description: None,
                status_id: Uuid::new_v4(),
                type_id: task_type.id,
            })
            .await;

        assert!(matches!(
            result,
            Err(TaskStoreError::MissingReference {
                entity_type: "Status",
                ..
            })
        ));
        let tasks = store.list::<Task>(Page::default()).await.unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_patch_to_unknown_type_is_rejected() {
        let store = store().await;
        let (_, task_type, task) = seed(&store).await;

        let patch = TaskPatch {
            type_id: Patch::Value(Uuid::new_v4()),
            ..Default::default()
        };
        let result = store.update::<Task>(task.id, patch).await;
        assert!(matches!(
            result,
            Err(TaskStoreError::MissingReference {
                entity_type: "Type",
                ..
            })
        ));

        let fetched = store.get::<Task>(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.type_id, task_type.id);
    }

    #[tokio::test]
    async fn test_store_enforces_foreign_keys() {
        let store = store().await;
        let task = Task::new("raw", Uuid::new_v4(), Uuid::new_v4());
        let sql = insert_sql::<Task>();

        let result = task
            .bind_columns(sqlx::query(&sql).bind(task.id))
            .execute(store.pool())
            .await
            .map_err(TaskStoreError::from);

        assert!(matches!(
            result,
            Err(TaskStoreError::ForeignKeyViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_task_detail_includes_relations() {
        let store = store().await;
        let (status, task_type, task) = seed(&store).await;

        let detail = store.get_task_detail(task.id).await.unwrap().unwrap();
        assert_eq!(detail.task.id, task.id);
        assert_eq!(detail.status.id, status.id);
        assert_eq!(detail.status.name, "open");
        assert_eq!(detail.task_type.id, task_type.id);
        assert_eq!(detail.task_type.name, "bug");

        assert!(store.get_task_detail(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_referenced_status_is_rejected() {
        let store = store().await;
        let (status, task_type, task) = seed(&store).await;

        let result = store.delete::<Status>(status.id).await;
        assert!(matches!(
            result,
            Err(TaskStoreError::InUse {
                entity_type: "Status",
                referenced_by: "Task",
                ..
            })
        ));
        assert!(store.get::<Status>(status.id).await.unwrap().is_some());

        store.delete::<Task>(task.id).await.unwrap();
        store.delete::<Status>(status.id).await.unwrap();
        store.delete::<TaskType>(task_type.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let store = store().await;
        let result = store.delete::<Task>(Uuid::new_v4()).await;

        assert!(matches!(
            result,
            Err(TaskStoreError::NotFound {
                entity_type: "Task",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_task_detail_with_dangling_status() {
        let store = store().await;
        let (status, _, task) = seed(&store).await;

        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query(r#"DELETE FROM "status" WHERE id = ?"#)
            .bind(status.id)
            .execute(store.pool())
            .await
            .unwrap();

        let result = store.get_task_detail(task.id).await;
        assert!(matches!(
            result,
            Err(TaskStoreError::DanglingReference {
                entity_type: "Status",
                ..
            })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir).await;
        let (status, task_type, _) = seed(&store).await;
        let (status_id, type_id) = (status.id, task_type.id);

        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    let patch = StatusPatch {
                        name: Patch::Value(format!("status {i}")),
                    };
                    store.update::<Status>(status_id, patch).await.map(|_| ())
                } else {
                    let input = NewTask {
                        summary: format!("task {i}"),
                        description: None,
                        status_id,
                        type_id,
                    };
                    store.create::<Task>(input).await.map(|_| ())
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let task_count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "task""#)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(task_count, 26);

        let status = store.get::<Status>(status_id).await.unwrap().unwrap();
        assert!(status.name.starts_with("status "));

        store.pool().close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deletes_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir).await;

        let mut ids = Vec::new();
        for _ in 0..20 {
            ids.push(store.create::<TaskType>(NewTaskType::default()).await.unwrap().id);
        }

        let mut handles = Vec::new();
        for id in ids {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.delete::<TaskType>(id).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(store.list::<TaskType>(Page::default()).await.unwrap().is_empty());
        store.pool().close().await;
    }
}
