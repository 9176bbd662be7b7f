use async_trait::async_trait;
use database::{MemoryStore, RecordId, RecordStore, StoreError};

use crate::error::{TaskError, TaskResult};
use crate::models::{Task, TaskFilter};

/// Repository trait for Task persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task
    async fn create(&self, task: Task) -> TaskResult<Task>;

    /// Get a task by ID
    async fn get_by_id(&self, id: &RecordId) -> TaskResult<Option<Task>>;

    /// List tasks with optional filters
    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>>;

    /// Save changes to an existing task
    async fn update(&self, task: Task) -> TaskResult<Task>;

    /// Delete a task by ID, reporting whether anything existed
    async fn delete(&self, id: &RecordId) -> TaskResult<bool>;

    /// Find an owner's task by exact title
    async fn find_by_title(&self, user_id: &RecordId, title: &str) -> TaskResult<Option<Task>>;

    /// Direct children of a task
    async fn list_children(&self, id: &RecordId) -> TaskResult<Vec<Task>>;

    /// Whether a task has any direct children
    async fn has_children(&self, id: &RecordId) -> TaskResult<bool>;
}

/// Record-store backed implementation of TaskRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskRepository {
    store: MemoryStore<Task>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: Task) -> TaskResult<Task> {
        let created = self.store.insert(task).await?;
        tracing::info!(task_id = %created.id, level = created.level, "Created task");
        Ok(created)
    }

    async fn get_by_id(&self, id: &RecordId) -> TaskResult<Option<Task>> {
        Ok(self.store.get(id).await.map_err(TaskError::from)?)
    }

    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        let tasks = self
            .store
            .filter_page(filter.offset, filter.limit, |t| {
                if let Some(ref user_id) = filter.user_id {
                    if &t.user_id != user_id {
                        return false;
                    }
                }
                if let Some(completed) = filter.completed {
                    if t.completed != completed {
                        return false;
                    }
                }
                if let Some(priority) = filter.priority {
                    if t.priority != priority {
                        return false;
                    }
                }
                true
            })
            .await;
        Ok(tasks)
    }

    async fn update(&self, task: Task) -> TaskResult<Task> {
        let id = task.id.clone();
        let updated = self.store.update(task).await.map_err(|e| match e {
            StoreError::NotFound => TaskError::NotFound(id),
            other => other.into(),
        })?;

        tracing::info!(task_id = %updated.id, level = updated.level, "Updated task");
        Ok(updated)
    }

    async fn delete(&self, id: &RecordId) -> TaskResult<bool> {
        let deleted = self.store.delete(id).await.map_err(TaskError::from)?;
        if deleted {
            tracing::info!(task_id = %id, "Deleted task");
        }
        Ok(deleted)
    }

    async fn find_by_title(&self, user_id: &RecordId, title: &str) -> TaskResult<Option<Task>> {
        Ok(self
            .store
            .find_one(|t| &t.user_id == user_id && t.title == title)
            .await)
    }

    async fn list_children(&self, id: &RecordId) -> TaskResult<Vec<Task>> {
        Ok(self
            .store
            .filter_page(0, usize::MAX, |t| t.parent_id.as_ref() == Some(id))
            .await)
    }

    async fn has_children(&self, id: &RecordId) -> TaskResult<bool> {
        Ok(self
            .store
            .count_matching(|t| t.parent_id.as_ref() == Some(id))
            .await
            > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTask, Priority};

    fn task(title: &str, user_id: &RecordId, parent: Option<RecordId>, level: i32) -> Task {
        Task::new(
            CreateTask {
                title: title.to_string(),
                description: None,
                completed: false,
                priority: Priority::default(),
                started_at: None,
                end_at: None,
                user_id: None,
                parent_id: parent,
            },
            user_id.clone(),
            level,
        )
    }

    #[tokio::test]
    async fn test_create_and_find_by_title() {
        let repo = InMemoryTaskRepository::new();
        let owner = RecordId::generate();
        let created = repo.create(task("Write report", &owner, None, 1)).await.unwrap();

        let found = repo.find_by_title(&owner, "Write report").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);

        let missing = repo.find_by_title(&owner, "Other title").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_title_same_owner_rejected() {
        let repo = InMemoryTaskRepository::new();
        let owner = RecordId::generate();
        repo.create(task("Write report", &owner, None, 1)).await.unwrap();

        let result = repo.create(task("Write report", &owner, None, 1)).await;
        assert!(matches!(result, Err(TaskError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_same_title_different_owners_allowed() {
        let repo = InMemoryTaskRepository::new();
        repo.create(task("Write report", &RecordId::generate(), None, 1))
            .await
            .unwrap();
        repo.create(task("Write report", &RecordId::generate(), None, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_children_lookup() {
        let repo = InMemoryTaskRepository::new();
        let owner = RecordId::generate();
        let root = repo.create(task("Root of tree", &owner, None, 1)).await.unwrap();
        repo.create(task("First child", &owner, Some(root.id.clone()), 2))
            .await
            .unwrap();
        repo.create(task("Second child", &owner, Some(root.id.clone()), 2))
            .await
            .unwrap();

        assert!(repo.has_children(&root.id).await.unwrap());
        assert_eq!(repo.list_children(&root.id).await.unwrap().len(), 2);

        let leaf = repo.find_by_title(&owner, "First child").await.unwrap().unwrap();
        assert!(!repo.has_children(&leaf.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_by_owner_and_completion() {
        let repo = InMemoryTaskRepository::new();
        let owner = RecordId::generate();
        let mut done = task("Completed task", &owner, None, 1);
        done.completed = true;
        repo.create(done).await.unwrap();
        repo.create(task("Pending task", &owner, None, 1)).await.unwrap();
        repo.create(task("Foreign task", &RecordId::generate(), None, 1))
            .await
            .unwrap();

        let mine = repo
            .list(TaskFilter {
                user_id: Some(owner.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);

        let open = repo
            .list(TaskFilter {
                user_id: Some(owner),
                completed: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].title, "Pending task");
    }
}
