use chrono::Utc;
use database::RecordId;
use domain_users::UserRepository;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, MAX_LEVEL, Task, TaskFilter, UpdateTask};
use crate::repository::TaskRepository;

const MAX_DESCRIPTION_LEN: usize = 256;

/// Service layer for Task business logic.
///
/// Stateless: every call re-resolves the entities it touches, so rules
/// are always checked against current state.
pub struct TaskService<T: TaskRepository, U: UserRepository> {
    tasks: Arc<T>,
    users: Arc<U>,
    /// Serializes tree-shaped mutations: the depth checks, the write, and
    /// the descendant cascade must observe a stable tree.
    tree_gate: Arc<Mutex<()>>,
}

// Manual impl: every field is Arc-backed, so cloning must not require
// the repositories to be `Clone`.
impl<T: TaskRepository, U: UserRepository> Clone for TaskService<T, U> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            users: Arc::clone(&self.users),
            tree_gate: Arc::clone(&self.tree_gate),
        }
    }
}

impl<T: TaskRepository, U: UserRepository> TaskService<T, U> {
    pub fn new(tasks: T, users: U) -> Self {
        Self {
            tasks: Arc::new(tasks),
            users: Arc::new(users),
            tree_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Create a new task for an owner.
    ///
    /// Checks, in order: the owner exists, the title is free for that
    /// owner, and the parent (when given) exists, belongs to the same
    /// owner, and sits above the depth ceiling. The task's level is
    /// derived from the parent, never taken from input.
    pub async fn create_task(&self, owner_id: RecordId, input: CreateTask) -> TaskResult<Task> {
        self.users
            .get_by_id(&owner_id)
            .await
            .map_err(|e| TaskError::Internal(e.to_string()))?
            .ok_or_else(|| TaskError::UserNotFound(owner_id.clone()))?;

        if self
            .tasks
            .find_by_title(&owner_id, &input.title)
            .await?
            .is_some()
        {
            return Err(TaskError::DuplicateTitle(input.title));
        }

        // Hanging a child off a parent reads that parent's level; hold the
        // gate so a concurrent move cannot shift it under us.
        let _tree = match input.parent_id {
            Some(_) => Some(self.tree_gate.lock().await),
            None => None,
        };

        let level = match input.parent_id {
            Some(ref parent_id) => {
                let parent = self.resolve_parent(&owner_id, parent_id).await?;
                parent.level + 1
            }
            None => 1,
        };

        let mut task = Task::new(input, owner_id, level);

        // The uniqueness pre-check races against concurrent creates; the
        // store's unique index is authoritative. Retry once with a fresh
        // id in case the collision was on the generated id itself.
        match self.tasks.create(task.clone()).await {
            Ok(created) => Ok(created),
            Err(TaskError::Constraint(_)) => {
                task.id = RecordId::generate();
                self.tasks.create(task).await.map_err(|e| match e {
                    TaskError::Constraint(_) => TaskError::DuplicateTitle("title taken".to_string()),
                    other => other,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: &RecordId) -> TaskResult<Task> {
        self.tasks
            .get_by_id(id)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }

    /// List tasks with filters
    pub async fn list_tasks(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        self.tasks.list(filter).await
    }

    /// Update a task.
    ///
    /// Absent fields keep their current value, so the same path serves
    /// both full update and partial patch. Re-parenting re-derives the
    /// level, rejects cycles and depth-ceiling violations, and re-levels
    /// the whole subtree so children stay exactly one level below their
    /// parent.
    pub async fn update_task(&self, id: &RecordId, input: UpdateTask) -> TaskResult<Task> {
        if input.is_empty() {
            return self.get_task(id).await;
        }

        // Re-parenting spans several reads and writes; hold the gate so a
        // concurrent create cannot slip a child in between the depth check
        // and the cascade.
        let _tree = match input.parent_id {
            Some(_) => Some(self.tree_gate.lock().await),
            None => None,
        };

        let mut task = self.get_task(id).await?;

        if let Some(Some(ref description)) = input.description
            && description.chars().count() > MAX_DESCRIPTION_LEN
        {
            return Err(TaskError::Validation(format!(
                "description cannot exceed {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }

        // Check for duplicate title if title is being changed
        if let Some(ref new_title) = input.title
            && new_title != &task.title
            && let Some(existing) = self.tasks.find_by_title(&task.user_id, new_title).await?
            && existing.id != task.id
        {
            return Err(TaskError::DuplicateTitle(new_title.clone()));
        }

        let mut new_level = task.level;
        match input.parent_id {
            // Field absent: hierarchy untouched.
            None => {}
            // Sent as null: detach, task becomes a root.
            Some(None) => {
                task.parent_id = None;
                new_level = 1;
            }
            Some(Some(ref parent_id)) => {
                if parent_id == &task.id {
                    return Err(TaskError::CycleDetected);
                }
                let parent = self.resolve_parent(&task.user_id, parent_id).await?;
                self.ensure_not_descendant(&task.id, &parent).await?;
                task.parent_id = Some(parent_id.clone());
                new_level = parent.level + 1;
            }
        }

        if new_level != task.level {
            // A moved subtree must still fit under the ceiling.
            let depth_below = self.subtree_depth(&task.id).await?;
            if new_level + depth_below > MAX_LEVEL {
                return Err(TaskError::MaxDepthExceeded);
            }
            task.level = new_level;
        }

        task.apply_update(input);
        let updated = self.tasks.update(task).await?;
        self.relevel_descendants(&updated).await?;

        Ok(updated)
    }

    /// Partial update; shares semantics with [`Self::update_task`].
    pub async fn patch_task(&self, id: &RecordId, input: UpdateTask) -> TaskResult<Task> {
        self.update_task(id, input).await
    }

    /// Delete a task.
    ///
    /// Deletion of a task that still has subtasks is rejected; callers
    /// must delete leaves first.
    pub async fn delete_task(&self, id: &RecordId) -> TaskResult<()> {
        // The children check and the delete must see the same tree.
        let _tree = self.tree_gate.lock().await;

        self.get_task(id).await?;

        if self.tasks.has_children(id).await? {
            return Err(TaskError::SubtasksExist(id.clone()));
        }

        let deleted = self.tasks.delete(id).await?;
        if !deleted {
            return Err(TaskError::NotFound(id.clone()));
        }

        Ok(())
    }

    // Hierarchy helpers

    /// Resolve a parent task: it must exist, belong to the same owner,
    /// and sit below the depth ceiling.
    async fn resolve_parent(&self, owner_id: &RecordId, parent_id: &RecordId) -> TaskResult<Task> {
        let parent = self
            .tasks
            .get_by_id(parent_id)
            .await?
            .ok_or_else(|| TaskError::ParentNotFound(parent_id.clone()))?;

        if &parent.user_id != owner_id {
            return Err(TaskError::ParentNotFound(parent_id.clone()));
        }
        if parent.level >= MAX_LEVEL {
            return Err(TaskError::MaxDepthExceeded);
        }

        Ok(parent)
    }

    /// Walk the ancestor chain of `parent` and fail if `task_id` appears.
    ///
    /// The chain is bounded by the depth ceiling, so the walk terminates
    /// even against corrupted data.
    async fn ensure_not_descendant(&self, task_id: &RecordId, parent: &Task) -> TaskResult<()> {
        let mut current = parent.parent_id.clone();
        let mut hops = 0;

        while let Some(ancestor_id) = current {
            if &ancestor_id == task_id {
                return Err(TaskError::CycleDetected);
            }
            hops += 1;
            if hops > MAX_LEVEL {
                break;
            }
            current = self
                .tasks
                .get_by_id(&ancestor_id)
                .await?
                .and_then(|t| t.parent_id);
        }

        Ok(())
    }

    /// Number of levels below a task (0 for a leaf), capped at the ceiling.
    async fn subtree_depth(&self, id: &RecordId) -> TaskResult<i32> {
        let mut depth = 0;
        let mut frontier = self.tasks.list_children(id).await?;

        while !frontier.is_empty() && depth <= MAX_LEVEL {
            depth += 1;
            let mut next = Vec::new();
            for task in &frontier {
                next.extend(self.tasks.list_children(&task.id).await?);
            }
            frontier = next;
        }

        Ok(depth)
    }

    /// Push corrected levels down the subtree after a move.
    async fn relevel_descendants(&self, root: &Task) -> TaskResult<()> {
        let mut frontier = vec![root.clone()];

        while let Some(parent) = frontier.pop() {
            for mut child in self.tasks.list_children(&parent.id).await? {
                if child.level != parent.level + 1 {
                    child.level = parent.level + 1;
                    child.updated_at = Utc::now();
                    self.tasks.update(child.clone()).await?;
                }
                frontier.push(child);
            }
        }

        Ok(())
    }
}
