use chrono::{DateTime, Utc};
use database::{Record, RecordId};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Maximum depth of the task tree.
///
/// A task at this level may not accept children, so the deepest possible
/// task sits at `level == MAX_LEVEL`. Roots sit at level 1.
pub const MAX_LEVEL: i32 = 4;

/// Task priority, highest first
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Priority {
    /// Drop everything
    Urgency,
    /// Needs doing soon
    Need,
    /// An obligation
    Duty,
    /// Nice to have
    #[default]
    Want,
}

/// Task entity - a unit of work, optionally nested under a parent task
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Unique identifier
    pub id: RecordId,
    /// Title (unique per owner)
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Whether the task is done
    pub completed: bool,
    /// Priority bucket
    pub priority: Priority,
    /// Depth in the tree: 1 for roots, parent level + 1 otherwise
    pub level: i32,
    /// When work started
    pub started_at: Option<DateTime<Utc>>,
    /// Planned end
    pub end_at: Option<DateTime<Utc>>,
    /// When work actually finished
    pub finished_at: Option<DateTime<Utc>>,
    /// Owner of the task
    pub user_id: RecordId,
    /// Parent task, if nested
    pub parent_id: Option<RecordId>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Record for Task {
    fn id(&self) -> &RecordId {
        &self.id
    }

    /// `(title, user_id)` forms a unique index: the same owner may not
    /// have two tasks with the same title, different owners may.
    fn conflicts_with(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.title == other.title
    }
}

impl Task {
    /// Create a new task for an owner at an already-derived level.
    ///
    /// The service derives `level` from the parent chain before calling.
    pub fn new(input: CreateTask, user_id: RecordId, level: i32) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::generate(),
            title: input.title,
            description: input.description,
            completed: input.completed,
            priority: input.priority,
            level,
            started_at: input.started_at,
            end_at: input.end_at,
            finished_at: None,
            user_id,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the scalar fields of an UpdateTask.
    ///
    /// Hierarchy fields (`parent_id`, `level`) are derived by the service
    /// and deliberately not touched here. Absent fields keep their value;
    /// nullable fields sent as `null` are cleared.
    pub fn apply_update(&mut self, update: UpdateTask) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(started_at) = update.started_at {
            self.started_at = started_at;
        }
        if let Some(end_at) = update.end_at {
            self.end_at = end_at;
        }
        if let Some(finished_at) = update.finished_at {
            self.finished_at = finished_at;
        }
        self.updated_at = Utc::now();
    }
}

/// DTO for creating a new task
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTask {
    #[validate(length(min = 5, max = 100))]
    pub title: String,
    #[validate(length(max = 256))]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    pub started_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    /// Owner; administrators may create tasks for other users.
    /// Defaults to the authenticated caller.
    pub user_id: Option<RecordId>,
    pub parent_id: Option<RecordId>,
}

/// Deserializes a field that distinguishes "absent" from "sent as null":
/// the outer Option marks presence, the inner one carries the JSON value.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// DTO for updating an existing task.
///
/// Serves both full update and partial patch: absent fields keep their
/// current value. Nullable fields use `Option<Option<T>>` so "not sent"
/// and "sent as null" stay distinct.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTask {
    #[validate(length(min = 5, max = 100))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub started_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub end_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub finished_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<Option<RecordId>>,
}

impl UpdateTask {
    /// True when no field was supplied, making the update a no-op.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.started_at.is_none()
            && self.end_at.is_none()
            && self.finished_at.is_none()
            && self.parent_id.is_none()
    }
}

/// Query filters for listing tasks
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct TaskFilter {
    pub user_id: Option<RecordId>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    100
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            completed: None,
            priority: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}
