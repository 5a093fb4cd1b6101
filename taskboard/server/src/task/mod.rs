use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::clock::{Clock, SystemClock};

pub mod api;
pub mod store;
pub mod validation;

pub use store::{InMemoryTaskStore, TaskStore};
pub use validation::ValidationError;

use validation::{
    validate_description, validate_patched_title, validate_priority, validate_status,
    validate_task_data,
};

/// Workflow state of a task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(ValidationError::InvalidStatus),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ValidationError::InvalidPriority),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    pub(crate) id: u64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) status: TaskStatus,
    pub(crate) priority: TaskPriority,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Task {
    /// Returns the ID of the task.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns when the task was created. Never changes afterwards.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the task was created or last modified.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// A validated task that has not been given an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    pub fn into_task(self, id: u64) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Unvalidated input for creating a task.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// Unvalidated input for updating a task.
///
/// The outer `None` leaves the field untouched; `Some(None)` means the field
/// was supplied as null.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub status: Option<Option<String>>,
    pub priority: Option<Option<String>>,
}

/// Exact-match filters for listing tasks. Empty values are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let status_matches = match self.status.as_deref() {
            Some(status) if !status.is_empty() => task.status.as_str() == status,
            _ => true,
        };
        let priority_matches = match self.priority.as_deref() {
            Some(priority) if !priority.is_empty() => task.priority.as_str() == priority,
            _ => true,
        };
        status_matches && priority_matches
    }
}

/// Error type for TaskService operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a task id that is not in the store.
    #[error("Task with ID {0} not found")]
    TaskNotFound(u64),
    /// Represents a broken field rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateMode {
    Replace,
    Patch,
}

struct ValidatedChanges {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
}

impl ValidatedChanges {
    fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        task.updated_at = now;
    }
}

/// Task operations over an owned store.
///
/// The store sits behind one async mutex, so each operation sees and leaves
/// the store in a consistent state even when requests arrive concurrently.
pub struct TaskService {
    store: Mutex<Box<dyn TaskStore + Send>>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(store: Box<dyn TaskStore + Send>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
        }
    }

    /// Creates a service over an empty in-memory store and the system clock.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryTaskStore::new()), Arc::new(SystemClock))
    }

    /// Returns the tasks matching `filter` in creation order.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        let store = self.store.lock().await;
        store
            .all()
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect()
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, id: u64) -> Result<Task, TaskServiceError> {
        let store = self.store.lock().await;
        store.find(id).ok_or(TaskServiceError::TaskNotFound(id))
    }

    /// Validates `input` and stores it as a new task.
    ///
    /// Rules are checked in order (title, description, status, priority) and
    /// the first failure is returned.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, input: CreateTask) -> Result<Task, TaskServiceError> {
        validate_task_data(input.title.as_deref(), input.description.as_deref())?;
        let status = input
            .status
            .as_deref()
            .map(validate_status)
            .transpose()?
            .unwrap_or_default();
        let priority = input
            .priority
            .as_deref()
            .map(validate_priority)
            .transpose()?
            .unwrap_or_default();

        let draft = NewTask {
            title: input.title.as_deref().unwrap_or_default().trim().to_string(),
            description: input
                .description
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string(),
            status,
            priority,
            created_at: self.clock.now(),
        };

        let mut store = self.store.lock().await;
        let task = store.insert(draft);
        tracing::info!("Created task {}", task.id());
        Ok(task)
    }

    /// Full update: a supplied title is checked with the creation rules.
    #[tracing::instrument(skip(self))]
    pub async fn replace_task(
        &self,
        id: u64,
        changes: TaskChanges,
    ) -> Result<Task, TaskServiceError> {
        self.update_task(id, changes, UpdateMode::Replace).await
    }

    /// Partial update: a supplied blank title is reported as empty rather than missing.
    #[tracing::instrument(skip(self))]
    pub async fn patch_task(&self, id: u64, changes: TaskChanges) -> Result<Task, TaskServiceError> {
        self.update_task(id, changes, UpdateMode::Patch).await
    }

    async fn update_task(
        &self,
        id: u64,
        changes: TaskChanges,
        mode: UpdateMode,
    ) -> Result<Task, TaskServiceError> {
        let mut store = self.store.lock().await;
        let mut task = store.find(id).ok_or(TaskServiceError::TaskNotFound(id))?;

        let validated = validate_changes(changes, mode)?;
        validated.apply(&mut task, self.clock.now());

        if !store.save(task.clone()) {
            return Err(TaskServiceError::TaskNotFound(id));
        }
        tracing::info!("Updated task {}", id);
        Ok(task)
    }

    /// Removes a task and returns it as it was before removal.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: u64) -> Result<Task, TaskServiceError> {
        let mut store = self.store.lock().await;
        let task = store.remove(id).ok_or(TaskServiceError::TaskNotFound(id))?;
        tracing::info!("Deleted task {}", id);
        Ok(task)
    }

    /// Removes every task and restarts ids at 1. Returns the number removed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_all_tasks(&self) -> usize {
        let mut store = self.store.lock().await;
        let count = store.clear();
        tracing::warn!("Deleted all {} tasks", count);
        count
    }
}

fn validate_changes(
    changes: TaskChanges,
    mode: UpdateMode,
) -> Result<ValidatedChanges, ValidationError> {
    let description = changes.description.as_ref().and_then(Option::as_deref);
    match (&changes.title, mode) {
        (Some(title), UpdateMode::Replace) => validate_task_data(title.as_deref(), description)?,
        (Some(title), UpdateMode::Patch) => {
            validate_patched_title(title.as_deref().unwrap_or_default())?;
            description.map(validate_description).transpose()?;
        }
        (None, _) => {
            description.map(validate_description).transpose()?;
        }
    }
    let status = changes
        .status
        .map(|status| validate_status(status.as_deref().ok_or(ValidationError::InvalidStatus)?))
        .transpose()?;
    let priority = changes
        .priority
        .map(|priority| {
            validate_priority(priority.as_deref().ok_or(ValidationError::InvalidPriority)?)
        })
        .transpose()?;

    Ok(ValidatedChanges {
        title: changes
            .title
            .flatten()
            .map(|title| title.trim().to_string()),
        // A null description clears it.
        description: changes
            .description
            .map(|description| description.unwrap_or_default().trim().to_string()),
        status,
        priority,
    })
}
