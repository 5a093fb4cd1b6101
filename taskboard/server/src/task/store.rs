use super::{NewTask, Task};

/// Storage seam for tasks.
///
/// Implementations keep tasks in creation order and own the id counter.
#[cfg_attr(test, mockall::automock)]
pub trait TaskStore {
    /// Returns every stored task in creation order.
    fn all(&self) -> Vec<Task>;

    fn find(&self, id: u64) -> Option<Task>;

    /// Assigns the next id to `draft` and appends it.
    fn insert(&mut self, draft: NewTask) -> Task;

    /// Overwrites the stored task with the same id. Returns `false` if there is none.
    fn save(&mut self, task: Task) -> bool;

    fn remove(&mut self, id: u64) -> Option<Task>;

    /// Drops every task and resets the id counter. Returns how many tasks were dropped.
    fn clear(&mut self) -> usize;
}

/// Process-local task storage backed by a `Vec`.
#[derive(Debug)]
pub struct InMemoryTaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    fn find(&self, id: u64) -> Option<Task> {
        self.tasks.iter().find(|task| task.id() == id).cloned()
    }

    fn insert(&mut self, draft: NewTask) -> Task {
        let task = draft.into_task(self.next_id);
        self.next_id += 1;
        self.tasks.push(task.clone());
        task
    }

    fn save(&mut self, task: Task) -> bool {
        match self.position(task.id()) {
            Some(index) => {
                self.tasks[index] = task;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: u64) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    fn clear(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        self.next_id = 1;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn draft(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn can_create_empty_store() {
        let store = InMemoryTaskStore::new();

        assert!(store.all().is_empty());
    }

    #[test]
    fn assigns_sequential_ids_starting_at_one() {
        let mut store = InMemoryTaskStore::new();

        let first = store.insert(draft("Task 1"));
        let second = store.insert(draft("Task 2"));

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(store.find(2), Some(second));
    }

    #[test]
    fn never_reuses_ids_after_single_delete() {
        let mut store = InMemoryTaskStore::new();
        store.insert(draft("Task 1"));
        let second = store.insert(draft("Task 2"));

        assert_eq!(store.remove(second.id()), Some(second));
        let third = store.insert(draft("Task 3"));

        assert_eq!(third.id(), 3);
    }

    #[test]
    fn clear_resets_id_counter() {
        let mut store = InMemoryTaskStore::new();
        store.insert(draft("Task 1"));
        store.insert(draft("Task 2"));

        assert_eq!(store.clear(), 2);
        assert!(store.all().is_empty());
        assert_eq!(store.insert(draft("Task 3")).id(), 1);
    }

    #[test]
    fn keeps_creation_order() {
        let mut store = InMemoryTaskStore::new();
        store.insert(draft("Task 1"));
        store.insert(draft("Task 2"));
        store.insert(draft("Task 3"));
        store.remove(2);

        let titles: Vec<String> = store.all().iter().map(|t| t.title().to_string()).collect();

        assert_eq!(titles, vec!["Task 1", "Task 3"]);
    }

    #[test]
    fn save_replaces_existing_task_in_place() {
        let mut store = InMemoryTaskStore::new();
        store.insert(draft("Task 1"));
        let mut task = store.insert(draft("Task 2"));
        store.insert(draft("Task 3"));

        task.status = TaskStatus::Done;
        assert!(store.save(task.clone()));

        assert_eq!(store.all()[1], task);
    }

    #[test]
    fn save_and_remove_report_missing_tasks() {
        let mut store = InMemoryTaskStore::new();

        assert!(!store.save(draft("Ghost").into_task(42)));
        assert_eq!(store.remove(42), None);
    }
}
