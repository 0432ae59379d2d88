//! Task repository over a [`DurableStore`].
//!
//! Each user's collection is stored as one serialized list under
//! [`tasks_key`], next to a one-time initialization marker under
//! [`initialized_key`]. The two keys are reconciled by a single rule: sample
//! tasks are generated only when neither the marker nor a list exists;
//! otherwise a missing marker is simply written.
//!
//! Aggregate reads (`get_*`) are fail-soft and degrade to an empty result.
//! Writes propagate errors, and always load the current list strictly so a
//! failed read can never be mistaken for an empty collection and written
//! back over real data.

use std::collections::HashSet;

use chrono::Utc;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use taskdeck_proto::codec::{INITIALIZED_MARKER, decode_tasks, encode_tasks};
use taskdeck_proto::task::{Task, TaskFilter, TaskId, TaskPatch, TaskStats};

use super::TaskError;
use super::seed::generate_sample_tasks;
use crate::store::{DurableStore, initialized_key, tasks_key};

/// CRUD, bulk operations and derived views over per-user task collections.
pub struct TaskRepository<S> {
    store: S,
    /// Random source for sample generation.
    rng: Mutex<StdRng>,
    /// Serializes read-modify-write cycles and first-access seeding.
    gate: tokio::sync::Mutex<()>,
}

impl<S: DurableStore> TaskRepository<S> {
    /// Creates a repository whose sample data is seeded from OS entropy.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    /// Creates a repository with deterministic sample data.
    #[must_use]
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: S, rng: StdRng) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    /// Returns the user's tasks, oldest first, seeding them on first access.
    ///
    /// Fail-soft: store or decode failures are logged and yield an empty list.
    pub async fn get_user_tasks(&self, user_id: &str) -> Vec<Task> {
        self.load(user_id).await.unwrap_or_else(|err| {
            tracing::warn!(user_id, error = %err, "failed to load tasks, returning empty list");
            Vec::new()
        })
    }

    /// Returns the tasks visible under `filter`, oldest first.
    ///
    /// Fail-soft like [`get_user_tasks`](Self::get_user_tasks).
    pub async fn get_filtered_tasks(&self, user_id: &str, filter: TaskFilter) -> Vec<Task> {
        self.fetch_filtered_tasks(user_id, filter)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(user_id, %filter, error = %err, "failed to filter tasks, returning empty list");
                Vec::new()
            })
    }

    /// Counts the user's tasks by status.
    ///
    /// Fail-soft: returns zeros on failure.
    pub async fn get_task_stats(&self, user_id: &str) -> TaskStats {
        self.fetch_task_stats(user_id).await.unwrap_or_else(|err| {
            tracing::warn!(user_id, error = %err, "failed to compute task stats, returning zeros");
            TaskStats::default()
        })
    }

    /// Like [`get_filtered_tasks`](Self::get_filtered_tasks), but surfaces
    /// read failures.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoreRead`] if the collection cannot be read.
    pub async fn fetch_filtered_tasks(
        &self,
        user_id: &str,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, TaskError> {
        let mut tasks = self.load(user_id).await?;
        tasks.retain(|t| filter.matches(t.status));
        Ok(tasks)
    }

    /// Like [`get_task_stats`](Self::get_task_stats), but surfaces read
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoreRead`] if the collection cannot be read.
    pub async fn fetch_task_stats(&self, user_id: &str) -> Result<TaskStats, TaskError> {
        Ok(TaskStats::from_tasks(&self.load(user_id).await?))
    }

    /// Looks up a single task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if the user has no task with this id,
    /// or [`TaskError::StoreRead`] if the collection cannot be read.
    pub async fn find_task(&self, user_id: &str, task_id: &TaskId) -> Result<Task, TaskError> {
        self.load(user_id)
            .await?
            .into_iter()
            .find(|t| t.id == *task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.clone()))
    }

    // -----------------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------------

    /// Appends a new pending task created now.
    ///
    /// Input is not validated here; see
    /// [`TaskDraft`](taskdeck_proto::draft::TaskDraft).
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoreRead`] or [`TaskError::StoreWrite`] if the
    /// collection cannot be loaded or saved.
    pub async fn add_task(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
    ) -> Result<Task, TaskError> {
        let _gate = self.gate.lock().await;
        let mut tasks = self.load_locked(user_id).await?;

        let task = Task::new(user_id, title, description, Utc::now());
        tasks.push(task.clone());
        self.save(user_id, &tasks).await?;

        tracing::info!(user_id, task_id = %task.id, "task added");
        Ok(task)
    }

    /// Shallow-merges `patch` into the task with `task_id`.
    ///
    /// Returns `Ok(None)` if the user has no such task. An empty patch
    /// returns the task without rewriting the collection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoreRead`] or [`TaskError::StoreWrite`] if the
    /// collection cannot be loaded or saved.
    pub async fn update_task(
        &self,
        user_id: &str,
        task_id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, TaskError> {
        let _gate = self.gate.lock().await;
        let mut tasks = self.load_locked(user_id).await?;

        let Some(task) = tasks.iter_mut().find(|t| t.id == *task_id) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(task.clone()));
        }
        task.apply(patch);
        let updated = task.clone();
        self.save(user_id, &tasks).await?;

        tracing::info!(user_id, %task_id, "task updated");
        Ok(Some(updated))
    }

    /// Removes a single task, returning whether it existed.
    ///
    /// # Errors
    ///
    /// See [`delete_tasks`](Self::delete_tasks).
    pub async fn delete_task(&self, user_id: &str, task_id: &TaskId) -> Result<bool, TaskError> {
        Ok(self
            .delete_tasks(user_id, std::slice::from_ref(task_id))
            .await?
            > 0)
    }

    /// Removes every task whose id is in `task_ids`.
    ///
    /// Unknown ids are ignored. Returns the number of tasks removed; the
    /// collection is only rewritten when that number is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoreRead`] or [`TaskError::StoreWrite`] if the
    /// collection cannot be loaded or saved.
    pub async fn delete_tasks(&self, user_id: &str, task_ids: &[TaskId]) -> Result<usize, TaskError> {
        let wanted: HashSet<&TaskId> = task_ids.iter().collect();

        let _gate = self.gate.lock().await;
        let mut tasks = self.load_locked(user_id).await?;

        let before = tasks.len();
        tasks.retain(|t| !wanted.contains(&t.id));
        let deleted = before - tasks.len();

        if deleted > 0 {
            self.save(user_id, &tasks).await?;
            tracing::info!(user_id, deleted, "tasks deleted");
        }
        Ok(deleted)
    }

    /// Marks every pending task whose id is in `task_ids` as completed.
    ///
    /// Tasks that are already completed are neither counted nor rewritten.
    /// Returns the number of tasks transitioned; the collection is only
    /// rewritten when that number is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoreRead`] or [`TaskError::StoreWrite`] if the
    /// collection cannot be loaded or saved.
    pub async fn mark_tasks_as_completed(
        &self,
        user_id: &str,
        task_ids: &[TaskId],
    ) -> Result<usize, TaskError> {
        let wanted: HashSet<&TaskId> = task_ids.iter().collect();

        let _gate = self.gate.lock().await;
        let mut tasks = self.load_locked(user_id).await?;

        let mut completed = 0;
        for task in tasks.iter_mut().filter(|t| wanted.contains(&t.id)) {
            if task.complete() {
                completed += 1;
            }
        }

        if completed > 0 {
            self.save(user_id, &tasks).await?;
            tracing::info!(user_id, completed, "tasks completed");
        }
        Ok(completed)
    }

    /// Deletes the user's collection and initialization marker.
    ///
    /// The next access behaves like a first login and seeds again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StoreWrite`] if either key cannot be removed.
    pub async fn clear_user(&self, user_id: &str) -> Result<(), TaskError> {
        let _gate = self.gate.lock().await;
        for key in [tasks_key(user_id), initialized_key(user_id)] {
            self.store
                .delete(&key)
                .await
                .map_err(|e| TaskError::StoreWrite(e.to_string()))?;
        }
        tracing::info!(user_id, "user tasks cleared");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Loads the collection, taking the gate only when seeding or marker
    /// reconciliation may be needed.
    async fn load(&self, user_id: &str) -> Result<Vec<Task>, TaskError> {
        if self.is_initialized(user_id).await?
            && let Some(tasks) = self.read_tasks(user_id).await?
        {
            return Ok(tasks);
        }

        let _gate = self.gate.lock().await;
        self.load_locked(user_id).await
    }

    /// Loads the collection, seeding or marking as needed. Caller holds the
    /// gate.
    async fn load_locked(&self, user_id: &str) -> Result<Vec<Task>, TaskError> {
        let initialized = self.is_initialized(user_id).await?;

        match self.read_tasks(user_id).await? {
            Some(tasks) => {
                if !initialized {
                    self.mark_initialized(user_id).await;
                }
                Ok(tasks)
            }
            None if initialized => Ok(Vec::new()),
            None => self.seed(user_id).await,
        }
    }

    /// Generates and stores the sample collection, then writes the marker.
    async fn seed(&self, user_id: &str) -> Result<Vec<Task>, TaskError> {
        let tasks = {
            let mut rng = self.rng.lock();
            generate_sample_tasks(&mut *rng, user_id, Utc::now())
        };

        self.save(user_id, &tasks).await?;
        self.mark_initialized(user_id).await;

        tracing::info!(user_id, count = tasks.len(), "seeded sample tasks");
        Ok(tasks)
    }

    async fn is_initialized(&self, user_id: &str) -> Result<bool, TaskError> {
        self.store
            .read(&initialized_key(user_id))
            .await
            .map(|marker| marker.is_some())
            .map_err(|e| TaskError::StoreRead(e.to_string()))
    }

    /// Writes the marker. A failure is logged, not returned: the list is
    /// already stored, so the next access reconciles without reseeding.
    async fn mark_initialized(&self, user_id: &str) {
        if let Err(err) = self
            .store
            .write(&initialized_key(user_id), INITIALIZED_MARKER)
            .await
        {
            tracing::warn!(user_id, error = %err, "failed to write initialization marker");
        }
    }

    /// Reads and decodes the stored list, oldest first.
    async fn read_tasks(&self, user_id: &str) -> Result<Option<Vec<Task>>, TaskError> {
        let Some(text) = self
            .store
            .read(&tasks_key(user_id))
            .await
            .map_err(|e| TaskError::StoreRead(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut tasks = decode_tasks(&text).map_err(|e| TaskError::StoreRead(e.to_string()))?;
        tasks.sort_by_key(|t| t.created_at);
        Ok(Some(tasks))
    }

    async fn save(&self, user_id: &str, tasks: &[Task]) -> Result<(), TaskError> {
        let text = encode_tasks(tasks).map_err(|e| TaskError::StoreWrite(e.to_string()))?;
        self.store
            .write(&tasks_key(user_id), &text)
            .await
            .map_err(|e| TaskError::StoreWrite(e.to_string()))
    }
}
