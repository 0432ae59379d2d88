//! Per-screen task session: loaded view, filter, selection and status.
//!
//! [`TodoSession`] sits between a UI and the [`TaskRepository`]. It holds
//! the currently loaded (filtered and sorted) tasks, aggregate stats, the
//! multi-select selection, and a single loading flag and error message.
//! Every mutation goes through the repository and is followed by a reload,
//! so the repository stays the single source of truth.
//!
//! Loads are tagged with a monotonically increasing ticket. A load that
//! completes after a newer one was issued is discarded, so a slow response
//! for an old filter cannot overwrite the view of a newer one.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use taskdeck_proto::draft::TaskDraft;
use taskdeck_proto::task::{Task, TaskFilter, TaskId, TaskStats};

use crate::auth::AuthProvider;
use crate::store::DurableStore;
use crate::tasks::{TaskError, TaskRepository};

/// Default minimum latency before a bulk deletion is issued.
pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_secs(1);

/// Session tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Minimum time between a delete request and the deletion itself.
    pub delete_delay: Duration,
    /// Filter active before the first [`TodoSession::apply_filter`].
    pub initial_filter: TaskFilter,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delete_delay: DEFAULT_DELETE_DELAY,
            initial_filter: TaskFilter::Pending,
        }
    }
}

/// Point-in-time copy of the session state for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Loaded tasks in display order.
    pub tasks: Vec<Task>,
    /// Whether an operation is in flight.
    pub loading: bool,
    /// Human-readable message of the last failure.
    pub error: Option<String>,
    /// Counts over the user's full collection.
    pub stats: TaskStats,
    /// Selected task ids, sorted.
    pub selected: Vec<TaskId>,
    /// Whether multi-select mode is active.
    pub multi_select: bool,
    /// Active filter.
    pub filter: TaskFilter,
}

#[derive(Debug, Default)]
struct SessionState {
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    stats: TaskStats,
    selection: BTreeSet<TaskId>,
    multi_select: bool,
    filter: TaskFilter,
    /// Ticket of the most recently issued load.
    latest_load: u64,
}

impl SessionState {
    fn is_loaded(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == *id)
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.multi_select = false;
    }
}

/// Session controller over one user's tasks.
pub struct TodoSession<S, A> {
    repository: Arc<TaskRepository<S>>,
    auth: A,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl<S: DurableStore, A: AuthProvider> TodoSession<S, A> {
    /// Creates an idle session. Nothing is loaded until [`load`](Self::load)
    /// or [`apply_filter`](Self::apply_filter) is called.
    #[must_use]
    pub fn new(repository: Arc<TaskRepository<S>>, auth: A, config: SessionConfig) -> Self {
        Self {
            repository,
            auth,
            config,
            state: Mutex::new(SessionState {
                filter: config.initial_filter,
                ..SessionState::default()
            }),
        }
    }

    /// The repository this session drives.
    #[must_use]
    pub fn repository(&self) -> &Arc<TaskRepository<S>> {
        &self.repository
    }

    /// The auth provider this session reads the current user from.
    #[must_use]
    pub const fn auth(&self) -> &A {
        &self.auth
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Loads the tasks visible under `filter` together with fresh stats.
    ///
    /// Without a signed-in user the view is emptied and any load still in
    /// flight is invalidated. On failure the error is recorded and the
    /// previously loaded tasks stay visible.
    pub async fn load(&self, filter: TaskFilter) {
        let Some(user_id) = self.auth.current_user_id() else {
            let mut state = self.state.lock();
            state.latest_load += 1;
            state.loading = false;
            state.tasks.clear();
            state.stats = TaskStats::default();
            state.clear_selection();
            return;
        };

        let ticket = self.begin_load();
        tracing::debug!(user_id, %filter, ticket, "loading tasks");

        let result = tokio::try_join!(
            self.repository.fetch_filtered_tasks(&user_id, filter),
            self.repository.fetch_task_stats(&user_id),
        );
        self.finish_load(ticket, filter, result);
    }

    /// Clears the error and reloads the current filter.
    pub async fn retry(&self) {
        self.clear_error();
        self.load(self.current_filter()).await;
    }

    /// Issues a new load ticket and marks the session as loading.
    fn begin_load(&self) -> u64 {
        let mut state = self.state.lock();
        state.latest_load += 1;
        state.loading = true;
        state.error = None;
        state.latest_load
    }

    /// Applies a load result unless a newer load was issued since.
    ///
    /// Returns whether the result was applied.
    fn finish_load(
        &self,
        ticket: u64,
        filter: TaskFilter,
        result: Result<(Vec<Task>, TaskStats), TaskError>,
    ) -> bool {
        let mut state = self.state.lock();
        if ticket != state.latest_load {
            tracing::debug!(ticket, latest = state.latest_load, "discarding stale load");
            return false;
        }

        match result {
            Ok((mut tasks, stats)) => {
                filter.sort(&mut tasks);
                state.selection.retain(|id| tasks.iter().any(|t| t.id == *id));
                if state.selection.is_empty() {
                    state.multi_select = false;
                }
                state.tasks = tasks;
                state.stats = stats;
                state.loading = false;
                state.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load tasks");
                state.loading = false;
                state.error = Some(format!("Could not load tasks: {err}"));
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Adds a task and reloads the current view.
    ///
    /// Returns `false` if no user is signed in or the repository failed.
    pub async fn add_task(&self, draft: &TaskDraft) -> bool {
        let Some(user_id) = self.auth.current_user_id() else {
            return false;
        };

        self.state.lock().loading = true;
        match self
            .repository
            .add_task(&user_id, draft.title(), draft.description())
            .await
        {
            Ok(_) => {
                self.load(self.current_filter()).await;
                true
            }
            Err(err) => {
                self.fail("Could not add task", &err);
                false
            }
        }
    }

    /// Deletes the given tasks after the configured minimum latency.
    ///
    /// On success the view is reloaded and the selection cleared. Returns
    /// whether anything was deleted.
    pub async fn delete_selected(&self, ids: &[TaskId]) -> bool {
        let Some(user_id) = self.auth.current_user_id() else {
            return false;
        };

        self.state.lock().loading = true;
        tokio::time::sleep(self.config.delete_delay).await;

        match self.repository.delete_tasks(&user_id, ids).await {
            Ok(0) => {
                self.state.lock().loading = false;
                false
            }
            Ok(_) => {
                self.load(self.current_filter()).await;
                self.state.lock().clear_selection();
                true
            }
            Err(err) => {
                self.fail("Could not delete tasks", &err);
                false
            }
        }
    }

    /// Completes the given tasks that are loaded and still pending.
    ///
    /// Ids of completed or unloaded tasks are dropped before the repository
    /// is called; if none remain the repository is not called at all.
    /// Returns whether anything was completed.
    pub async fn complete_selected(&self, ids: &[TaskId]) -> bool {
        let Some(user_id) = self.auth.current_user_id() else {
            return false;
        };

        let pending: Vec<TaskId> = {
            let state = self.state.lock();
            ids.iter()
                .filter(|id| state.tasks.iter().any(|t| t.id == **id && t.is_pending()))
                .cloned()
                .collect()
        };
        if pending.is_empty() {
            return false;
        }

        self.state.lock().loading = true;
        match self
            .repository
            .mark_tasks_as_completed(&user_id, &pending)
            .await
        {
            Ok(0) => {
                self.state.lock().loading = false;
                false
            }
            Ok(_) => {
                self.load(self.current_filter()).await;
                self.state.lock().clear_selection();
                true
            }
            Err(err) => {
                self.fail("Could not complete tasks", &err);
                false
            }
        }
    }

    fn fail(&self, context: &str, err: &TaskError) {
        tracing::warn!(error = %err, "{context}");
        let mut state = self.state.lock();
        state.loading = false;
        state.error = Some(format!("{context}: {err}"));
    }

    // -----------------------------------------------------------------------
    // Filter and selection
    // -----------------------------------------------------------------------

    /// Switches the filter, clearing the selection, and loads the new view.
    pub async fn apply_filter(&self, filter: TaskFilter) {
        {
            let mut state = self.state.lock();
            state.clear_selection();
            state.filter = filter;
        }
        self.load(filter).await;
    }

    /// Adds or removes `id` from the selection.
    ///
    /// Removing the last selected id leaves multi-select mode. Ids of tasks
    /// that are not loaded are ignored.
    pub fn toggle_selection(&self, id: &TaskId) {
        let mut state = self.state.lock();
        if state.selection.remove(id) {
            if state.selection.is_empty() {
                state.multi_select = false;
            }
        } else if state.is_loaded(id) {
            state.selection.insert(id.clone());
        }
    }

    /// Enters multi-select mode with exactly `id` selected.
    ///
    /// Any earlier selection is discarded. Ignored if `id` is not loaded.
    pub fn start_multi_select(&self, id: &TaskId) {
        let mut state = self.state.lock();
        if !state.is_loaded(id) {
            return;
        }
        state.selection = BTreeSet::from([id.clone()]);
        state.multi_select = true;
    }

    /// Selects every loaded task, or clears the selection if every loaded
    /// task is already selected.
    pub fn select_all(&self) {
        let mut state = self.state.lock();
        let all: BTreeSet<TaskId> = state.tasks.iter().map(|t| t.id.clone()).collect();
        if state.selection == all {
            state.selection.clear();
        } else {
            state.selection = all;
        }
    }

    /// Leaves multi-select mode and drops the selection.
    pub fn exit_multi_select(&self) {
        self.state.lock().clear_selection();
    }

    /// Clears the error without touching loaded data.
    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    /// Copies the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            tasks: state.tasks.clone(),
            loading: state.loading,
            error: state.error.clone(),
            stats: state.stats,
            selected: state.selection.iter().cloned().collect(),
            multi_select: state.multi_select,
            filter: state.filter,
        }
    }

    /// Active filter.
    #[must_use]
    pub fn current_filter(&self) -> TaskFilter {
        self.state.lock().filter
    }

    /// Whether at least one task is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.state.lock().selection.is_empty()
    }

    /// Number of selected tasks.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.state.lock().selection.len()
    }

    /// Selected task ids, sorted.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<TaskId> {
        self.state.lock().selection.iter().cloned().collect()
    }

    /// Whether multi-select mode is active.
    #[must_use]
    pub fn is_multi_select(&self) -> bool {
        self.state.lock().multi_select
    }

    /// Whether any selected task is still pending.
    #[must_use]
    pub fn can_complete(&self) -> bool {
        let state = self.state.lock();
        state
            .tasks
            .iter()
            .any(|t| t.is_pending() && state.selection.contains(&t.id))
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Message of the last failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }
}
