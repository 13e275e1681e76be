use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, instrument, warn};

use crate::domain::{
    common::{HistoryConfig, entities::app_errors::CoreError},
    food_history::{
        entities::FoodEntry,
        policies::validate_edit,
        ports::{DeleteConfirmation, FoodHistoryRepository, HistoryView},
        state::{Dedup, FetchTicket, HistorySnapshot, HistoryState},
        value_objects::{
            DeleteOutcome, FetchOutcome, FetchRequest, HistoryScope, SortOrder,
        },
    },
    refresh::RefreshSubscription,
};

/// Owns the food history shown by one list view and keeps it consistent with
/// the backend across fetches, sort and scope changes, edits and deletes.
///
/// Cloning is cheap and every clone drives the same state. State is only
/// touched inside short critical sections, never across an `.await`, so each
/// transition is atomic with respect to the others.
pub struct HistoryController<R> {
    repository: Arc<R>,
    confirmation: Arc<dyn DeleteConfirmation>,
    views: Arc<Vec<Arc<dyn HistoryView>>>,
    config: HistoryConfig,
    state: Arc<Mutex<HistoryState>>,
    snapshots: Arc<watch::Sender<HistorySnapshot>>,
}

impl<R> Clone for HistoryController<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            confirmation: Arc::clone(&self.confirmation),
            views: Arc::clone(&self.views),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            snapshots: Arc::clone(&self.snapshots),
        }
    }
}

impl<R> HistoryController<R>
where
    R: FoodHistoryRepository + 'static,
{
    pub fn new(
        repository: R,
        confirmation: Arc<dyn DeleteConfirmation>,
        config: HistoryConfig,
    ) -> Self {
        Self::with_scope(repository, confirmation, config, HistoryScope::All)
    }

    pub fn with_scope(
        repository: R,
        confirmation: Arc<dyn DeleteConfirmation>,
        config: HistoryConfig,
        scope: HistoryScope,
    ) -> Self {
        let state = HistoryState::new(SortOrder::default(), scope);
        let (sender, _) = watch::channel(state.snapshot());

        Self {
            repository: Arc::new(repository),
            confirmation,
            views: Arc::new(Vec::new()),
            config,
            state: Arc::new(Mutex::new(state)),
            snapshots: Arc::new(sender),
        }
    }

    /// Registers a list view that is scrolled back to the top whenever the
    /// list is about to be replaced by a sort or scope change.
    pub fn attach_view(mut self, view: Arc<dyn HistoryView>) -> Self {
        let mut views: Vec<_> = self.views.iter().cloned().collect();
        views.push(view);
        self.views = Arc::new(views);
        self
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<HistorySnapshot> {
        self.snapshots.subscribe()
    }

    /// Returns the one-shot message left by a failed edit or delete.
    pub fn take_notice(&self) -> Option<String> {
        self.update(HistoryState::take_notice)
    }

    pub async fn load_initial(&self) -> FetchOutcome {
        self.fetch(FetchRequest::page(1)).await
    }

    pub async fn refresh(&self) -> FetchOutcome {
        self.fetch(FetchRequest::refresh()).await
    }

    pub async fn load_more(&self) -> FetchOutcome {
        let request = match self.lock().next_page_request() {
            Ok(request) => request,
            Err(reason) => return FetchOutcome::Skipped(reason),
        };
        self.fetch(request).await
    }

    /// Re-runs the last dispatched fetch after a failure.
    pub async fn retry(&self) -> FetchOutcome {
        let request = match self.lock().retry_request() {
            Ok(request) => request,
            Err(reason) => return FetchOutcome::Skipped(reason),
        };
        self.fetch(request).await
    }

    #[instrument(skip(self), fields(page = request.page, refresh = request.is_refresh))]
    pub async fn fetch(&self, request: FetchRequest) -> FetchOutcome {
        self.dispatch(request, Dedup::Enforce).await
    }

    pub async fn change_sort(&self, order: SortOrder) -> FetchOutcome {
        if let Err(reason) = self.update(|state| state.begin_sort_change(order)) {
            debug!(?reason, %order, "sort change ignored");
            return FetchOutcome::Skipped(reason);
        }

        self.scroll_views_to_origin();
        let outcome = self
            .dispatch(FetchRequest::refresh().with_sort(order), Dedup::Bypass)
            .await;
        self.update(HistoryState::end_sort_change);
        outcome
    }

    /// Scope changes are always user-initiated, so they never get
    /// de-duplicated against an identical fetch.
    pub async fn change_scope(&self, scope: HistoryScope) -> FetchOutcome {
        self.update(HistoryState::begin_scope_change);
        self.scroll_views_to_origin();
        self.dispatch(FetchRequest::page(1).with_scope(scope), Dedup::Bypass)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, CoreError> {
        let entry = {
            let state = self.lock();
            if state.is_deleting(id) {
                return Ok(DeleteOutcome::AlreadyDeleting);
            }
            match state.find(id) {
                Some(entry) => entry.clone(),
                None => return Ok(DeleteOutcome::NotFound),
            }
        };

        if !self.confirmation.confirm_delete(&entry) {
            return Ok(DeleteOutcome::Cancelled);
        }

        // The list may have changed while the confirmation was open.
        if let Err(outcome) = self.update(|state| state.mark_deleting(id)) {
            return Ok(outcome);
        }

        match self.repository.delete_entry(id.to_string()).await {
            Ok(()) => {
                self.update(|state| state.remove_deleted(id));
                Ok(DeleteOutcome::Deleted)
            }
            Err(error) => {
                warn!(%id, %error, "delete failed, restoring entry");
                self.update(|state| {
                    state.unmark_deleting(id);
                    state.set_notice(error.user_message());
                });
                Err(error)
            }
        }
    }

    #[instrument(skip(self, entry, comment), fields(id = %entry.id))]
    pub async fn save_edit(
        &self,
        entry: &FoodEntry,
        calories_input: &str,
        comment: &str,
    ) -> Result<FoodEntry, CoreError> {
        let input = validate_edit(calories_input, comment)?;

        {
            let state = self.lock();
            if state.find(&entry.id).is_none() {
                return Err(CoreError::NotFound);
            }
            if state.is_deleting(&entry.id) {
                return Err(CoreError::Conflict(
                    "This entry is being deleted.".to_string(),
                ));
            }
        }

        match self.repository.update_entry(entry.id.clone(), input).await {
            Ok(updated) => {
                self.update(|state| state.apply_edit(updated.clone()));
                Ok(updated)
            }
            Err(error) => {
                warn!(%error, "edit failed");
                self.update(|state| state.set_notice(error.user_message()));
                Err(error)
            }
        }
    }

    /// Refreshes this list every time the subscription is signalled, until
    /// the bus side goes away.
    pub fn spawn_refresh_listener(&self, mut subscription: RefreshSubscription) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            while let Some(signal) = subscription.recv().await {
                debug!(screen = %signal.screen, reason = ?signal.reason, "refresh requested");
                controller.refresh().await;
            }
        })
    }

    async fn dispatch(&self, request: FetchRequest, dedup: Dedup) -> FetchOutcome {
        let ticket = match self.update(|state| state.begin_fetch(&request, dedup)) {
            Ok(ticket) => ticket,
            Err(reason) => {
                debug!(?reason, "fetch skipped");
                return FetchOutcome::Skipped(reason);
            }
        };

        let result = self.repository.fetch_page(ticket.query.clone()).await;
        let outcome = self.update(|state| state.finish_fetch(&ticket, result));

        match &outcome {
            FetchOutcome::Discarded => debug!(page = ticket.query.page, "stale response discarded"),
            FetchOutcome::Failed(error) => warn!(%error, "history fetch failed"),
            _ => {}
        }

        self.release_after_grace(ticket);
        outcome
    }

    fn release_after_grace(&self, ticket: FetchTicket) {
        let grace = self.config.fetch_grace_period;
        if grace.is_zero() {
            self.lock().release(&ticket.key);
            return;
        }

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .release(&ticket.key);
        });
    }

    fn scroll_views_to_origin(&self) {
        for view in self.views.iter() {
            view.scroll_to_origin();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<T>(&self, transition: impl FnOnce(&mut HistoryState) -> T) -> T {
        let mut state = self.lock();
        let output = transition(&mut state);
        self.snapshots.send_replace(state.snapshot());
        output
    }
}
