use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::domain::{
    common::entities::app_errors::CoreError,
    food_history::{
        entities::{FoodEntry, HistoryPage},
        value_objects::{
            DeleteOutcome, FetchKey, FetchOutcome, FetchRequest, HistoryQuery, HistoryScope,
            SkipReason, SortOrder,
        },
    },
};

/// Read-only view of a controller handed to list views.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub items: Vec<FoodEntry>,
    pub page: u32,
    pub has_more: bool,
    pub total_calories: f64,
    pub sort_order: SortOrder,
    pub scope: HistoryScope,
    pub loading_initial: bool,
    pub loading_more: bool,
    pub refreshing: bool,
    pub sort_changing: bool,
    pub last_error: Option<String>,
    pub notice: Option<String>,
}

impl HistorySnapshot {
    pub fn is_loading(&self) -> bool {
        self.loading_initial || self.loading_more || self.refreshing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dedup {
    Enforce,
    Bypass,
}

/// Which loading flag a fetch raises while it is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadKind {
    Initial,
    More,
    Refresh,
}

/// Outstanding fetches of the current generation, per loading flag.
#[derive(Debug, Default)]
struct PendingLoads {
    initial: usize,
    more: usize,
    refresh: usize,
}

impl PendingLoads {
    fn slot(&mut self, kind: LoadKind) -> &mut usize {
        match kind {
            LoadKind::Initial => &mut self.initial,
            LoadKind::More => &mut self.more,
            LoadKind::Refresh => &mut self.refresh,
        }
    }

    fn any(&self) -> bool {
        self.initial > 0 || self.more > 0 || self.refresh > 0
    }
}

/// Sort, scope and page the loaded items actually belong to.
#[derive(Debug, Default)]
struct Listed {
    sort: SortOrder,
    scope: HistoryScope,
    page: u32,
}

/// Issued when a fetch is dispatched and handed back with its response.
#[derive(Debug, Clone)]
pub(crate) struct FetchTicket {
    pub key: FetchKey,
    pub query: HistoryQuery,
    pub kind: LoadKind,
    pub resets: bool,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub(crate) struct HistoryState {
    items: Vec<FoodEntry>,
    page: u32,
    has_more: bool,
    total_calories: f64,
    sort_order: SortOrder,
    scope: HistoryScope,
    pending: PendingLoads,
    listed: Listed,
    sort_changing: bool,
    last_error: Option<String>,
    notice: Option<String>,
    in_flight: HashMap<FetchKey, usize>,
    deleting: HashSet<String>,
    last_request: Option<FetchRequest>,
    generation: u64,
}

impl HistoryState {
    pub fn new(sort_order: SortOrder, scope: HistoryScope) -> Self {
        Self {
            sort_order,
            listed: Listed {
                sort: sort_order,
                scope: scope.clone(),
                page: 0,
            },
            scope,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            items: self.items.clone(),
            page: self.page,
            has_more: self.has_more,
            total_calories: self.total_calories,
            sort_order: self.sort_order,
            scope: self.scope.clone(),
            loading_initial: self.pending.initial > 0,
            loading_more: self.pending.more > 0,
            refreshing: self.pending.refresh > 0,
            sort_changing: self.sort_changing,
            last_error: self.last_error.clone(),
            notice: self.notice.clone(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&FoodEntry> {
        self.items.iter().find(|entry| entry.id == id)
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn set_notice(&mut self, message: String) {
        self.notice = Some(message);
    }

    pub fn next_page_request(&self) -> Result<FetchRequest, SkipReason> {
        if !self.has_more {
            return Err(SkipReason::NothingMore);
        }
        if self.pending.any() {
            return Err(SkipReason::InFlight);
        }
        Ok(FetchRequest::page(self.page + 1))
    }

    pub fn retry_request(&self) -> Result<FetchRequest, SkipReason> {
        match (&self.last_error, &self.last_request) {
            (Some(_), Some(request)) => Ok(request.clone()),
            _ => Err(SkipReason::NothingToRetry),
        }
    }

    pub fn begin_sort_change(&mut self, order: SortOrder) -> Result<(), SkipReason> {
        if self.sort_changing {
            return Err(SkipReason::SortChangeInProgress);
        }
        if self.sort_order == order {
            return Err(SkipReason::Unchanged);
        }
        self.sort_changing = true;
        self.page = 1;
        Ok(())
    }

    pub fn end_sort_change(&mut self) {
        self.sort_changing = false;
    }

    pub fn begin_scope_change(&mut self) {
        self.page = 1;
    }

    pub fn begin_fetch(
        &mut self,
        request: &FetchRequest,
        dedup: Dedup,
    ) -> Result<FetchTicket, SkipReason> {
        let page = request.page.max(1);
        let sort = request.sort.unwrap_or(self.sort_order);
        let scope = request.scope.clone().unwrap_or_else(|| self.scope.clone());
        let key = FetchKey {
            page,
            is_refresh: request.is_refresh,
            sort,
            scope: scope.clone(),
        };

        if dedup == Dedup::Enforce && self.in_flight.contains_key(&key) {
            return Err(SkipReason::InFlight);
        }

        let resets = request.resets_list();
        if resets {
            // Anything still outstanding from older generations is discarded on arrival.
            self.generation += 1;
            self.pending = PendingLoads::default();
            self.sort_order = sort;
            self.scope = scope.clone();
        } else if sort != self.sort_order || scope != self.scope {
            return Err(SkipReason::Incoherent);
        }

        let kind = if request.is_refresh {
            LoadKind::Refresh
        } else if page == 1 {
            LoadKind::Initial
        } else {
            LoadKind::More
        };
        *self.pending.slot(kind) += 1;

        *self.in_flight.entry(key.clone()).or_insert(0) += 1;
        self.last_request = Some(FetchRequest {
            page,
            is_refresh: request.is_refresh,
            sort: Some(sort),
            scope: Some(scope.clone()),
        });

        Ok(FetchTicket {
            key,
            query: HistoryQuery { page, sort, scope },
            kind,
            resets,
            generation: self.generation,
        })
    }

    /// A response still describes what the user asked for last: same sort and
    /// scope, no newer first-page fetch since, and for appends the next page.
    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
            && ticket.query.sort == self.sort_order
            && ticket.query.scope == self.scope
            && (ticket.resets || ticket.query.page == self.page + 1)
    }

    pub fn finish_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<HistoryPage, CoreError>,
    ) -> FetchOutcome {
        if ticket.generation == self.generation {
            let pending = self.pending.slot(ticket.kind);
            *pending = pending.saturating_sub(1);
        }

        if !self.is_current(ticket) {
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                let received = page.items.len();
                if ticket.resets {
                    self.items.clear();
                }
                let added = self.append_unique(page.items);
                self.total_calories = page.total_calories;
                self.has_more = page.has_next;
                self.page = ticket.query.page;
                self.listed = Listed {
                    sort: ticket.query.sort,
                    scope: ticket.query.scope.clone(),
                    page: ticket.query.page,
                };
                self.last_error = None;
                FetchOutcome::Applied { received, added }
            }
            Err(error) => {
                if ticket.resets {
                    // The old items stay, so the cursor goes back to the query they came from.
                    self.sort_order = self.listed.sort;
                    self.scope = self.listed.scope.clone();
                    self.page = self.listed.page;
                }
                self.last_error = Some(error.user_message());
                FetchOutcome::Failed(error)
            }
        }
    }

    /// Returns true once no fetch with this key is outstanding.
    pub fn release(&mut self, key: &FetchKey) -> bool {
        match self.in_flight.get_mut(key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.in_flight.remove(key);
                true
            }
            None => true,
        }
    }

    fn append_unique(&mut self, entries: Vec<FoodEntry>) -> usize {
        let mut seen: HashSet<String> = self.items.iter().map(|e| e.id.clone()).collect();
        let before = self.items.len();
        for mut entry in entries {
            if seen.insert(entry.id.clone()) {
                entry.is_deleting = self.deleting.contains(&entry.id);
                self.items.push(entry);
            }
        }
        self.items.len() - before
    }

    pub fn mark_deleting(&mut self, id: &str) -> Result<(), DeleteOutcome> {
        if self.deleting.contains(id) {
            return Err(DeleteOutcome::AlreadyDeleting);
        }
        let entry = self
            .items
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(DeleteOutcome::NotFound)?;
        entry.is_deleting = true;
        self.deleting.insert(id.to_string());
        Ok(())
    }

    pub fn unmark_deleting(&mut self, id: &str) {
        self.deleting.remove(id);
        if let Some(entry) = self.items.iter_mut().find(|entry| entry.id == id) {
            entry.is_deleting = false;
        }
    }

    /// Drops a confirmed deletion and corrects the aggregate by its calories.
    pub fn remove_deleted(&mut self, id: &str) -> Option<FoodEntry> {
        self.deleting.remove(id);
        let index = self.items.iter().position(|entry| entry.id == id)?;
        let removed = self.items.remove(index);
        self.total_calories -= removed.calories;
        Some(removed)
    }

    /// Replaces an entry with the server's version and shifts the aggregate by
    /// the calorie difference.
    pub fn apply_edit(&mut self, mut updated: FoodEntry) -> bool {
        let deleting = self.deleting.contains(&updated.id);
        let Some(current) = self.items.iter_mut().find(|entry| entry.id == updated.id) else {
            return false;
        };
        self.total_calories += updated.calories - current.calories;
        updated.is_deleting = deleting;
        *current = updated;
        true
    }
}
