use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use shared::{
    domain::{Contact, ContactId, SortDirection},
    protocol::ContactFilter,
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::ClientSettings,
    debounce::Debouncer,
    error::{GatewayError, GatewayResult},
    gateway::ContactGateway,
    notice::{Notice, NoticeContext},
};

const EVENT_CAPACITY: usize = 64;
pub const UNMOUNTED_MESSAGE: &str = "contact list is no longer active";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub search_text: String,
    pub sort: SortDirection,
}

impl QueryState {
    pub fn filter(&self) -> ContactFilter {
        ContactFilter::new(self.search_text.clone(), self.sort)
    }
}

/// Read-only copy of the controller state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub query: QueryState,
    pub contacts: Vec<Contact>,
    pub loading: bool,
    pub last_error: Option<Notice>,
}

impl ListView {
    /// True once a fetch has settled with nothing to show. An empty list that
    /// is still loading is not an empty result.
    pub fn shows_empty_state(&self) -> bool {
        !self.loading && self.contacts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    Refreshed { count: usize },
    ContactDeleted { id: ContactId },
    Failed(Notice),
}

#[derive(Debug, PartialEq, Eq)]
enum FetchOutcome {
    Applied { count: usize },
    Failed(Notice),
    Stale,
}

#[derive(Default)]
struct ListState {
    query: QueryState,
    contacts: Vec<Contact>,
    generation: u64,
    fetch_pending: bool,
    pending_deletes: usize,
    deleted_during_fetch: HashSet<ContactId>,
    fetch_task: Option<JoinHandle<()>>,
    last_error: Option<Notice>,
    torn_down: bool,
}

impl ListState {
    fn loading(&self) -> bool {
        self.fetch_pending || self.pending_deletes > 0
    }

    fn view(&self) -> ListView {
        ListView {
            query: self.query.clone(),
            contacts: self.contacts.clone(),
            loading: self.loading(),
            last_error: self.last_error.clone(),
        }
    }

    /// Supersedes whatever fetch is in flight. The previous task is aborted,
    /// and bumping the generation guarantees its result is ignored even if it
    /// already finished the request.
    fn begin_fetch(&mut self) -> (u64, ContactFilter) {
        if let Some(previous) = self.fetch_task.take() {
            previous.abort();
        }
        self.generation += 1;
        self.fetch_pending = true;
        self.deleted_during_fetch.clear();
        (self.generation, self.query.filter())
    }

    fn apply_fetch(
        &mut self,
        generation: u64,
        result: GatewayResult<Vec<Contact>>,
    ) -> FetchOutcome {
        if self.torn_down || generation != self.generation {
            return FetchOutcome::Stale;
        }
        self.fetch_pending = false;
        self.fetch_task = None;

        match result {
            Ok(mut contacts) => {
                if !self.deleted_during_fetch.is_empty() {
                    contacts.retain(|contact| !self.deleted_during_fetch.contains(&contact.id));
                    self.deleted_during_fetch.clear();
                }
                let count = contacts.len();
                self.contacts = contacts;
                self.last_error = None;
                FetchOutcome::Applied { count }
            }
            Err(error) => {
                let notice = Notice::from_gateway(NoticeContext::LoadContacts, &error);
                self.last_error = Some(notice.clone());
                FetchOutcome::Failed(notice)
            }
        }
    }

    fn finish_delete(&mut self, id: &ContactId, result: GatewayResult<()>) -> Result<(), Notice> {
        self.pending_deletes = self.pending_deletes.saturating_sub(1);
        match result {
            Ok(()) => {
                if !self.torn_down {
                    self.contacts.retain(|contact| &contact.id != id);
                    if self.fetch_pending {
                        self.deleted_during_fetch.insert(id.clone());
                    }
                }
                Ok(())
            }
            Err(error) => {
                let notice = Notice::from_gateway(NoticeContext::DeleteContact, &error);
                if !self.torn_down {
                    self.last_error = Some(notice.clone());
                }
                Err(notice)
            }
        }
    }
}

struct Shared {
    gateway: Arc<dyn ContactGateway>,
    state: Mutex<ListState>,
    events: broadcast::Sender<ListEvent>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: ListEvent) {
        let _ = self.events.send(event);
    }

    fn set_search_text(self: &Arc<Self>, text: String) {
        let mut state = self.lock_state();
        if state.torn_down || state.query.search_text == text {
            return;
        }
        debug!(search = %text, "search text changed");
        state.query.search_text = text;
        self.spawn_fetch(&mut state);
    }

    fn fetch(self: &Arc<Self>) {
        let mut state = self.lock_state();
        if state.torn_down {
            return;
        }
        self.spawn_fetch(&mut state);
    }

    fn spawn_fetch(self: &Arc<Self>, state: &mut ListState) {
        let (generation, filter) = state.begin_fetch();
        debug!(
            generation,
            name = %filter.name,
            order_by = %filter.order_by,
            "issuing contact list fetch"
        );
        let shared = Arc::clone(self);
        state.fetch_task = Some(tokio::spawn(async move {
            let result = shared.gateway.list_contacts(&filter).await;
            shared.complete_fetch(generation, result);
        }));
    }

    fn complete_fetch(&self, generation: u64, result: GatewayResult<Vec<Contact>>) {
        let outcome = self.lock_state().apply_fetch(generation, result);
        match outcome {
            FetchOutcome::Applied { count } => {
                info!(generation, count, "contact list updated");
                self.emit(ListEvent::Refreshed { count });
            }
            FetchOutcome::Failed(notice) => {
                warn!(generation, "contact list fetch failed: {notice}");
                self.emit(ListEvent::Failed(notice));
            }
            FetchOutcome::Stale => {
                debug!(generation, "discarding superseded contact list response");
            }
        }
    }
}

/// Keeps `pending_deletes` honest if the delete future is dropped mid-flight.
struct PendingDelete<'a> {
    shared: &'a Shared,
    settled: bool,
}

impl Drop for PendingDelete<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = self.shared.lock_state();
            state.pending_deletes = state.pending_deletes.saturating_sub(1);
        }
    }
}

/// Owns the contact list screen state. Every mutation of the query, the
/// snapshot, or the loading flag goes through this type.
pub struct ListController {
    shared: Arc<Shared>,
    search_input: Debouncer<String>,
}

impl ListController {
    pub fn new(gateway: Arc<dyn ContactGateway>, settings: &ClientSettings) -> Self {
        Self::with_quiet_period(gateway, settings.search_debounce)
    }

    pub fn with_quiet_period(gateway: Arc<dyn ContactGateway>, quiet_period: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            gateway,
            state: Mutex::new(ListState::default()),
            events,
        });
        let weak = Arc::downgrade(&shared);
        let search_input = Debouncer::new(quiet_period, move |text: String| {
            if let Some(shared) = weak.upgrade() {
                shared.set_search_text(text);
            }
        });
        Self {
            shared,
            search_input,
        }
    }

    /// Issues the initial fetch for the default query.
    pub fn mount(&self) {
        self.shared.fetch();
    }

    /// Raw keystroke entry point; only the last value of a typing burst
    /// reaches [`ListController::set_search_text`].
    pub fn on_search_input(&self, text: impl Into<String>) {
        self.search_input.call(text.into());
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.shared.set_search_text(text.into());
    }

    pub fn toggle_sort(&self) -> SortDirection {
        let mut state = self.shared.lock_state();
        if state.torn_down {
            return state.query.sort;
        }
        let sort = state.query.sort.toggled();
        state.query.sort = sort;
        debug!(%sort, "sort direction toggled");
        self.shared.spawn_fetch(&mut state);
        sort
    }

    pub fn refresh(&self) {
        self.shared.fetch();
    }

    /// Deletes on the server first; the contact leaves the snapshot only once
    /// the server confirmed. After [`ListController::unmount`] nothing is sent.
    pub async fn delete_contact(&self, contact: &Contact) -> Result<(), Notice> {
        {
            let mut state = self.shared.lock_state();
            if state.torn_down {
                debug!(id = %contact.id, "delete requested after unmount");
                return Err(Notice::from_gateway(
                    NoticeContext::DeleteContact,
                    &GatewayError::malformed(UNMOUNTED_MESSAGE),
                ));
            }
            state.pending_deletes += 1;
        }
        let mut pending = PendingDelete {
            shared: &self.shared,
            settled: false,
        };

        let result = self.shared.gateway.delete_contact(&contact.id).await;
        let (outcome, torn_down) = {
            let mut state = self.shared.lock_state();
            (state.finish_delete(&contact.id, result), state.torn_down)
        };
        pending.settled = true;

        if torn_down {
            debug!(id = %contact.id, "delete settled after unmount");
            return outcome;
        }
        match &outcome {
            Ok(()) => {
                info!(id = %contact.id, "contact deleted");
                self.shared.emit(ListEvent::ContactDeleted {
                    id: contact.id.clone(),
                });
            }
            Err(notice) => {
                warn!(id = %contact.id, "contact delete failed: {notice}");
                self.shared.emit(ListEvent::Failed(notice.clone()));
            }
        }
        outcome
    }

    pub fn view(&self) -> ListView {
        self.shared.lock_state().view()
    }

    pub fn query(&self) -> QueryState {
        self.shared.lock_state().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock_state().loading()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.shared.events.subscribe()
    }

    /// Final teardown: drops pending search input, aborts the in-flight fetch,
    /// and stops any later response from touching state.
    pub fn unmount(&self) {
        self.search_input.cancel();
        let mut state = self.shared.lock_state();
        if state.torn_down {
            return;
        }
        state.torn_down = true;
        state.generation += 1;
        state.fetch_pending = false;
        if let Some(task) = state.fetch_task.take() {
            task.abort();
        }
        debug!("contact list unmounted");
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
