use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use async_trait::async_trait;
use shared::{
    domain::{PageResult, QueryState, RecordId, ResourceDescriptor, SortSpec},
    protocol::{ListPayload, ListQuery},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::ListClientError,
    feedback::{handle_success_response, FeedbackHandler},
    selection::SelectionSet,
    transport::Transport,
    ListHandle,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    PageLoaded {
        query: QueryState,
        page: PageResult,
    },
    LoadingChanged(bool),
    SelectionChanged(Vec<RecordId>),
    FetchFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied(PageResult),
    /// A newer fetch had already been applied; the response was dropped.
    Superseded(PageResult),
}

impl FetchOutcome {
    pub fn page(&self) -> &PageResult {
        match self {
            FetchOutcome::Applied(page) | FetchOutcome::Superseded(page) => page,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListSnapshot {
    /// Query that produced `page`. Only a successful fetch moves it.
    pub query: QueryState,
    pub page: PageResult,
    pub selection: SelectionSet,
    pub loading: bool,
}

impl ListSnapshot {
    pub fn page_count(&self) -> u64 {
        self.page.page_count(self.query.page_size)
    }
}

struct ListState {
    query: QueryState,
    page: PageResult,
    selection: SelectionSet,
    next_generation: u64,
    applied_generation: u64,
}

pub struct ListController {
    transport: Arc<dyn Transport>,
    feedback: Arc<dyn FeedbackHandler>,
    resource: ResourceDescriptor,
    state: Mutex<ListState>,
    in_flight: StdMutex<usize>,
    events: broadcast::Sender<ListEvent>,
}

/// Keeps the in-flight count honest even if a fetch future is dropped
/// before the response arrives. The count changes and its `LoadingChanged`
/// event go out under one lock, so subscribers see strict true/false pairs.
struct InFlightGuard<'a> {
    controller: &'a ListController,
}

impl<'a> InFlightGuard<'a> {
    fn enter(controller: &'a ListController) -> Self {
        let mut count = controller.in_flight_count();
        *count += 1;
        if *count == 1 {
            let _ = controller.events.send(ListEvent::LoadingChanged(true));
        }
        Self { controller }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut count = self.controller.in_flight_count();
        *count = count.saturating_sub(1);
        if *count == 0 {
            let _ = self
                .controller
                .events
                .send(ListEvent::LoadingChanged(false));
        }
    }
}

impl ListController {
    pub fn new(
        resource: ResourceDescriptor,
        transport: Arc<dyn Transport>,
        feedback: Arc<dyn FeedbackHandler>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            transport,
            feedback,
            resource,
            state: Mutex::new(ListState {
                query: QueryState::default(),
                page: PageResult::default(),
                selection: SelectionSet::new(),
                next_generation: 0,
                applied_generation: 0,
            }),
            in_flight: StdMutex::new(0),
            events,
        })
    }

    pub fn resource(&self) -> &ResourceDescriptor {
        &self.resource
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub fn loading(&self) -> bool {
        *self.in_flight_count() > 0
    }

    fn in_flight_count(&self) -> MutexGuard<'_, usize> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let guard = self.state.lock().await;
        ListSnapshot {
            query: guard.query.clone(),
            page: guard.page.clone(),
            selection: guard.selection.clone(),
            loading: self.loading(),
        }
    }

    pub async fn query(&self) -> QueryState {
        self.state.lock().await.query.clone()
    }

    pub async fn page(&self) -> PageResult {
        self.state.lock().await.page.clone()
    }

    /// Fetches one page and, unless a newer fetch already landed, replaces
    /// the displayed rows and query with it. Failures go to the feedback
    /// handler and leave both untouched.
    pub async fn fetch(&self, query: QueryState) -> Result<FetchOutcome, ListClientError> {
        let generation = {
            let mut guard = self.state.lock().await;
            guard.next_generation += 1;
            guard.next_generation
        };

        let result = {
            let _in_flight = InFlightGuard::enter(self);
            debug!(
                "list: fetch endpoint={} page={} generation={generation}",
                self.resource.endpoint, query.page
            );
            let wire = ListQuery::new(query.clone(), &self.resource.columns);
            let response = self
                .transport
                .get(&self.resource.endpoint, &wire.to_query_pairs())
                .await;

            let outcome = match response {
                Ok(envelope) => handle_success_response(envelope, |envelope| {
                    let payload: ListPayload = serde_json::from_value(envelope.payload)?;
                    Ok(PageResult::from(payload))
                }),
                Err(err) => Err(ListClientError::from(err)),
            };
            match outcome {
                Ok(page) => Ok(self.reconcile(generation, query, page).await),
                Err(err) => Err(err),
            }
        };

        if let Err(err) = &result {
            warn!("list: fetch failed generation={generation}: {err}");
            self.feedback.handle_exception(err);
            let _ = self.events.send(ListEvent::FetchFailed(err.user_message()));
        }
        result
    }

    async fn reconcile(&self, generation: u64, query: QueryState, page: PageResult) -> FetchOutcome {
        let mut guard = self.state.lock().await;
        if generation < guard.applied_generation {
            info!(
                "list: dropping stale page generation={generation} applied={}",
                guard.applied_generation
            );
            return FetchOutcome::Superseded(page);
        }

        guard.applied_generation = generation;
        guard.query = query.clone();
        guard.page = page.clone();
        drop(guard);

        let _ = self.events.send(ListEvent::PageLoaded {
            query,
            page: page.clone(),
        });
        FetchOutcome::Applied(page)
    }

    pub async fn change_page(&self, page: u32) -> Result<FetchOutcome, ListClientError> {
        let query = self.query().await.with_page(page);
        self.fetch(query).await
    }

    pub async fn change_sort(
        &self,
        sort: Option<SortSpec>,
    ) -> Result<FetchOutcome, ListClientError> {
        let mut query = self.query().await;
        query.sort = sort;
        self.fetch(query).await
    }

    /// Jumps back to page 1.
    pub async fn set_filter(
        &self,
        column: &str,
        text: Option<String>,
    ) -> Result<FetchOutcome, ListClientError> {
        let mut query = self.query().await.with_page(1);
        match text.filter(|text| !text.trim().is_empty()) {
            Some(text) => {
                query.filters.insert(column.to_string(), text);
            }
            None => {
                query.filters.remove(column);
            }
        }
        self.fetch(query).await
    }

    pub async fn clear_filters(&self) -> Result<FetchOutcome, ListClientError> {
        let mut query = self.query().await.with_page(1);
        query.filters.clear();
        self.fetch(query).await
    }

    pub async fn reload(&self) -> Result<FetchOutcome, ListClientError> {
        let query = self.query().await;
        self.fetch(query).await
    }

    pub async fn reload_and_reset(&self) -> Result<FetchOutcome, ListClientError> {
        let query = {
            let mut guard = self.state.lock().await;
            guard.selection.clear();
            guard.query.with_page(1)
        };
        let _ = self.events.send(ListEvent::SelectionChanged(Vec::new()));
        self.fetch(query).await
    }

    pub async fn selection(&self) -> SelectionSet {
        self.state.lock().await.selection.clone()
    }

    pub async fn select(&self, id: RecordId) {
        self.update_selection(|selection| {
            selection.select(id);
        })
        .await;
    }

    pub async fn deselect(&self, id: RecordId) {
        self.update_selection(|selection| {
            selection.deselect(id);
        })
        .await;
    }

    pub async fn toggle(&self, id: RecordId) -> bool {
        let mut checked = false;
        self.update_selection(|selection| checked = selection.toggle(id))
            .await;
        checked
    }

    pub async fn select_page(&self) {
        let mut guard = self.state.lock().await;
        let ListState {
            page, selection, ..
        } = &mut *guard;
        selection.select_all(&page.records);
        let ids = selection.ids();
        drop(guard);
        let _ = self.events.send(ListEvent::SelectionChanged(ids));
    }

    pub async fn clear_selection(&self) {
        self.update_selection(SelectionSet::clear).await;
    }

    async fn update_selection(&self, apply: impl FnOnce(&mut SelectionSet)) {
        let ids = {
            let mut guard = self.state.lock().await;
            apply(&mut guard.selection);
            guard.selection.ids()
        };
        let _ = self.events.send(ListEvent::SelectionChanged(ids));
    }
}

#[async_trait]
impl ListHandle for ListController {
    async fn reload_and_reset(&self) {
        let _ = ListController::reload_and_reset(self).await;
    }

    async fn clear_selection(&self) {
        ListController::clear_selection(self).await;
    }
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
