use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use shared::domain::{Record, RecordId};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    error::ListClientError,
    feedback::{handle_success_response, FeedbackHandler, NotificationKind},
    selection::confirmation_prompt,
    transport::Transport,
    ListHandle,
};

#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        ids: Vec<RecordId>,
        message: String,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkActionEvent {
    LoadingChanged(bool),
    Deleted(Vec<RecordId>),
}

pub struct BulkActionManager {
    endpoint: String,
    transport: Arc<dyn Transport>,
    feedback: Arc<dyn FeedbackHandler>,
    confirmation: Arc<dyn Confirmation>,
    list: Arc<dyn ListHandle>,
    loading: AtomicBool,
    events: broadcast::Sender<BulkActionEvent>,
}

struct LoadingGuard<'a> {
    manager: &'a BulkActionManager,
}

impl<'a> LoadingGuard<'a> {
    fn enter(manager: &'a BulkActionManager) -> Self {
        manager.loading.store(true, Ordering::SeqCst);
        let _ = manager.events.send(BulkActionEvent::LoadingChanged(true));
        Self { manager }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.manager.loading.store(false, Ordering::SeqCst);
        let _ = self
            .manager
            .events
            .send(BulkActionEvent::LoadingChanged(false));
    }
}

impl BulkActionManager {
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn Transport>,
        feedback: Arc<dyn FeedbackHandler>,
        confirmation: Arc<dyn Confirmation>,
        list: Arc<dyn ListHandle>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            endpoint: endpoint.into(),
            transport,
            feedback,
            confirmation,
            list,
            loading: AtomicBool::new(false),
            events,
        })
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<BulkActionEvent> {
        self.events.subscribe()
    }

    pub async fn request_delete(
        &self,
        records: &[Record],
    ) -> Result<DeleteOutcome, ListClientError> {
        let ids: Vec<RecordId> = records.iter().map(|record| record.id).collect();
        self.request_delete_ids(&ids).await
    }

    /// Asks for confirmation, then deletes every id with a single request.
    /// A declined prompt dismisses the selection and sends nothing.
    pub async fn request_delete_ids(
        &self,
        requested: &[RecordId],
    ) -> Result<DeleteOutcome, ListClientError> {
        let mut ids: Vec<RecordId> = Vec::with_capacity(requested.len());
        for id in requested {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        if ids.is_empty() {
            return Err(ListClientError::EmptySelection);
        }

        let prompt = confirmation_prompt(ids.len());
        if !self.confirmation.confirm(&prompt).await {
            info!("bulk: delete cancelled count={}", ids.len());
            self.list.clear_selection().await;
            return Ok(DeleteOutcome::Cancelled);
        }

        let _loading = LoadingGuard::enter(self);
        info!("bulk: delete endpoint={} count={}", self.endpoint, ids.len());
        let result = match self.transport.delete(&self.endpoint, &ids).await {
            Ok(envelope) => handle_success_response(envelope, |envelope| Ok(envelope.message)),
            Err(err) => Err(ListClientError::from(err)),
        };

        match result {
            Ok(message) => {
                self.feedback
                    .show_tiny_notification(&message, NotificationKind::Success);
                let _ = self.events.send(BulkActionEvent::Deleted(ids.clone()));
                self.list.reload_and_reset().await;
                Ok(DeleteOutcome::Deleted { ids, message })
            }
            Err(err) => {
                warn!("bulk: delete failed count={}: {err}", ids.len());
                self.feedback.handle_exception(&err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/bulk_action_tests.rs"]
mod tests;
