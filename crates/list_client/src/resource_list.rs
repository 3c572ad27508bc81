use std::sync::Arc;

use shared::domain::{QueryState, Record, ResourceDescriptor};

use crate::{
    bulk_action::{BulkActionManager, Confirmation, DeleteOutcome},
    edit_session::{EditSessionManager, EditorSurface},
    error::ListClientError,
    feedback::FeedbackHandler,
    list_controller::{FetchOutcome, ListController},
    selection::selection_summary,
    transport::Transport,
    ListHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

pub struct ResourceList {
    list: Arc<ListController>,
    bulk: Arc<BulkActionManager>,
    editor: Arc<EditSessionManager>,
}

impl ResourceList {
    pub fn new(
        resource: ResourceDescriptor,
        transport: Arc<dyn Transport>,
        feedback: Arc<dyn FeedbackHandler>,
        confirmation: Arc<dyn Confirmation>,
        surface: Arc<dyn EditorSurface>,
    ) -> Self {
        let list = ListController::new(resource.clone(), Arc::clone(&transport), Arc::clone(&feedback));
        let handle: Arc<dyn ListHandle> = list.clone();
        let bulk = BulkActionManager::new(
            resource.endpoint.clone(),
            transport,
            feedback,
            confirmation,
            Arc::clone(&handle),
        );
        let editor = EditSessionManager::new(resource, surface, handle);
        Self { list, bulk, editor }
    }

    pub fn list(&self) -> &Arc<ListController> {
        &self.list
    }

    pub fn bulk_actions(&self) -> &Arc<BulkActionManager> {
        &self.bulk
    }

    pub fn editor(&self) -> &Arc<EditSessionManager> {
        &self.editor
    }

    pub async fn load(&self) -> Result<FetchOutcome, ListClientError> {
        self.list.fetch(QueryState::default()).await
    }

    pub async fn add_new(&self) {
        self.editor.open_create().await;
    }

    pub async fn row_action(
        &self,
        record: Record,
        action: RowAction,
    ) -> Result<Option<DeleteOutcome>, ListClientError> {
        match action {
            RowAction::Edit => {
                self.editor.open_edit(record).await;
                Ok(None)
            }
            RowAction::Delete => self
                .bulk
                .request_delete(std::slice::from_ref(&record))
                .await
                .map(Some),
        }
    }

    /// Deletes every checked id, including rows checked on other pages.
    pub async fn batch_delete(&self) -> Result<DeleteOutcome, ListClientError> {
        let ids = self.list.selection().await.ids();
        self.bulk.request_delete_ids(&ids).await
    }

    pub async fn cancel_selection(&self) {
        self.list.clear_selection().await;
    }

    pub async fn selection_alert(&self) -> Option<String> {
        let selection = self.list.selection().await;
        (!selection.is_empty()).then(|| selection_summary(selection.len()))
    }
}

#[cfg(test)]
#[path = "tests/resource_list_tests.rs"]
mod tests;
