//! Client-side controller for a remote, paginated admin resource: paging,
//! sorting and filtering, row selection with batch delete, and the gate
//! around the create/edit surface.

use async_trait::async_trait;

pub mod bulk_action;
pub mod edit_session;
pub mod error;
pub mod feedback;
pub mod list_controller;
pub mod resource_list;
pub mod selection;
pub mod transport;

pub use bulk_action::{AutoConfirm, BulkActionManager, Confirmation, DeleteOutcome};
pub use edit_session::{
    DetachedEditorSurface, EditSession, EditSessionManager, EditorProps, EditorSurface,
};
pub use error::{ListClientError, TransportError};
pub use feedback::{FeedbackHandler, NotificationKind, TracingFeedback};
pub use list_controller::{FetchOutcome, ListController, ListEvent, ListSnapshot};
pub use resource_list::{ResourceList, RowAction};
pub use selection::SelectionSet;
pub use transport::{HttpTransport, Transport};

#[async_trait]
pub trait ListHandle: Send + Sync {
    async fn reload_and_reset(&self);
    async fn clear_selection(&self);
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
