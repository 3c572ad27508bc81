use std::sync::Arc;

use shared::domain::{Record, ResourceDescriptor};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::ListHandle;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Closed,
    Creating,
    /// Snapshot taken when editing began; it is not refreshed if the list
    /// reloads underneath it.
    Editing(Record),
}

impl EditSession {
    pub fn is_open(&self) -> bool {
        !matches!(self, EditSession::Closed)
    }

    pub fn item_to_edit(&self) -> Option<&Record> {
        match self {
            EditSession::Editing(record) => Some(record),
            EditSession::Closed | EditSession::Creating => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorProps {
    pub title: String,
    pub item_to_edit: Option<Record>,
}

pub trait EditorSurface: Send + Sync {
    fn show(&self, props: EditorProps);
    fn hide(&self);
}

pub struct DetachedEditorSurface;

impl EditorSurface for DetachedEditorSurface {
    fn show(&self, _props: EditorProps) {}

    fn hide(&self) {}
}

pub struct EditSessionManager {
    resource: ResourceDescriptor,
    surface: Arc<dyn EditorSurface>,
    list: Arc<dyn ListHandle>,
    session: Mutex<EditSession>,
    events: broadcast::Sender<EditSession>,
}

impl EditSessionManager {
    pub fn new(
        resource: ResourceDescriptor,
        surface: Arc<dyn EditorSurface>,
        list: Arc<dyn ListHandle>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            resource,
            surface,
            list,
            session: Mutex::new(EditSession::Closed),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<EditSession> {
        self.events.subscribe()
    }

    pub async fn session(&self) -> EditSession {
        self.session.lock().await.clone()
    }

    pub async fn open_create(&self) {
        self.open(EditSession::Creating).await;
    }

    pub async fn open_edit(&self, record: Record) {
        self.open(EditSession::Editing(record)).await;
    }

    async fn open(&self, next: EditSession) {
        let props = EditorProps {
            title: self.resource.editor_title(next.item_to_edit().is_some()),
            item_to_edit: next.item_to_edit().cloned(),
        };
        let previous = {
            let mut guard = self.session.lock().await;
            std::mem::replace(&mut *guard, next.clone())
        };
        if previous.is_open() {
            debug!("edit: replacing open session");
        }
        self.surface.show(props);
        let _ = self.events.send(next);
    }

    pub async fn close(&self) {
        let previous = {
            let mut guard = self.session.lock().await;
            std::mem::take(&mut *guard)
        };
        if previous.is_open() {
            self.surface.hide();
            let _ = self.events.send(EditSession::Closed);
        }
    }

    /// Called by the surface once its write went through. Closes the session
    /// and reloads the list from page 1. Returns `false` when no session was
    /// open, in which case nothing is reloaded.
    pub async fn on_submit_success(&self) -> bool {
        let previous = {
            let mut guard = self.session.lock().await;
            std::mem::take(&mut *guard)
        };
        if !previous.is_open() {
            warn!("edit: submit completion received without an open session");
            return false;
        }

        match &previous {
            EditSession::Editing(record) => info!("edit: record {} saved", record.id),
            _ => info!("edit: record created"),
        }
        self.surface.hide();
        let _ = self.events.send(EditSession::Closed);
        self.list.reload_and_reset().await;
        true
    }

    pub async fn on_submit_failure(&self, reason: &str) {
        let open = self.session.lock().await.is_open();
        warn!("edit: submit failed open={open}: {reason}");
    }
}

#[cfg(test)]
#[path = "tests/edit_session_tests.rs"]
mod tests;
