//! In-memory collaborators shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::{Record, RecordId},
    protocol::ApiEnvelope,
};

use crate::{
    bulk_action::Confirmation,
    edit_session::{EditorProps, EditorSurface},
    error::{ListClientError, TransportError},
    feedback::{FeedbackHandler, NotificationKind},
    transport::Transport,
    ListHandle,
};

pub(crate) fn education_record(id: i64) -> Record {
    Record::new(RecordId(id))
        .with_attribute("institution", format!("University {id}"))
        .with_attribute("degree", "BSc")
        .with_attribute("cgpa", 3.5)
}

pub(crate) fn education_records(count: i64) -> Vec<Record> {
    (1..=count).map(education_record).collect()
}

fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Serves pages out of a vector and records every call.
#[derive(Default)]
pub(crate) struct FakeTransport {
    records: Mutex<Vec<Record>>,
    get_calls: Mutex<Vec<Vec<(String, String)>>>,
    delete_calls: Mutex<Vec<Vec<RecordId>>>,
    page_delays: Mutex<HashMap<u32, Duration>>,
    fail_gets: AtomicBool,
    reject_gets: AtomicBool,
    fail_deletes: AtomicBool,
    reject_deletes: AtomicBool,
}

impl FakeTransport {
    pub(crate) fn with_records(records: Vec<Record>) -> Arc<Self> {
        let transport = Self::default();
        *transport.records.lock().expect("records") = records;
        Arc::new(transport)
    }

    pub(crate) fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn reject_gets(&self, reject: bool) {
        self.reject_gets.store(reject, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn reject_deletes(&self, reject: bool) {
        self.reject_deletes.store(reject, Ordering::SeqCst);
    }

    pub(crate) fn delay_page(&self, page: u32, delay: Duration) {
        self.page_delays.lock().expect("delays").insert(page, delay);
    }

    pub(crate) fn get_calls(&self) -> Vec<Vec<(String, String)>> {
        self.get_calls.lock().expect("get calls").clone()
    }

    pub(crate) fn requested_pages(&self) -> Vec<u32> {
        self.get_calls()
            .iter()
            .filter_map(|query| query_value(query, "page").and_then(|page| page.parse().ok()))
            .collect()
    }

    pub(crate) fn delete_calls(&self) -> Vec<Vec<RecordId>> {
        self.delete_calls.lock().expect("delete calls").clone()
    }

    pub(crate) fn record_count(&self) -> usize {
        self.records.lock().expect("records").len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(
        &self,
        _path: &str,
        query: &[(String, String)],
    ) -> Result<ApiEnvelope, TransportError> {
        self.get_calls.lock().expect("get calls").push(query.to_vec());
        let page: u32 = query_value(query, "page")
            .and_then(|page| page.parse().ok())
            .unwrap_or(1);
        let page_size: usize = query_value(query, "pageSize")
            .and_then(|size| size.parse().ok())
            .unwrap_or(10);

        let delay = self.page_delays.lock().expect("delays").get(&page).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("connection refused".to_string()));
        }
        if self.reject_gets.load(Ordering::SeqCst) {
            return Ok(ApiEnvelope::failure("listing is disabled"));
        }

        let records = self.records.lock().expect("records").clone();
        let start = (page.saturating_sub(1) as usize) * page_size;
        let rows: Vec<Record> = records.iter().skip(start).take(page_size).cloned().collect();
        Ok(ApiEnvelope::ok(
            "Fetched",
            json!({ "records": rows, "total": records.len() }),
        ))
    }

    async fn delete(&self, _path: &str, ids: &[RecordId]) -> Result<ApiEnvelope, TransportError> {
        self.delete_calls
            .lock()
            .expect("delete calls")
            .push(ids.to_vec());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("connection reset".to_string()));
        }
        if self.reject_deletes.load(Ordering::SeqCst) {
            return Ok(ApiEnvelope::failure("records are locked"));
        }
        self.records
            .lock()
            .expect("records")
            .retain(|record| !ids.contains(&record.id));
        Ok(ApiEnvelope::ok("Deleted successfully", Value::Null))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Feedback {
    Exception(String),
    Notification(String, NotificationKind),
}

#[derive(Default)]
pub(crate) struct RecordingFeedback {
    entries: Mutex<Vec<Feedback>>,
}

impl RecordingFeedback {
    pub(crate) fn entries(&self) -> Vec<Feedback> {
        self.entries.lock().expect("feedback").clone()
    }

    pub(crate) fn exceptions(&self) -> usize {
        self.entries()
            .iter()
            .filter(|entry| matches!(entry, Feedback::Exception(_)))
            .count()
    }
}

impl FeedbackHandler for RecordingFeedback {
    fn handle_exception(&self, err: &ListClientError) {
        self.entries
            .lock()
            .expect("feedback")
            .push(Feedback::Exception(err.user_message()));
    }

    fn show_tiny_notification(&self, message: &str, kind: NotificationKind) {
        self.entries
            .lock()
            .expect("feedback")
            .push(Feedback::Notification(message.to_string(), kind));
    }
}

/// Answers with a fixed choice and remembers the prompts it was shown.
pub(crate) struct ScriptedConfirmation {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    pub(crate) fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts").clone()
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts
            .lock()
            .expect("prompts")
            .push(prompt.to_string());
        self.answer
    }
}

#[derive(Default)]
pub(crate) struct CountingListHandle {
    reloads: AtomicUsize,
    clears: AtomicUsize,
}

impl CountingListHandle {
    pub(crate) fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub(crate) fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListHandle for CountingListHandle {
    async fn reload_and_reset(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    async fn clear_selection(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    shown: Mutex<Vec<EditorProps>>,
    hidden: AtomicUsize,
}

impl RecordingSurface {
    pub(crate) fn shown(&self) -> Vec<EditorProps> {
        self.shown.lock().expect("shown").clone()
    }

    pub(crate) fn hidden(&self) -> usize {
        self.hidden.load(Ordering::SeqCst)
    }
}

impl EditorSurface for RecordingSurface {
    fn show(&self, props: EditorProps) {
        self.shown.lock().expect("shown").push(props);
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
    }
}
