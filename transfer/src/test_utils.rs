//! Scripted transport double for executor and batch tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use bot_client::{BotClientError, ChatTarget, FileKind, MessageHandle, ProgressSink, Result, Transport};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    SendMessage(String),
    Edit(String),
    SendFile(FileKind, PathBuf),
}

#[derive(Clone, Debug)]
pub enum EditOutcome {
    Ok,
    RateLimited(u64),
    Fail(String),
}

#[derive(Clone, Debug)]
pub enum SendOutcome {
    Ok,
    Fail(String),
}

/// Transport that replays scripted outcomes and records every call. During
/// `send_file` it feeds the sink the configured cumulative byte counts, with
/// a short sleep before each tick so a paused test clock accrues elapsed
/// time the way a real transfer would.
#[derive(Default)]
pub struct FakeTransport {
    pub progress_ticks: Vec<u64>,
    pub edit_script: Mutex<VecDeque<EditOutcome>>,
    pub send_script: Mutex<VecDeque<SendOutcome>>,
    pub events: Mutex<Vec<Event>>,
}

impl FakeTransport {
    pub fn with_progress_ticks(ticks: Vec<u64>) -> Self {
        Self {
            progress_ticks: ticks,
            ..Default::default()
        }
    }

    pub fn script_edits(&self, outcomes: impl IntoIterator<Item = EditOutcome>) {
        self.edit_script.lock().unwrap().extend(outcomes);
    }

    pub fn script_sends(&self, outcomes: impl IntoIterator<Item = SendOutcome>) {
        self.send_script.lock().unwrap().extend(outcomes);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn edit_count(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, Event::Edit(_))).count()
    }

    pub fn sent_file_paths(&self) -> Vec<PathBuf> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                Event::SendFile(_, path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn send_message(&self, chat: &ChatTarget, text: &str, _topic: Option<i64>) -> Result<MessageHandle> {
        self.events.lock().unwrap().push(Event::SendMessage(text.to_owned()));
        Ok(MessageHandle {
            chat: chat.clone(),
            message_id: 1,
        })
    }

    async fn edit_message(&self, _handle: &MessageHandle, text: &str) -> Result<()> {
        self.events.lock().unwrap().push(Event::Edit(text.to_owned()));

        match self.edit_script.lock().unwrap().pop_front() {
            None | Some(EditOutcome::Ok) => Ok(()),
            Some(EditOutcome::RateLimited(secs)) => Err(BotClientError::RateLimited {
                retry_after: Duration::from_secs(secs),
            }),
            Some(EditOutcome::Fail(reason)) => Err(BotClientError::Api(reason)),
        }
    }

    async fn send_file(
        &self,
        kind: FileKind,
        path: &Path,
        _caption: &str,
        _chat: &ChatTarget,
        _topic: Option<i64>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.events.lock().unwrap().push(Event::SendFile(kind, path.to_path_buf()));

        let total_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        for &tick in &self.progress_ticks {
            tokio::time::sleep(Duration::from_millis(100)).await;
            progress.on_progress(tick, total_bytes).await;
        }

        match self.send_script.lock().unwrap().pop_front() {
            None | Some(SendOutcome::Ok) => Ok(()),
            Some(SendOutcome::Fail(reason)) => Err(BotClientError::Api(reason)),
        }
    }
}
