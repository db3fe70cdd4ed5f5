use std::path::{Path, PathBuf};

use bot_client::ChatTarget;

/// Everything needed to upload one file. Built per discovered file by the
/// batch runner, immutable afterwards, consumed once by the executor.
#[derive(Clone, Debug)]
pub struct TransferTask {
    pub path: PathBuf,
    pub chat: ChatTarget,
    pub caption: Option<String>,
    pub force_document: bool,
    pub topic: Option<i64>,
    pub delete_on_success: bool,
}

/// Terminal result of one task.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

impl Outcome {
    pub fn succeeded(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            success: true,
            error: None,
        }
    }

    pub fn failed(path: &Path, error: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Running tally over a batch; the only cross-file state in the system.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<Outcome>,
}

impl BatchSummary {
    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}
