use std::path::{Path, PathBuf};
use std::time::Duration;

use bot_client::ChatTarget;
use tracing::info;
use walkdir::WalkDir;

use crate::errors::{Result, TransferError};
use crate::task::{BatchSummary, TransferTask};
use crate::upload_executor::UploadExecutor;

/// Fixed spacing between consecutive file uploads, applied regardless of the
/// previous outcome to stay under the service's rate limits.
pub const INTER_FILE_DELAY: Duration = Duration::from_secs(1);

/// Per-batch options shared by every discovered file.
#[derive(Clone, Debug)]
pub struct BatchRequest {
    pub chat: ChatTarget,
    pub root: PathBuf,
    pub caption: Option<String>,
    pub force_document: bool,
    pub topic: Option<i64>,
    pub delete_on_success: bool,
}

/// Enumerates the work list and feeds it to the executor, strictly one file
/// in flight at a time. Individual failures are tallied, never escalated.
pub struct BatchRunner {
    executor: UploadExecutor,
    inter_file_delay: Duration,
}

impl BatchRunner {
    pub fn new(executor: UploadExecutor) -> Self {
        Self {
            executor,
            inter_file_delay: INTER_FILE_DELAY,
        }
    }

    pub fn with_inter_file_delay(mut self, inter_file_delay: Duration) -> Self {
        self.inter_file_delay = inter_file_delay;
        self
    }

    /// Resolves a root path to the ordered upload list: the path itself when
    /// it names a file, otherwise every file under it, recursively, sorted
    /// by full path for a deterministic order across runs and platforms.
    pub fn resolve_files(root: &Path) -> Result<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }
        if !root.is_dir() {
            return Err(TransferError::PathNotFound(root.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();

        Ok(files)
    }

    pub async fn run(&self, request: &BatchRequest) -> Result<BatchSummary> {
        let files = Self::resolve_files(&request.root)?;
        info!(count = files.len(), root = %request.root.display(), "files to upload");

        let mut summary = BatchSummary::default();
        for (i, path) in files.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.inter_file_delay).await;
            }

            let task = TransferTask {
                path: path.clone(),
                chat: request.chat.clone(),
                caption: request.caption.clone(),
                force_document: request.force_document,
                topic: request.topic,
                delete_on_success: request.delete_on_success,
            };

            summary.push(self.executor.execute(&task).await);
        }

        info!(
            total = summary.total(),
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "batch finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use tokio::time::pause;

    use super::*;
    use crate::test_utils::{FakeTransport, SendOutcome};

    fn populate(dir: &tempfile::TempDir) -> PathBuf {
        let root = dir.path();
        fs::write(root.join("b.txt"), b"b").unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::create_dir(root.join("c")).unwrap();
        fs::write(root.join("c").join("d.txt"), b"d").unwrap();
        root.to_path_buf()
    }

    fn request(root: PathBuf) -> BatchRequest {
        BatchRequest {
            chat: "42".parse().unwrap(),
            root,
            caption: None,
            force_document: false,
            topic: None,
            delete_on_success: false,
        }
    }

    #[test]
    fn resolve_files_sorts_full_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = populate(&dir);

        let files = BatchRunner::resolve_files(&root).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec!["a.txt".to_owned(), "b.txt".to_owned(), format!("c{}d.txt", std::path::MAIN_SEPARATOR)]
        );
    }

    #[test]
    fn resolve_files_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("only.bin");
        fs::write(&path, b"x").unwrap();

        assert_eq!(BatchRunner::resolve_files(&path).unwrap(), vec![path]);
    }

    #[test]
    fn resolve_files_missing_root_is_an_error() {
        assert!(matches!(
            BatchRunner::resolve_files(Path::new("/no/such/root")),
            Err(TransferError::PathNotFound(_))
        ));
    }

    #[tokio::test]
    async fn runs_sequentially_in_sorted_order() {
        pause();

        let dir = tempfile::tempdir().unwrap();
        let root = populate(&dir);

        let transport = Arc::new(FakeTransport::default());
        let runner = BatchRunner::new(UploadExecutor::new(transport.clone()));

        let summary = runner.run(&request(root.clone())).await.unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.succeeded(), 3);
        assert_eq!(summary.failed(), 0);

        let sent = transport.sent_file_paths();
        assert_eq!(sent, vec![root.join("a.txt"), root.join("b.txt"), root.join("c").join("d.txt")]);
    }

    #[tokio::test]
    async fn individual_failure_does_not_abort_the_batch() {
        pause();

        let dir = tempfile::tempdir().unwrap();
        let root = populate(&dir);

        let transport = Arc::new(FakeTransport::default());
        transport.script_sends([SendOutcome::Fail("flaky".to_owned())]);
        let runner = BatchRunner::new(UploadExecutor::new(transport.clone()));

        let summary = runner.run(&request(root)).await.unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        // The failing file is the first in sorted order.
        assert!(!summary.outcomes[0].success);
        assert!(summary.outcomes[1].success);
    }

    #[tokio::test]
    async fn empty_directory_completes_with_empty_summary() {
        pause();

        let dir = tempfile::tempdir().unwrap();

        let transport = Arc::new(FakeTransport::default());
        let runner = BatchRunner::new(UploadExecutor::new(transport.clone()));

        let summary = runner.run(&request(dir.path().to_path_buf())).await.unwrap();

        assert_eq!(summary.total(), 0);
        assert!(summary.outcomes.is_empty());
        assert!(transport.events().is_empty());
    }
}
