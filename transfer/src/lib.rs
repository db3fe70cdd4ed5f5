mod batch_runner;
pub mod errors;
pub mod render;
mod status_reporter;
mod task;
#[cfg(test)]
mod test_utils;
mod upload_executor;

pub use batch_runner::{BatchRequest, BatchRunner, INTER_FILE_DELAY};
pub use errors::{Result, TransferError};
pub use status_reporter::StatusReporter;
pub use task::{BatchSummary, Outcome, TransferTask};
pub use upload_executor::UploadExecutor;
