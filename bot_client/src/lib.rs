pub mod error;
mod interface;
mod remote_client;
mod upload_progress_stream;

pub use error::{BotClientError, Result};
pub use interface::{ChatTarget, FileKind, MessageHandle, ProgressSink, Transport};
pub use remote_client::{BotApiClient, BotCredentials};
pub use upload_progress_stream::progress_file_stream;
