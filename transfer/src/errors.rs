use std::path::PathBuf;

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Transport Error: {0}")]
    BotClient(#[from] bot_client::BotClientError),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransferError>;
