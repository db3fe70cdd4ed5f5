use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::ProgressSink;

/// Block size for streamed upload bodies. Small enough to keep progress
/// reporting responsive on slow links, large enough to not dominate per-call
/// overhead.
pub const UPLOAD_STREAM_BLOCK_SIZE: usize = 512 * 1024;

struct StreamState {
    file: File,
    sink: Arc<dyn ProgressSink>,
    bytes_sent: u64,
    total_bytes: u64,
    block_size: usize,
    failed: bool,
}

/// Wraps an open file in a byte stream that reports cumulative progress to
/// the sink as blocks are pulled by the HTTP client.
///
/// The sink is awaited between blocks, so a sink that suspends (flood-control
/// backoff) stalls the transfer itself rather than racing ahead of it. The
/// file handle is owned by the stream and released when the stream is
/// dropped, on every exit path.
pub fn progress_file_stream(
    file: File,
    total_bytes: u64,
    sink: Arc<dyn ProgressSink>,
    block_size: usize,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    let state = StreamState {
        file,
        sink,
        bytes_sent: 0,
        total_bytes,
        block_size,
        failed: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        if st.failed {
            return None;
        }

        let mut buf = vec![0u8; st.block_size];
        match st.file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                st.bytes_sent += n as u64;
                st.sink.on_progress(st.bytes_sent, st.total_bytes).await;
                Some((Ok(Bytes::from(buf)), st))
            },
            Err(e) => {
                st.failed = true;
                Some((Err(e), st))
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use futures::StreamExt;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<(u64, u64)>>,
    }

    #[async_trait::async_trait]
    impl ProgressSink for RecordingSink {
        async fn on_progress(&self, current_bytes: u64, total_bytes: u64) {
            self.reports.lock().unwrap().push((current_bytes, total_bytes));
        }
    }

    #[tokio::test]
    async fn streams_blocks_and_reports_cumulative_totals() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"abcdefghij").unwrap();

        let file = File::open(tmp.path()).await.unwrap();
        let sink = Arc::new(RecordingSink::default());

        let chunks: Vec<_> = progress_file_stream(file, 10, sink.clone(), 3).collect().await;
        let chunks: Vec<Bytes> = chunks.into_iter().map(|c| c.unwrap()).collect();

        assert_eq!(
            chunks,
            vec![Bytes::from("abc"), Bytes::from("def"), Bytes::from("ghi"), Bytes::from("j")]
        );
        // Cumulative totals, ending on the terminal sample.
        assert_eq!(*sink.reports.lock().unwrap(), vec![(3, 10), (6, 10), (9, 10), (10, 10)]);
    }

    #[tokio::test]
    async fn empty_file_yields_no_blocks_and_no_reports() {
        let tmp = tempfile::NamedTempFile::new().unwrap();

        let file = File::open(tmp.path()).await.unwrap();
        let sink = Arc::new(RecordingSink::default());

        let chunks: Vec<_> = progress_file_stream(file, 0, sink.clone(), 4).collect().await;
        assert!(chunks.is_empty());
        assert!(sink.reports.lock().unwrap().is_empty());
    }
}
