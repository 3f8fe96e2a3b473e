//! Byte-stream to async reader adaptation with a hard size cap.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt;
use std::io;
use std::pin::Pin;
use tokio_util::io::StreamReader;

/// Marker carried inside an [`io::Error`] when a body exceeds its size cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimitExceeded {
    pub max_bytes: u64,
}

impl fmt::Display for PayloadLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "payload exceeds {} bytes", self.max_bytes)
    }
}

impl std::error::Error for PayloadLimitExceeded {}

/// Buffered reader over a chunk stream.
pub type LimitedStreamReader<'a> =
    StreamReader<Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'a>>, Bytes>;

/// Adapt a stream of byte chunks into an `AsyncBufRead`, failing with
/// [`PayloadLimitExceeded`] once more than `max_bytes` have been received.
pub fn limited_reader<'a, S, E>(stream: S, max_bytes: u64) -> LimitedStreamReader<'a>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'a,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut received: u64 = 0;
    let limited = stream.map(move |chunk| {
        let chunk = chunk.map_err(io::Error::other)?;
        received += chunk.len() as u64;
        if received > max_bytes {
            return Err(io::Error::other(PayloadLimitExceeded { max_bytes }));
        }
        Ok(chunk)
    });

    StreamReader::new(Box::pin(limited))
}

/// The size cap that `err` reports, if it came from [`limited_reader`].
pub fn payload_limit(err: &io::Error) -> Option<u64> {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<PayloadLimitExceeded>())
        .map(|limit| limit.max_bytes)
}
