//! Utility modules

pub mod limited_stream;

pub use limited_stream::{limited_reader, payload_limit, LimitedStreamReader, PayloadLimitExceeded};
