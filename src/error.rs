use std::io;

/// Errors produced by the framed channel and the host helpers built on it.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The inbound stream ended before the first byte of a new header.
    ///
    /// This is how the peer says goodbye: browsers close the host's stdin when the
    /// extension disconnects. Driving loops treat it as a clean shutdown.
    #[error("peer disconnected")]
    Disconnected,

    /// The inbound stream ended in the middle of a frame.
    #[error("short read: expected {expected} bytes, stream closed after {received}")]
    ShortRead { expected: usize, received: usize },

    /// A frame length exceeds the configured bound (or `u32::MAX` when sending).
    #[error("invalid frame length {len} (max {max})")]
    InvalidLength { len: u64, max: u64 },

    /// The outbound stream rejected a write or flush.
    #[error("failed to write frame: {0}")]
    WriteFailure(#[source] io::Error),

    /// The inbound stream failed for a reason other than end-of-stream.
    #[error("failed to read frame: {0}")]
    Read(#[source] io::Error),

    /// A typed message could not be (de)serialized as JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking stdio task did not complete.
    #[error("stdio task failed: {0}")]
    Join(String),
}

impl FrameError {
    /// `true` for the clean end-of-stream between frames.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, FrameError::Disconnected)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
