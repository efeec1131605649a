use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ErrorKind, Stdin, Stdout};

use crate::error::{FrameError, Result};
use crate::frame::{check_incoming, decode_len, outgoing_header, FrameConfig, HEADER_LEN};

/// Async counterpart of [`Channel`](crate::Channel) for Tokio streams.
///
/// Each call awaits its reads or writes in sequence; `&mut self` keeps receive and
/// send from ever being in flight together on one channel.
pub struct AsyncChannel<R, W> {
    reader: R,
    writer: W,
    config: FrameConfig,
}

impl AsyncChannel<Stdin, Stdout> {
    /// Channel over Tokio's stdin/stdout, with browser limits.
    ///
    /// Tokio's stdin reads ahead on a blocking thread, so keep this channel for the
    /// life of the process rather than mixing it with `std::io::stdin`.
    pub fn stdio() -> Self {
        Self::with_config(tokio::io::stdin(), tokio::io::stdout(), FrameConfig::browser())
    }
}

impl<R, W> AsyncChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, FrameConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: FrameConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    pub async fn receive(&mut self) -> Result<Vec<u8>> {
        let mut header = [0u8; HEADER_LEN];
        match fill(&mut self.reader, &mut header).await? {
            0 => return Err(FrameError::Disconnected),
            HEADER_LEN => {}
            received => {
                return Err(FrameError::ShortRead {
                    expected: HEADER_LEN,
                    received,
                })
            }
        }

        let len = check_incoming(decode_len(header), self.config.max_incoming)?;
        tracing::trace!(len, "frame header");
        let mut payload = vec![0u8; len];
        let received = fill(&mut self.reader, &mut payload).await?;
        if received < len {
            return Err(FrameError::ShortRead {
                expected: len,
                received,
            });
        }
        Ok(payload)
    }

    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        let header = outgoing_header(payload.len(), self.config.max_outgoing)?;
        self.write_all(&header).await?;
        self.write_all(payload).await?;
        self.writer.flush().await.map_err(FrameError::WriteFailure)?;
        tracing::trace!(len = payload.len(), "frame sent");
        Ok(())
    }

    pub async fn receive_json<T: serde::de::DeserializeOwned>(&mut self) -> Result<T> {
        let payload = self.receive().await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    pub async fn send_json<T: serde::Serialize>(&mut self, msg: &T) -> Result<()> {
        let payload = serde_json::to_vec(msg)?;
        self.send(&payload).await
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.writer
            .write_all(buf)
            .await
            .map_err(FrameError::WriteFailure)
    }
}

async fn fill<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Read(err)),
        }
    }
    Ok(filled)
}
