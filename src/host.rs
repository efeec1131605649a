//! Driving loops and stdio helpers for native messaging hosts.
//!
//! A host reads a frame, answers it, and repeats until the browser closes stdin.
//! That closure surfaces as [`FrameError::Disconnected`] and ends the loop with the
//! number of frames answered. A frame cut short, an oversized inbound length or a
//! broken stdout ends it with that error.
//!
//! A reply that would not fit the outbound limit is not fatal: the peer gets a small
//! `{"error":"reply_too_large",...}` object in its place and the loop goes on.

use std::io::{Read, Write};

use crate::channel::Channel;
use crate::error::{FrameError, Result};

#[cfg(feature = "tokio")]
use crate::async_channel::AsyncChannel;
#[cfg(feature = "tokio")]
use crate::frame::{FrameConfig, MAX_FROM_BROWSER};
#[cfg(feature = "tokio")]
use serde::Serialize;
#[cfg(feature = "tokio")]
use std::future::Future;

/// Run a blocking request/response loop: one reply per inbound frame.
///
/// Returns the number of frames answered once the peer disconnects.
pub fn serve<R, W, F>(channel: &mut Channel<R, W>, mut handler: F) -> Result<u64>
where
    R: Read,
    W: Write,
    F: FnMut(&[u8]) -> Vec<u8>,
{
    let mut answered = 0u64;
    loop {
        let payload = match channel.receive() {
            Ok(payload) => payload,
            Err(FrameError::Disconnected) => {
                tracing::debug!(answered, "peer closed the channel");
                return Ok(answered);
            }
            Err(err) => return Err(err),
        };
        let reply = handler(&payload);
        let reply = fit_reply(reply, payload.len(), channel.config().max_outgoing);
        channel.send(&reply)?;
        answered += 1;
    }
}

/// Async request/response loop over an [`AsyncChannel`].
///
/// The handler may return `None` to skip replying to a frame.
#[cfg(feature = "tokio")]
pub async fn event_loop<R, W, F, Fut>(channel: &mut AsyncChannel<R, W>, mut handler: F) -> Result<u64>
where
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
    F: FnMut(Vec<u8>) -> Fut,
    Fut: Future<Output = Result<Option<Vec<u8>>>>,
{
    let mut answered = 0u64;
    loop {
        let payload = match channel.receive().await {
            Ok(payload) => payload,
            Err(FrameError::Disconnected) => {
                tracing::debug!(answered, "peer closed the channel");
                return Ok(answered);
            }
            Err(err) => return Err(err),
        };
        let bytes_in = payload.len();
        if let Some(reply) = handler(payload).await? {
            let reply = fit_reply(reply, bytes_in, channel.config().max_outgoing);
            channel.send(&reply).await?;
            answered += 1;
        }
    }
}

fn fit_reply(reply: Vec<u8>, bytes_in: usize, max_outgoing: usize) -> Vec<u8> {
    if reply.len() <= max_outgoing {
        return reply;
    }
    tracing::warn!(bytes_in, bytes_out = reply.len(), max_outgoing, "reply over outbound limit");
    serde_json::json!({
        "error": "reply_too_large",
        "bytes_in": bytes_in,
        "bytes_out": reply.len(),
        "max": max_outgoing,
    })
    .to_string()
    .into_bytes()
}

/// Read one message from the process's stdin.
///
/// Runs on a blocking thread over `std::io::stdin`, whose buffer is shared
/// process-wide, so consecutive calls never lose bytes between them.
#[cfg(feature = "tokio")]
pub async fn get_message() -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(|| {
        let mut stdin = std::io::stdin().lock();
        crate::frame::read_frame(&mut stdin, MAX_FROM_BROWSER)
    })
    .await
    .map_err(|e| FrameError::Join(e.to_string()))?
}

/// Serialize `msg` as JSON and write it to stdout as one flushed frame.
#[cfg(feature = "tokio")]
pub async fn send_message<T: Serialize>(msg: &T) -> Result<()> {
    let payload = serde_json::to_vec(msg)?;
    let frame = crate::frame::encode_frame(&payload, FrameConfig::browser().max_outgoing)?;
    tokio::task::spawn_blocking(move || {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&frame)
            .and_then(|_| stdout.flush())
            .map_err(FrameError::WriteFailure)
    })
    .await
    .map_err(|e| FrameError::Join(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_within_the_limit_pass_through() {
        assert_eq!(fit_reply(b"{}".to_vec(), 2, 2), b"{}");
    }

    #[test]
    fn oversized_reply_becomes_error_object() {
        let out = fit_reply(vec![b' '; 2048], 2040, 1024);
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["error"], "reply_too_large");
        assert_eq!(v["bytes_in"], 2040);
        assert_eq!(v["bytes_out"], 2048);
        assert_eq!(v["max"], 1024);
    }
}
