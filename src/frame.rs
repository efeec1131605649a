//! Wire format: a 4-byte little-endian `u32` length followed by that many payload bytes.
//!
//! Browsers document the prefix as "native byte order". Every platform a browser ships
//! native messaging on is little-endian, so this crate fixes little-endian explicitly
//! and stays portable.

use std::io::{self, ErrorKind, Read, Write};

use crate::error::{FrameError, Result};

/// Size of the length prefix.
pub const HEADER_LEN: usize = 4;

/// Browser → host limit documented by Chrome (64 MiB).
pub const MAX_FROM_BROWSER: usize = 64 * 1_048_576;

/// Host → browser limit enforced by Chrome (1 MiB).
pub const MAX_TO_BROWSER: usize = 1_048_576;

/// Size bounds applied by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Largest declared length `receive` accepts before allocating.
    pub max_incoming: usize,
    /// Largest payload `send` accepts.
    pub max_outgoing: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_incoming: MAX_FROM_BROWSER,
            max_outgoing: MAX_FROM_BROWSER,
        }
    }
}

impl FrameConfig {
    /// Limits for a host talking to a browser: 64 MiB in, 1 MiB out.
    pub fn browser() -> Self {
        Self {
            max_incoming: MAX_FROM_BROWSER,
            max_outgoing: MAX_TO_BROWSER,
        }
    }
}

#[inline]
pub fn encode_len(len: u32) -> [u8; HEADER_LEN] {
    len.to_le_bytes()
}

#[inline]
pub fn decode_len(header: [u8; HEADER_LEN]) -> u32 {
    u32::from_le_bytes(header)
}

/// Reject a declared inbound length above `max`.
pub(crate) fn check_incoming(len: u32, max: usize) -> Result<usize> {
    let len = len as usize;
    if len > max {
        return Err(FrameError::InvalidLength {
            len: len as u64,
            max: max as u64,
        });
    }
    Ok(len)
}

/// Compute the header for an outbound payload, rejecting anything above `max`
/// or beyond what a `u32` prefix can describe.
pub(crate) fn outgoing_header(len: usize, max: usize) -> Result<[u8; HEADER_LEN]> {
    let limit = max.min(u32::MAX as usize);
    if len > limit {
        return Err(FrameError::InvalidLength {
            len: len as u64,
            max: limit as u64,
        });
    }
    Ok(encode_len(len as u32))
}

/// Encode a payload into a complete frame.
pub fn encode_frame(payload: &[u8], max: usize) -> Result<Vec<u8>> {
    let header = outgoing_header(payload.len(), max)?;
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&header);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Read until `buf` is full or the stream ends. Returns how many bytes landed.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Read one frame from `reader`.
///
/// Returns [`FrameError::Disconnected`] if the stream ends before any header byte,
/// [`FrameError::ShortRead`] if it ends anywhere later inside the frame, and
/// [`FrameError::InvalidLength`] if the declared length exceeds `max`.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R, max: usize) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_LEN];
    match fill(reader, &mut header).map_err(FrameError::Read)? {
        0 => return Err(FrameError::Disconnected),
        HEADER_LEN => {}
        received => {
            return Err(FrameError::ShortRead {
                expected: HEADER_LEN,
                received,
            })
        }
    }

    let len = check_incoming(decode_len(header), max)?;
    tracing::trace!(len, "frame header");

    let mut payload = vec![0u8; len];
    let received = fill(reader, &mut payload).map_err(FrameError::Read)?;
    if received < len {
        return Err(FrameError::ShortRead {
            expected: len,
            received,
        });
    }
    Ok(payload)
}

/// Write one frame to `writer` and flush it.
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, payload: &[u8], max: usize) -> Result<()> {
    let header = outgoing_header(payload.len(), max)?;
    writer
        .write_all(&header)
        .and_then(|_| writer.write_all(payload))
        .and_then(|_| writer.flush())
        .map_err(FrameError::WriteFailure)?;
    tracing::trace!(len = payload.len(), "frame sent");
    Ok(())
}
