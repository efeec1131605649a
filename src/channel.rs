use std::io::{self, Read, Stdin, Stdout, Write};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::frame::{read_frame, write_frame, FrameConfig};

/// A blocking, duplex framed channel over an inbound reader and an outbound writer.
///
/// `receive` and `send` take `&mut self`, so a channel is driven by one thread of
/// control at a time, strictly alternating.
pub struct Channel<R, W> {
    reader: R,
    writer: W,
    config: FrameConfig,
}

impl Channel<Stdin, Stdout> {
    /// Channel over the process's stdin/stdout, with browser limits.
    ///
    /// Rust's std handles never translate newlines, so no binary-mode switch is
    /// needed on Windows.
    pub fn stdio() -> Self {
        Self::with_config(io::stdin(), io::stdout(), FrameConfig::browser())
    }
}

impl<R: Read, W: Write> Channel<R, W> {
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

    /// Read the next frame's payload.
    ///
    /// See [`read_frame`](crate::frame::read_frame) for the error cases.
    pub fn receive(&mut self) -> Result<Vec<u8>> {
        read_frame(&mut self.reader, self.config.max_incoming)
    }

    /// Write one frame and flush it before returning.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        write_frame(&mut self.writer, payload, self.config.max_outgoing)
    }

    /// Receive a frame and deserialize it as JSON.
    pub fn receive_json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let payload = self.receive()?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Serialize `msg` as JSON and send it as one frame.
    pub fn send_json<T: Serialize>(&mut self, msg: &T) -> Result<()> {
        let payload = serde_json::to_vec(msg)?;
        self.send(&payload)
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: FrameConfig) {
        self.config = config;
    }

    /// Give back the underlying reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
