//! # native_frame
//!
//! Length-prefixed message framing for **browser Native Messaging** hosts, and a
//! small echo host built on it:
//!
//! - A blocking [`Channel`] (and, with the `tokio` feature, an [`AsyncChannel`]) that
//!   reads and writes discrete frames over any byte stream
//! - A request/response driving loop that treats stdin closing as a normal shutdown
//! - An echo reply that wraps each JSON message as `{"echo": <message>}`
//! - Install, verify and remove **native host manifests** for multiple browsers
//!
//! ---
//!
//! ## Wire format
//!
//! ```text
//! Frame := LengthPrefix(4 bytes, u32, little-endian) || Payload(LengthPrefix bytes)
//! ```
//!
//! Browsers document the prefix as native byte order. This crate fixes it to
//! little-endian, which is what every browser platform uses, so the contract does
//! not depend on the host CPU.
//!
//! The framing layer is content-agnostic: payloads are opaque bytes. JSON only comes
//! in through the `*_json` helpers and the [`echo`] module.
//!
//! ### Errors you should expect
//!
//! - [`FrameError::Disconnected`]: stdin closed between frames. The browser does this
//!   when the extension disconnects; [`host::serve`] returns `Ok` on it.
//! - [`FrameError::ShortRead`]: the stream closed in the middle of a frame.
//! - [`FrameError::InvalidLength`]: a declared length exceeds [`FrameConfig`]'s bound.
//!   Checked before anything is allocated, so a garbage prefix such as `0xFFFFFFFF`
//!   cannot trigger a 4 GiB allocation.
//! - [`FrameError::WriteFailure`]: stdout is gone (usually the browser exited).
//!
//! Nothing is retried and nothing is swallowed; every error reaches the caller.
//!
//! ### Never write to stdout
//!
//! stdout carries frames. A stray `println!` corrupts the stream and the browser
//! drops the connection. Log to stderr (the `native-echo-host` binary does this via
//! `tracing-subscriber`).
//!
//! ---
//!
//! ## Pure framing (runnable example)
//!
//! ```rust
//! use native_frame::Channel;
//! use std::io::Cursor;
//!
//! let mut out = Vec::new();
//! Channel::new(std::io::empty(), &mut out).send(br#"{"value":1}"#).unwrap();
//! assert_eq!(&out[..4], &11u32.to_le_bytes());
//!
//! let mut channel = Channel::new(Cursor::new(out), std::io::sink());
//! assert_eq!(channel.receive().unwrap(), br#"{"value":1}"#);
//! assert!(channel.receive().unwrap_err().is_disconnect());
//! ```
//!
//! ## An echo host in three lines
//!
//! ```no_run
//! use native_frame::{echo, host, Channel};
//!
//! fn main() -> Result<(), native_frame::FrameError> {
//!     let mut channel = Channel::stdio();
//!     host::serve(&mut channel, echo::reply)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Async
//!
//! With the `tokio` feature, [`AsyncChannel`] and [`host::event_loop`] do the same
//! over `AsyncRead`/`AsyncWrite`. One task drives the channel; receive and send are
//! never in flight together.
//!
//! ```no_run
//! use native_frame::{echo, host, AsyncChannel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), native_frame::FrameError> {
//!     let mut channel = AsyncChannel::stdio();
//!     host::event_loop(&mut channel, |msg| async move { Ok(Some(echo::reply(&msg))) }).await?;
//!     Ok(())
//! }
//! ```
//!
//! ---
//!
//! ## Installing the manifest
//!
//! Browsers only launch hosts they find through a manifest. The embedded browser table
//! covers `chrome`, `edge`, `chromium`, `brave`, `vivaldi`, `firefox` and `librewolf`.
//!
//! ```no_run
//! use std::path::Path;
//! use native_frame::{install, Scope};
//!
//! install(
//!     "com.example.echo",
//!     "Echo host",
//!     Path::new("/usr/local/bin/native-echo-host"),
//!     &["chrome-extension://aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa/".to_string()],
//!     &["echo@example.org".to_string()],
//!     &["chrome", "firefox"],
//!     Scope::User,
//! )
//! .unwrap();
//! ```

pub mod channel;
pub mod config;
pub mod echo;
pub mod error;
pub mod frame;
pub mod host;

#[cfg(feature = "tokio")]
pub mod async_channel;

#[cfg(feature = "install")]
pub mod install;

// -------- Framing re-exports --------

#[doc(inline)]
pub use channel::Channel;
#[doc(inline)]
pub use config::HostConfig;
#[doc(inline)]
pub use error::{FrameError, Result};
#[doc(inline)]
pub use frame::{
    decode_len, encode_frame, encode_len, read_frame, write_frame, FrameConfig, HEADER_LEN,
    MAX_FROM_BROWSER, MAX_TO_BROWSER,
};

#[cfg(feature = "tokio")]
#[doc(inline)]
pub use async_channel::AsyncChannel;
#[cfg(feature = "tokio")]
#[doc(inline)]
pub use host::{event_loop, get_message, send_message};

// -------- Install re-exports --------

#[cfg(feature = "install")]
#[doc(inline)]
pub use install::manifest::{install, remove, verify_installed, Manifest};
#[cfg(feature = "install")]
#[doc(inline)]
pub use install::paths::Scope;
