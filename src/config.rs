//! Host configuration, read from TOML.
//!
//! ```toml
//! host_name = "com.example.echo"
//! description = "Echo host"
//! max_incoming = 67108864
//! max_outgoing = 1048576
//! allowed_origins = ["chrome-extension://aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa/"]
//! allowed_extensions = ["echo@example.org"]
//! browsers = ["chrome", "firefox"]
//!
//! [log]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Every key is optional.

use serde::Deserialize;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use crate::frame::{FrameConfig, MAX_FROM_BROWSER, MAX_TO_BROWSER};

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "NATIVE_FRAME_CONFIG";

pub const DEFAULT_HOST_NAME: &str = "com.native_frame.echo";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub host_name: String,
    pub description: String,
    pub max_incoming: usize,
    pub max_outgoing: usize,
    pub allowed_origins: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub browsers: Vec<String>,
    pub log: LogConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host_name: DEFAULT_HOST_NAME.to_string(),
            description: "Echoes every native message back to the extension".to_string(),
            max_incoming: MAX_FROM_BROWSER,
            max_outgoing: MAX_TO_BROWSER,
            allowed_origins: Vec::new(),
            allowed_extensions: Vec::new(),
            browsers: vec!["chrome".to_string(), "firefox".to_string()],
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl HostConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> io::Result<Self> {
        let config: HostConfig = toml::from_str(raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            io::Error::new(e.kind(), format!("reading {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load from `explicit`, else from `$NATIVE_FRAME_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> io::Result<Self> {
        match explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
        {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_incoming: self.max_incoming,
            max_outgoing: self.max_outgoing,
        }
    }

    pub fn validate(&self) -> io::Result<()> {
        validate_host_name(&self.host_name)?;
        if self.max_incoming > u32::MAX as usize || self.max_outgoing > u32::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "frame limits must fit in a u32 length prefix",
            ));
        }
        Ok(())
    }
}

/// Check a native messaging host name.
///
/// Browsers accept lowercase alphanumerics, `_` and `.`; dots may not lead, trail
/// or repeat.
pub fn validate_host_name(name: &str) -> io::Result<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'.')
        && !name.starts_with('.')
        && !name.ends_with('.')
        && !name.contains("..");
    if valid {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid host name {name:?}"),
        ))
    }
}
