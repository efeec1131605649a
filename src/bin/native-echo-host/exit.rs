use std::fmt;
use std::io;

use native_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<FrameError> for CliError {
    fn from(err: FrameError) -> Self {
        let code = match err {
            FrameError::ShortRead { .. } | FrameError::InvalidLength { .. } => DATA_INVALID,
            _ => FAILURE,
        };
        Self::new(code, err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => USAGE,
            _ => FAILURE,
        };
        Self::new(code, err.to_string())
    }
}
