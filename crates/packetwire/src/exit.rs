use std::fmt;

use packetwire_frame::FrameError;
use packetwire_registry::RegistrationError;
use packetwire_value::ValueError;

// Exit codes shared by every subcommand.
pub const SUCCESS: i32 = 0;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

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
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn hex_error(context: &str, err: hex::FromHexError) -> CliError {
    CliError::new(USAGE, format!("{context}: invalid hex: {err}"))
}

pub fn json_error(context: &str, err: serde_json::Error) -> CliError {
    CliError::new(USAGE, format!("{context}: invalid JSON: {err}"))
}

pub fn value_error(context: &str, err: ValueError) -> CliError {
    match err {
        ValueError::Unsupported(_) | ValueError::NoOpaqueCodec => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Payload(err) => value_error(context, err),
        FrameError::EmptyFrame
        | FrameError::UnknownDiscriminator { .. }
        | FrameError::FrameTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn registration_error(context: &str, err: RegistrationError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}
