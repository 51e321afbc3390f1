use std::path::PathBuf;

/// Errors raised by a peer transport.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("no open link to a peer")]
    NotConnected,

    #[error("a link is already {0}")]
    Busy(&'static str),

    #[error("room {0} is already taken")]
    RoomTaken(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors decoding a peer message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message has no \"type\" tag")]
    MissingTag,
}

/// Invalid room code input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomCodeError {
    #[error("room code must be 4 digits, got {0:?}")]
    Invalid(String),

    #[error("cannot join your own room")]
    OwnRoom,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
