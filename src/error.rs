use thiserror::Error;

use crate::event::EventType;

// ---------------------- Decode Error ----------------------

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line is not valid json: {line:?}")]
    Json {
        line: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("line is not an object with exactly one event tag: {0:?}")]
    Shape(String),
    #[error("invalid {event_type:?} payload: {line:?}")]
    Payload {
        event_type: EventType,
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum EventTypeParseError {
    #[error("unknown event type: {0}")]
    Unknown(String),
}

// ---------------------- Publish Error ----------------------

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("error serializing snapshot")]
    Serialize(#[from] serde_json::Error),
    #[error("error writing {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error communicating with eww")]
    Eww(#[from] EwwError),
}

// ---------------------- Eww Error ----------------------

#[derive(Debug, Error)]
pub enum EwwError {
    #[error("error communicating with eww")]
    Io(#[from] std::io::Error),
    #[error("eww executable not found")]
    NoEwwExecutable,
    #[error("eww rejected update of variable \"{0}\"")]
    UpdateFailed(String),
}

// ---------------------- Config Error ----------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("event source command is empty")]
    EmptyCommand,
    #[error("unexpected argument: \"{0}\"")]
    UnexpectedArgument(String),
}

// ---------------------- Event Loop Error ----------------------

#[derive(Debug, Error)]
pub enum EventLoopError {
    #[error("error reading line from event source")]
    Read(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum NiriStatusError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("error spawning event source \"{program}\"")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("event source has no stdout pipe")]
    NoStdout,
    #[error("error creating eww instance")]
    Eww(#[from] EwwError),
    #[error("error in event loop")]
    EventLoop(#[from] EventLoopError),
}
