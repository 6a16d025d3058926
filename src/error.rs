use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entity::RoomKey;
use crate::sim::world::Phase;

/// Errors raised while reading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Room registry defects. Detected once, when the registry is built.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("could not read map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("map parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("room {0} is defined twice")]
    DuplicateRoom(RoomKey),

    #[error("start room {0} is not defined")]
    MissingRoom(RoomKey),

    #[error("gate in room {room} leads to undefined room {to}")]
    UnknownGateTarget { room: RoomKey, to: RoomKey },

    #[error("layout of room {room} ({top},{left})-({bottom},{right}) does not fit the board")]
    LayoutOutOfBounds {
        room: RoomKey,
        top: usize,
        left: usize,
        bottom: usize,
        right: usize,
    },

    #[error("{what} in room {room} at ({x},{y}) is outside the board")]
    OutOfBounds {
        room: RoomKey,
        what: String,
        x: usize,
        y: usize,
    },

    #[error("gate and item share cell ({x},{y}) in room {room}")]
    GateOnItem { room: RoomKey, x: usize, y: usize },

    #[error("stat {value} of {name} in room {room} is out of range")]
    StatOutOfRange { room: RoomKey, name: String, value: i32 },
}

/// A turn that could not be resolved. State is untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("no turn can be taken in phase {0:?}")]
    NotPlaying(Phase),
}
