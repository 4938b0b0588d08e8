pub mod config;
pub mod engine;
pub mod events;
pub mod midi;
pub mod model;
pub mod playback;
pub mod session;

pub use config::{Config, DurationPolicy};
pub use engine::{EngineCommand, EngineHandle, EngineUpdate, spawn_engine};
pub use events::{InputEvent, MidiMessage, NoteEvent};
pub use model::{Continuation, Generator, SuffixTrie, Trainer};
pub use session::{CycleOutcome, SessionController};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI init failed: {0}")]
    MidiInit(#[from] midir::InitError),
    #[error("no MIDI {0} port available")]
    NoPort(&'static str),
    #[error("failed to query MIDI port: {0}")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("failed to connect to '{port}': {message}")]
    Connect { port: String, message: String },
    #[error("MIDI send failed: {0}")]
    Send(#[from] midir::SendError),
    #[error("playback queue is full")]
    PlaybackQueueFull,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
    #[error("config write error: {0}")]
    ConfigWrite(#[from] ron::Error),
}
