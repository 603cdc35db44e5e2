//! Audio playback seam

use crate::error::CueError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Fixed sound played by the proximity cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueAsset {
    path: PathBuf,
}

impl CueAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Identifies one playback started by the scheduler.
///
/// The player hands it back on completion so a late report from a halted
/// playback cannot be mistaken for the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackId(pub u64);

impl fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Platform audio output.
///
/// `play` starts one playback and returns without waiting for it. When the
/// playback ends the platform reports it through
/// [`AudioCueScheduler::on_playback_finished`](crate::AudioCueScheduler::on_playback_finished)
/// with the same `PlaybackId`, from any thread, but never from inside `play`.
///
/// Both methods run under the scheduler's lock: neither may call back into
/// the scheduler synchronously.
pub trait AudioPlayer: Send + Sync {
    fn play(&self, cue: &CueAsset, playback: PlaybackId) -> Result<(), CueError>;

    /// Halt the playback in progress, if any. Must not report completion
    /// from inside this call.
    fn halt(&self);
}
