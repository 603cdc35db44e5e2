//! nearsight-sc: sound cue for the proximity alert
//!
//! Provides a sonar-like repeating cue:
//! - one playback in flight at a time
//! - repeat interval re-read on every cycle, so it tracks distance
//! - clean cancellation when the alert clears, even with a completion in flight

pub mod config;
pub mod cue_scheduler;
pub mod error;
pub mod playback;

pub use config::CueConfig;
pub use cue_scheduler::AudioCueScheduler;
pub use error::CueError;
pub use playback::{AudioPlayer, CueAsset, PlaybackId};
