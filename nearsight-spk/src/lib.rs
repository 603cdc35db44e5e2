//! nearsight-spk: spoken announcements
//!
//! Provides text-to-speech output with:
//! - one FIFO queue shared by every announcing component
//! - a pluggable synthesis engine (espeak-ng included)
//! - fixed voice settings for every utterance

pub mod announcer;
pub mod config;
pub mod engines;
pub mod error;

pub use announcer::SpeechAnnouncer;
pub use config::{SpeechConfig, VoiceSettings};
pub use engines::{EspeakSynthesizer, SpeechSynthesizer};
pub use error::SpeechError;
