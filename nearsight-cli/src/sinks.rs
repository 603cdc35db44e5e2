//! Log-only stand-ins for the audio and speech outputs

use async_trait::async_trait;
use nearsight_sc::{AudioPlayer, CueAsset, CueError, PlaybackId};
use nearsight_spk::{SpeechError, SpeechSynthesizer, VoiceSettings};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::info;

/// Pretends to play the cue for a fixed duration, then reports completion.
///
/// Completions arrive on the returned channel; forward them to
/// `AudioCueScheduler::on_playback_finished`. A halted playback never
/// reports.
pub struct LogPlayer {
    runtime: Handle,
    duration: Duration,
    current: Arc<AtomicU64>,
    plays: AtomicUsize,
    completions: mpsc::UnboundedSender<PlaybackId>,
}

impl LogPlayer {
    pub fn new(runtime: Handle, duration: Duration) -> (Self, mpsc::UnboundedReceiver<PlaybackId>) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let player = Self {
            runtime,
            duration,
            current: Arc::new(AtomicU64::new(0)),
            plays: AtomicUsize::new(0),
            completions,
        };
        (player, receiver)
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioPlayer for LogPlayer {
    fn play(&self, cue: &CueAsset, playback: PlaybackId) -> Result<(), CueError> {
        self.current.store(playback.0, Ordering::SeqCst);
        let count = self.plays.fetch_add(1, Ordering::SeqCst) + 1;
        info!(cue = %cue.path().display(), %playback, count, "beep");

        let current = Arc::clone(&self.current);
        let completions = self.completions.clone();
        let duration = self.duration;
        self.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if current.load(Ordering::SeqCst) == playback.0 {
                let _ = completions.send(playback);
            }
        });
        Ok(())
    }

    fn halt(&self) {
        self.current.store(0, Ordering::SeqCst);
        info!("cue halted");
    }
}

/// Logs each utterance and holds the speech channel for roughly its spoken length.
pub struct LogSynthesizer {
    words_per_second: f32,
}

impl LogSynthesizer {
    pub fn new() -> Self {
        // about 150 wpm at the platform default rate
        Self {
            words_per_second: 2.5,
        }
    }

    fn speaking_time(&self, text: &str, voice: &VoiceSettings) -> Duration {
        let words = text.split_whitespace().count().max(1) as f32;
        let speed = self.words_per_second * (voice.rate / 0.5).max(0.1);
        Duration::from_secs_f32(words / speed)
    }
}

impl Default for LogSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for LogSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceSettings) -> Result<(), SpeechError> {
        info!(text, voice = %voice.language, "speak");
        tokio::time::sleep(self.speaking_time(text, voice)).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
