//! Recording collaborators shared by the workspace tests

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use nearsight_core::{DepthFrame, RegionOfInterest};
use nearsight_eye::CapturedImage;
use nearsight_sc::{AudioCueScheduler, AudioPlayer, CueAsset, CueError, PlaybackId};
use nearsight_spk::{SpeechError, SpeechSynthesizer, VoiceSettings};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Plays for `duration`, then reports completion on a channel.
/// A halted playback never reports.
pub struct TimedPlayer {
    runtime: Handle,
    duration: Duration,
    current: Arc<AtomicU64>,
    pub started: Mutex<Vec<Instant>>,
    pub halts: AtomicUsize,
    completions: mpsc::UnboundedSender<PlaybackId>,
}

impl TimedPlayer {
    pub fn new(
        runtime: Handle,
        duration: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<PlaybackId>) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let player = Arc::new(Self {
            runtime,
            duration,
            current: Arc::new(AtomicU64::new(0)),
            started: Mutex::new(Vec::new()),
            halts: AtomicUsize::new(0),
            completions,
        });
        (player, receiver)
    }

    pub fn plays(&self) -> usize {
        self.started.lock().len()
    }

    /// Seconds between consecutive playback starts
    pub fn gaps(&self) -> Vec<f32> {
        self.started
            .lock()
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_secs_f32())
            .collect()
    }
}

impl AudioPlayer for TimedPlayer {
    fn play(&self, _cue: &CueAsset, playback: PlaybackId) -> Result<(), CueError> {
        self.started.lock().push(Instant::now());
        self.current.store(playback.0, Ordering::SeqCst);

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
        self.halts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route player completions into the scheduler, as the audio subsystem would.
pub fn forward_completions(
    mut completions: mpsc::UnboundedReceiver<PlaybackId>,
    cue: AudioCueScheduler,
) {
    tokio::spawn(async move {
        while let Some(playback) = completions.recv().await {
            cue.on_playback_finished(playback);
        }
    });
}

/// Records utterances and flags any overlap.
#[derive(Default)]
pub struct RecordingSynth {
    pub spoken: Mutex<Vec<String>>,
    active: AtomicUsize,
    pub overlaps: AtomicUsize,
}

impl RecordingSynth {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynth {
    async fn synthesize(&self, text: &str, _voice: &VoiceSettings) -> Result<(), SpeechError> {
        if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.spoken.lock().push(text.to_string());
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// 256x192 frame reading `distance` across the default region, 5 m elsewhere.
pub fn frame(distance: f32, ordinal: u64) -> DepthFrame {
    let mut frame = DepthFrame::filled(256, 192, 5.0, ordinal);
    frame.fill_region(&RegionOfInterest::default(), distance);
    frame
}

pub fn camera_image() -> CapturedImage {
    Arc::new(DynamicImage::ImageRgb8(RgbImage::new(320, 240)))
}
