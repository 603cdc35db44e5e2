//! Serialized spoken output
//!
//! Every utterance goes through one FIFO queue drained by a single worker,
//! so announcements from the proximity engine and the detection pipeline
//! never overlap on the synthesis resource.

use crate::config::{SpeechConfig, VoiceSettings};
use crate::engines::SpeechSynthesizer;
use crate::error::SpeechError;
use nearsight_core::Announcer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

enum SpeechRequest {
    Speak(String),
    Flush(oneshot::Sender<()>),
}

/// Shared handle to the speech queue.
///
/// Cloning is cheap; all clones feed the same worker. The worker exits once
/// every handle has been dropped and the queue is drained.
#[derive(Clone)]
pub struct SpeechAnnouncer {
    sender: mpsc::UnboundedSender<SpeechRequest>,
    backlog: Arc<AtomicUsize>,
    config: Arc<SpeechConfig>,
}

impl SpeechAnnouncer {
    /// Spawn the queue worker on `runtime`.
    pub fn new(
        config: SpeechConfig,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        runtime: &Handle,
    ) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        if !synthesizer.is_available() {
            warn!(
                engine = synthesizer.name(),
                "speech engine unavailable, utterances will fail"
            );
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let backlog = Arc::new(AtomicUsize::new(0));
        let voice = config.voice.clone();

        runtime.spawn(run_queue(receiver, synthesizer, voice, Arc::clone(&backlog)));
        info!("Speech announcer started");

        Ok(Self {
            sender,
            backlog,
            config: Arc::new(config),
        })
    }

    /// Queue `text` for speaking. Returns without waiting for synthesis.
    pub fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::InvalidText("Text cannot be empty".to_string()));
        }

        if text.contains('\0') {
            return Err(SpeechError::InvalidText("Text contains null bytes".to_string()));
        }

        if text.len() > self.config.max_text_len {
            return Err(SpeechError::InvalidText(format!(
                "Text too long (max {} bytes)",
                self.config.max_text_len
            )));
        }

        let waiting = self.backlog.fetch_add(1, Ordering::SeqCst) + 1;
        if waiting >= self.config.backlog_warning {
            warn!(waiting, "speech backlog growing");
        }

        self.sender
            .send(SpeechRequest::Speak(text.to_string()))
            .map_err(|_| {
                self.backlog.fetch_sub(1, Ordering::SeqCst);
                SpeechError::Synthesizer("Speech queue closed".to_string())
            })
    }

    /// Resolve once everything queued before this call has been synthesized.
    pub async fn flush(&self) -> Result<(), SpeechError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SpeechRequest::Flush(tx))
            .map_err(|_| SpeechError::Synthesizer("Speech queue closed".to_string()))?;
        rx.await
            .map_err(|_| SpeechError::Synthesizer("Speech queue closed".to_string()))
    }

    /// Utterances queued but not yet handed to the synthesizer
    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::SeqCst)
    }

    pub fn voice(&self) -> &VoiceSettings {
        &self.config.voice
    }
}

impl Announcer for SpeechAnnouncer {
    fn announce(&self, text: &str) {
        if let Err(e) = self.speak(text) {
            warn!("Dropping announcement: {}", e);
        }
    }
}

async fn run_queue(
    mut receiver: mpsc::UnboundedReceiver<SpeechRequest>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voice: VoiceSettings,
    backlog: Arc<AtomicUsize>,
) {
    while let Some(request) = receiver.recv().await {
        match request {
            SpeechRequest::Speak(text) => {
                backlog.fetch_sub(1, Ordering::SeqCst);
                debug!(text = %text, "speaking");
                if let Err(e) = synthesizer.synthesize(&text, &voice).await {
                    warn!(engine = synthesizer.name(), "Speech synthesis failed: {}", e);
                }
            }
            SpeechRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Speech queue closed");
}
