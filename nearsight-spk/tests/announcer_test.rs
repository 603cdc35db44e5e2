//! Queue behavior of the speech announcer

use async_trait::async_trait;
use nearsight_core::Announcer;
use nearsight_spk::{SpeechAnnouncer, SpeechConfig, SpeechError, SpeechSynthesizer, VoiceSettings};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

#[derive(Default)]
struct RecordingSynth {
    spoken: Mutex<Vec<(String, f32)>>,
    fail_on: Option<String>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynth {
    async fn synthesize(&self, text: &str, voice: &VoiceSettings) -> Result<(), SpeechError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if self.fail_on.as_deref() == Some(text) {
            return Err(SpeechError::Synthesizer("audio device lost".to_string()));
        }
        self.spoken.lock().push((text.to_string(), voice.rate));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[tokio::test(start_paused = true)]
async fn test_announcer_trait_object_queues_in_order() {
    let synth = Arc::new(RecordingSynth::default());
    let speech = SpeechAnnouncer::new(SpeechConfig::default(), synth.clone(), &Handle::current())
        .unwrap();
    let announcer: Arc<dyn Announcer> = Arc::new(speech.clone());

    announcer.announce("Object ahead");
    announcer.announce("Identifying objects");
    announcer.announce("");
    announcer.announce("Nothing detected");

    speech.flush().await.unwrap();

    let spoken: Vec<String> = synth.spoken.lock().iter().map(|(t, _)| t.clone()).collect();
    assert_eq!(spoken, vec!["Object ahead", "Identifying objects", "Nothing detected"]);
}

#[tokio::test(start_paused = true)]
async fn test_voice_settings_applied_to_every_utterance() {
    let synth = Arc::new(RecordingSynth::default());
    let speech = SpeechAnnouncer::new(SpeechConfig::default(), synth.clone(), &Handle::current())
        .unwrap();

    speech.speak("chair detected").unwrap();
    speech.speak("door detected").unwrap();
    speech.flush().await.unwrap();

    assert!(synth
        .spoken
        .lock()
        .iter()
        .all(|(_, rate)| (*rate - 0.6).abs() < f32::EPSILON));
}

#[tokio::test(start_paused = true)]
async fn test_failed_utterance_does_not_stall_queue() {
    let synth = Arc::new(RecordingSynth {
        fail_on: Some("second".to_string()),
        ..Default::default()
    });
    let speech = SpeechAnnouncer::new(SpeechConfig::default(), synth.clone(), &Handle::current())
        .unwrap();

    speech.speak("first").unwrap();
    speech.speak("second").unwrap();
    speech.speak("third").unwrap();
    speech.flush().await.unwrap();

    let spoken: Vec<String> = synth.spoken.lock().iter().map(|(t, _)| t.clone()).collect();
    assert_eq!(spoken, vec!["first", "third"]);
}

#[tokio::test(start_paused = true)]
async fn test_burst_is_never_dropped() {
    let synth = Arc::new(RecordingSynth::default());
    let config = SpeechConfig {
        backlog_warning: 4,
        ..SpeechConfig::default()
    };
    let speech = SpeechAnnouncer::new(config, synth.clone(), &Handle::current()).unwrap();

    for i in 0..50 {
        speech.speak(&format!("utterance {}", i)).unwrap();
    }
    assert!(speech.backlog() > 0);

    speech.flush().await.unwrap();
    assert_eq!(synth.spoken.lock().len(), 50);
    assert_eq!(speech.backlog(), 0);
}
