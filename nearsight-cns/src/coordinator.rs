//! Session owner wiring depth frames to the alert outputs
//!
//! The frame producer calls [`Coordinator::on_frame`] once per depth frame.
//! Capture requests go through a [`CaptureHandle`], which can be cloned onto
//! whatever context receives the user's trigger.

use crate::capability::DepthCapability;
use crate::config::NearsightConfig;
use crate::error::CnsError;
use crate::proximity::{ProximityStateMachine, ProximityUpdate};
use nearsight_core::{
    AlertState, Announcer, CueSchedule, DepthBuffer, DepthFrame, ProximityEvent, ProximityReading,
};
use nearsight_eye::{CapturedImage, DepthFrameSampler, InferenceEngine, ObjectDetectionPipeline};
use nearsight_sc::{AudioCueScheduler, AudioPlayer};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Snapshot of the engine for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    pub capability: DepthCapability,
    pub state: AlertState,
    pub cue: CueSchedule,
    pub frames_processed: u64,
    pub frames_rejected: u64,
}

/// External collaborators handed to the coordinator at startup.
pub struct Collaborators {
    pub player: Arc<dyn AudioPlayer>,
    pub announcer: Arc<dyn Announcer>,
    pub engine: Arc<dyn InferenceEngine>,
}

/// Entry point for capture requests.
///
/// Remembers the image of the most recent frame so a trigger without an
/// image of its own classifies what the camera saw last.
#[derive(Clone)]
pub struct CaptureHandle {
    pipeline: ObjectDetectionPipeline,
    latest: Arc<Mutex<Option<CapturedImage>>>,
}

impl CaptureHandle {
    fn new(pipeline: ObjectDetectionPipeline) -> Self {
        Self {
            pipeline,
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Classify `image` in the background. Never blocks the caller on inference.
    pub fn on_capture_requested(&self, image: CapturedImage) -> JoinHandle<Vec<String>> {
        debug!("capture requested");
        self.pipeline.classify(image)
    }

    /// Classify the image from the latest frame, if one has arrived.
    pub fn capture_latest(&self) -> Option<JoinHandle<Vec<String>>> {
        let image = self.latest.lock().clone();
        match image {
            Some(image) => Some(self.on_capture_requested(image)),
            None => {
                warn!("capture requested before any camera image arrived");
                None
            }
        }
    }

    fn store_latest(&self, image: CapturedImage) {
        *self.latest.lock() = Some(image);
    }

    pub fn has_image(&self) -> bool {
        self.latest.lock().is_some()
    }
}

/// Drives the proximity alert from depth frames.
///
/// Owns the sampler and the state machine; holds handles to the cue
/// scheduler and the shared announcer. `on_frame` takes `&mut self`, so
/// frames come from a single producer; share it across threads by moving it
/// onto the frame loop, not by reference.
pub struct Coordinator {
    capability: DepthCapability,
    sampler: DepthFrameSampler,
    proximity: ProximityStateMachine,
    cue: AudioCueScheduler,
    announcer: Arc<dyn Announcer>,
    capture: CaptureHandle,
    next_ordinal: u64,
    frames_processed: u64,
    frames_rejected: u64,
}

impl Coordinator {
    /// Build every component from `config`. Invalid configuration fails here, never per frame.
    pub fn new(
        config: &NearsightConfig,
        capability: DepthCapability,
        collaborators: Collaborators,
        runtime: Handle,
    ) -> Result<Self, CnsError> {
        config.validate().map_err(CnsError::Config)?;

        let sampler = DepthFrameSampler::from_config(&config.vision.depth)?;
        let proximity = ProximityStateMachine::new(config.proximity.clone())?;
        let cue = AudioCueScheduler::new(&config.cue, collaborators.player, runtime.clone())?;
        let pipeline = ObjectDetectionPipeline::new(
            config.vision.detection.clone(),
            collaborators.engine,
            Arc::clone(&collaborators.announcer),
            runtime,
        )?;

        if capability.is_supported() {
            info!(roi = ?sampler.roi(), "proximity engine ready");
        } else {
            warn!("scene depth unsupported on this device, proximity alerts disabled");
        }

        Ok(Self {
            capability,
            sampler,
            proximity,
            cue,
            announcer: collaborators.announcer,
            capture: CaptureHandle::new(pipeline),
            next_ordinal: 0,
            frames_processed: 0,
            frames_rejected: 0,
        })
    }

    /// Process one depth frame delivered by the frame source.
    ///
    /// `image` is the camera frame that accompanied the depth map, kept for
    /// [`CaptureHandle::capture_latest`]. Returns the proximity update, or
    /// `None` when the frame was not evaluated.
    pub fn on_frame(
        &mut self,
        buffer: &DepthBuffer<'_>,
        image: Option<CapturedImage>,
    ) -> Option<ProximityUpdate> {
        let ordinal = self.next_ordinal;
        self.process(buffer, ordinal, image)
    }

    /// Like [`on_frame`](Self::on_frame) for an owned frame carrying its own ordinal.
    pub fn on_depth_frame(
        &mut self,
        frame: &DepthFrame,
        image: Option<CapturedImage>,
    ) -> Option<ProximityUpdate> {
        match frame.as_buffer() {
            Ok(buffer) => self.process(&buffer, frame.ordinal, image),
            Err(e) => {
                warn!(ordinal = frame.ordinal, "Dropping malformed depth frame: {}", e);
                self.frames_rejected += 1;
                None
            }
        }
    }

    fn process(
        &mut self,
        buffer: &DepthBuffer<'_>,
        ordinal: u64,
        image: Option<CapturedImage>,
    ) -> Option<ProximityUpdate> {
        if let Some(image) = image {
            self.capture.store_latest(image);
        }

        if !self.capability.is_supported() {
            return None;
        }

        self.next_ordinal = self.next_ordinal.max(ordinal.saturating_add(1));

        let distance = match self.sampler.sample_frame(buffer) {
            Ok(distance) => distance,
            Err(e) => {
                warn!(ordinal, "Skipping depth frame: {}", e);
                self.frames_rejected += 1;
                return None;
            }
        };

        self.frames_processed += 1;
        let update = self.proximity.observe(ProximityReading::new(distance, ordinal));
        self.apply(&update);
        Some(update)
    }

    fn apply(&self, update: &ProximityUpdate) {
        // retime first so a fresh start repeats at the new interval
        if let Some(interval) = update.interval_seconds {
            self.cue.retime(interval);
        }

        for event in &update.events {
            match event {
                ProximityEvent::EnteredApproaching => {
                    info!(interval = ?update.interval_seconds, "obstacle ahead");
                    self.announcer.announce(&self.proximity.config().warning_text);
                    self.cue.start();
                }
                ProximityEvent::ExitedImminent => {
                    info!("path clear");
                    self.cue.stop();
                }
            }
        }
    }

    /// Handle for capture requests, shareable across threads.
    pub fn capture_handle(&self) -> CaptureHandle {
        self.capture.clone()
    }

    /// The cue scheduler, for wiring playback-completion callbacks.
    pub fn cue(&self) -> &AudioCueScheduler {
        &self.cue
    }

    pub fn state(&self) -> AlertState {
        self.proximity.state()
    }

    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            capability: self.capability,
            state: self.proximity.state(),
            cue: self.cue.schedule(),
            frames_processed: self.frames_processed,
            frames_rejected: self.frames_rejected,
        }
    }

    /// Silence the cue at session end. The alert state is left as is.
    pub fn shutdown(&self) {
        self.cue.stop();
        info!(
            frames = self.frames_processed,
            rejected = self.frames_rejected,
            "proximity engine stopped"
        );
    }
}
