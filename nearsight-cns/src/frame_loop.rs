//! Dedicated thread feeding depth frames to the coordinator

use crate::coordinator::Coordinator;
use crate::error::CnsError;
use crossbeam_channel::{Receiver, Sender};
use nearsight_core::DepthFrame;
use nearsight_eye::CapturedImage;
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// Message from the frame source
pub enum FrameMessage {
    /// Depth map plus the camera image captured with it, if any
    Frame(DepthFrame, Option<CapturedImage>),
    Shutdown,
}

/// Bounded frame channel.
///
/// Sources should `try_send` and drop a frame when the channel is full; the
/// next frame supersedes it anyway.
pub fn channel(capacity: usize) -> (Sender<FrameMessage>, Receiver<FrameMessage>) {
    crossbeam_channel::bounded(capacity.max(1))
}

/// Run `coordinator` on its own thread until `Shutdown` arrives or every sender is gone.
///
/// The thread silences the cue on exit and hands the coordinator back
/// through the join handle, so final status can be read.
pub fn spawn(
    mut coordinator: Coordinator,
    frames: Receiver<FrameMessage>,
) -> Result<JoinHandle<Coordinator>, CnsError> {
    thread::Builder::new()
        .name("nearsight-frames".to_string())
        .spawn(move || {
            info!("frame loop started");
            loop {
                match frames.recv() {
                    Ok(FrameMessage::Frame(frame, image)) => {
                        coordinator.on_depth_frame(&frame, image);
                    }
                    Ok(FrameMessage::Shutdown) => {
                        debug!("frame loop shutdown requested");
                        break;
                    }
                    Err(_) => {
                        debug!("frame source disconnected");
                        break;
                    }
                }
            }
            coordinator.shutdown();
            coordinator
        })
        .map_err(|e| CnsError::FrameLoop(format!("Failed to spawn frame thread: {}", e)))
}
