//! nearsight-cns: the proximity alert engine
//!
//! Provides:
//! - distance classification with edge-triggered alert events
//! - a coordinator turning depth frames into cue and speech output
//! - capture-triggered object detection
//! - a frame loop decoupling the frame source over a channel

pub mod capability;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod frame_loop;
pub mod proximity;

pub use capability::DepthCapability;
pub use config::NearsightConfig;
pub use coordinator::{CaptureHandle, Collaborators, Coordinator, CoordinatorStatus};
pub use error::CnsError;
pub use frame_loop::FrameMessage;
pub use proximity::{IntervalTier, ProximityConfig, ProximityStateMachine, ProximityUpdate};
