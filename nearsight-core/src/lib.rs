//! nearsight-core: shared data model for the nearsight obstacle-alert engine
//!
//! Holds the types that flow between the depth sampler, the proximity state
//! machine, the audio cue scheduler, the speech announcer and the object
//! detection pipeline, plus the error taxonomy every crate converts into.

pub mod announce;
pub mod error;
pub mod types;

pub use announce::Announcer;
pub use error::{Error, Result};
pub use types::{
    AlertState, CueSchedule, DepthBuffer, DepthFrame, DetectionResult, ProximityEvent,
    ProximityReading, RegionOfInterest,
};
