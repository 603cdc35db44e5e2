//! Seam between the alerting pipelines and spoken output

/// Sink for spoken announcements.
///
/// The proximity engine and the detection pipeline share one implementation
/// so their utterances are serialized through a single synthesis resource.
/// Implementations must not block the caller on synthesis.
pub trait Announcer: Send + Sync {
    fn announce(&self, text: &str);
}
