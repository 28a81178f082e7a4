pub mod display;
pub mod reconciler;

pub use display::{format_time, progress_percent};
pub use reconciler::{MediaElement, PlaybackBlocked, Reconciler, ReconcilerConfig, TrackPhase};
