//! The only outward-facing seam of the core: periodic position snapshots
//! handed to a [`FrameSink`]. Rendering and export live behind this trait.

pub mod sink;

pub use sink::{ChannelSink, FrameSink, FrameSnapshot, LogSink, RecordingSink};
