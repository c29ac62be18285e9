use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::simulation::states::NVec2;

/// Copy of the positions at the end of a completed step.
/// Owned by the receiver; the core keeps mutating its own buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub positions: Vec<NVec2>,
    pub time: Option<f64>,
    pub step: usize, // index of the step that produced this frame
}

impl FrameSnapshot {
    /// Arithmetic mean of the positions; NaN for a hand-built empty snapshot
    pub fn centroid(&self) -> NVec2 {
        let n = self.positions.len() as f64;
        self.positions.iter().fold(NVec2::zeros(), |acc, p| acc + p) / n
    }

    /// Axis-aligned bounds of the positions as `(min, max)`;
    /// `(+inf, -inf)` for an empty snapshot
    pub fn extent(&self) -> (NVec2, NVec2) {
        let inf = NVec2::new(f64::INFINITY, f64::INFINITY);
        self.positions
            .iter()
            .fold((inf, -inf), |(lo, hi), p| (lo.inf(p), hi.sup(p)))
    }
}

/// Consumer of frame snapshots.
///
/// Called on the simulation thread, so implementations must return quickly.
/// An `Err` is logged by the driver and the run continues.
pub trait FrameSink {
    fn capture(&mut self, frame: FrameSnapshot) -> Result<()>;
}

/// Keeps every frame in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<FrameSnapshot>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for RecordingSink {
    fn capture(&mut self, frame: FrameSnapshot) -> Result<()> {
        self.frames.push(frame);
        Ok(())
    }
}

/// Logs centroid and extent of every frame at `info` level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl FrameSink for LogSink {
    fn capture(&mut self, frame: FrameSnapshot) -> Result<()> {
        log_frame(&frame);
        Ok(())
    }
}

fn log_frame(frame: &FrameSnapshot) {
    let c = frame.centroid();
    let (lo, hi) = frame.extent();
    info!(
        "frame step={} t={:.6} centroid=({:.4}, {:.4}) extent=[{:.4}, {:.4}]x[{:.4}, {:.4}]",
        frame.step,
        frame.time.unwrap_or(f64::NAN),
        c.x,
        c.y,
        lo.x,
        hi.x,
        lo.y,
        hi.y
    );
}

/// Hands frames to another thread over a bounded channel without ever blocking:
/// a full or closed channel drops the frame and reports `Error::Sink`
#[derive(Debug)]
pub struct ChannelSink {
    tx: SyncSender<FrameSnapshot>,
    dropped: usize,
}

impl ChannelSink {
    /// Sink plus the receiving end, buffering at most `capacity` frames
    pub fn bounded(capacity: usize) -> (Self, Receiver<FrameSnapshot>) {
        let (tx, rx) = mpsc::sync_channel(capacity);
        (Self { tx, dropped: 0 }, rx)
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl FrameSink for ChannelSink {
    fn capture(&mut self, frame: FrameSnapshot) -> Result<()> {
        let step = frame.step;
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                debug!("frame channel full, dropped frame of step {step}");
                Err(Error::Sink(format!("channel full at step {step}")))
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                Err(Error::Sink("receiver disconnected".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(step: usize) -> FrameSnapshot {
        FrameSnapshot {
            positions: vec![NVec2::new(-1.0, 2.0), NVec2::new(3.0, 0.0)],
            time: Some(step as f64 * 0.1),
            step,
        }
    }

    #[test]
    fn centroid_and_extent() {
        let f = frame(0);
        assert_eq!(f.centroid(), NVec2::new(1.0, 1.0));
        let (lo, hi) = f.extent();
        assert_eq!(lo, NVec2::new(-1.0, 0.0));
        assert_eq!(hi, NVec2::new(3.0, 2.0));
    }

    #[test]
    fn empty_snapshot_has_no_centroid() {
        let f = FrameSnapshot {
            positions: vec![],
            time: None,
            step: 0,
        };
        assert!(f.centroid().x.is_nan());
        let (lo, hi) = f.extent();
        assert!(lo.x > hi.x);
    }

    #[test]
    fn log_sink_accepts_every_frame() {
        let mut sink = LogSink;
        assert!((0..3).all(|step| sink.capture(frame(step)).is_ok()));
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (mut sink, rx) = ChannelSink::bounded(1);
        assert!(sink.capture(frame(0)).is_ok());
        assert!(matches!(sink.capture(frame(1)), Err(Error::Sink(_))));
        assert_eq!(sink.dropped(), 1);
        assert_eq!(rx.try_recv().map(|f| f.step).ok(), Some(0));
    }

    #[test]
    fn closed_channel_reports_error() {
        let (mut sink, rx) = ChannelSink::bounded(4);
        drop(rx);
        assert!(sink.capture(frame(0)).is_err());
    }
}
