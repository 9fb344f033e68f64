//! The hand-off between a scene and whatever presents it.
//!
//! Every tick a scene produces a [`Frame`]: timing, camera, model transform,
//! the displaced point cloud and any orbiting bodies. A [`FrameSink`] consumes
//! it: a GPU uploader, a test recorder, or nothing at all.

use glam::{Mat4, Quat, Vec3};

use crate::error::PresentError;
use crate::sampler::DisplacedPoint;

/// Clock reading handed to a scene at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Host timestamp in seconds.
    pub now: f64,
    /// Scaled seconds since the clock started.
    pub elapsed: f32,
    pub delta: f32,
    pub frame: u64,
}

/// Per-tick scene state. Produced once, read by the sink, then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    pub time: FrameTime,
    pub camera_position: Vec3,
    pub camera_distance: f32,
}

/// One orbiting body as the renderer needs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInstance {
    pub position: Vec3,
    pub orientation: Quat,
    /// Final render radius.
    pub scale: f32,
    pub color: Vec3,
}

/// Everything a sink needs to draw one frame.
///
/// `points` and `bodies` borrow the scene's storage and are only valid for
/// the duration of [`FrameSink::present`].
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub state: FrameState,
    pub view: Mat4,
    pub projection: Mat4,
    /// Transform applied to `points` (rotation, scale).
    pub model: Mat4,
    pub points: &'a [DisplacedPoint],
    pub bodies: &'a [BodyInstance],
}

impl Frame<'_> {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// What the loop should do after a frame was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentOutcome {
    #[default]
    Continue,
    /// Stop scheduling frames; `start()` resumes.
    Stop,
    /// Tear the scene down.
    Dispose,
}

/// Consumer of finished frames.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame<'_>) -> Result<PresentOutcome, PresentError>;
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame<'_>) -> Result<PresentOutcome, PresentError>,
{
    fn present(&mut self, frame: &Frame<'_>) -> Result<PresentOutcome, PresentError> {
        self(frame)
    }
}

/// Discards every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &Frame<'_>) -> Result<PresentOutcome, PresentError> {
        Ok(PresentOutcome::Continue)
    }
}

/// Summary of one presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub state: FrameState,
    pub point_count: usize,
    pub body_count: usize,
    /// Mean distance of the displaced points from the model origin.
    pub mean_radius: f32,
}

/// Keeps a [`FrameRecord`] per frame, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub frames: Vec<FrameRecord>,
    /// Outcome returned once this many frames were recorded.
    finish_after: Option<(usize, PresentOutcome)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `outcome` from the `count`-th frame on.
    pub fn finish_after(mut self, count: usize, outcome: PresentOutcome) -> Self {
        self.finish_after = Some((count, outcome));
        self
    }

    pub fn last(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }
}

impl FrameSink for RecordingSink {
    fn present(&mut self, frame: &Frame<'_>) -> Result<PresentOutcome, PresentError> {
        let mean_radius = if frame.points.is_empty() {
            0.0
        } else {
            frame.points.iter().map(|p| p.radial_distance).sum::<f32>() / frame.points.len() as f32
        };
        self.frames.push(FrameRecord {
            state: frame.state,
            point_count: frame.points.len(),
            body_count: frame.bodies.len(),
            mean_radius,
        });
        Ok(match self.finish_after {
            Some((count, outcome)) if self.frames.len() >= count => outcome,
            _ => PresentOutcome::Continue,
        })
    }
}
