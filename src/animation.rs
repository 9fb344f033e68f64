//! Frame-driven animation loop.
//!
//! The host owns the display-frame signal. [`AnimationLoop`] is a small state
//! machine on top of it: each time the host fires, it calls
//! [`on_frame`](AnimationLoop::on_frame), which ticks the clock, advances the
//! scene, presents the result and asks the [`FrameScheduler`] for another
//! frame while still running. Nothing reschedules itself recursively.
//!
//! ```text
//!   Stopped --start()--> Running --stop()--> Stopped
//!      \                    |
//!       +----dispose()------+------> Disposed (terminal)
//! ```

use std::sync::Arc;

use winit::window::Window;

use crate::frame::{Frame, FrameSink, FrameTime, PresentOutcome};
use crate::time::SceneClock;

/// Lifecycle state of an [`AnimationLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
    Disposed,
}

/// Host-side frame scheduling.
pub trait FrameScheduler {
    /// Ask for `on_frame` to be called once more.
    fn request_frame(&mut self);

    /// Drop a pending request, if the host supports it.
    fn cancel_frame(&mut self);
}

/// Redraw requests on a winit window; the host calls `on_frame` from
/// `WindowEvent::RedrawRequested`.
impl FrameScheduler for Arc<Window> {
    fn request_frame(&mut self) {
        self.request_redraw();
    }

    fn cancel_frame(&mut self) {}
}

/// Scheduler driven by hand: the caller polls [`take_request`](Self::take_request).
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualScheduler {
    pending: bool,
    requests: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if a frame was requested since the last call.
    pub fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Total requests ever made.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    fn cancel_frame(&mut self) {
        self.pending = false;
    }
}

/// Something that advances once per frame and describes the result.
pub trait Animate {
    fn tick(&mut self, time: FrameTime) -> Frame<'_>;
}

/// Running/stopped state machine around a [`SceneClock`].
#[derive(Debug)]
pub struct AnimationLoop<S: FrameScheduler> {
    state: LoopState,
    clock: SceneClock,
    scheduler: S,
}

impl<S: FrameScheduler> AnimationLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            state: LoopState::Stopped,
            clock: SceneClock::new(),
            scheduler,
        }
    }

    pub fn with_clock(mut self, clock: SceneClock) -> Self {
        self.clock = clock;
        self
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.state == LoopState::Disposed
    }

    pub fn clock(&self) -> &SceneClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SceneClock {
        &mut self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Stopped → Running. No-op otherwise. Returns whether the state changed.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Stopped {
            return false;
        }
        self.state = LoopState::Running;
        self.clock.resync();
        self.scheduler.request_frame();
        tracing::debug!("animation loop started");
        true
    }

    /// Running → Stopped. No-op otherwise.
    pub fn stop(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.state = LoopState::Stopped;
        self.scheduler.cancel_frame();
        tracing::debug!(frame = self.clock.frame(), "animation loop stopped");
        true
    }

    /// Enter the terminal state. Only the first call does anything.
    pub fn dispose(&mut self) -> bool {
        if self.state == LoopState::Disposed {
            return false;
        }
        self.state = LoopState::Disposed;
        self.scheduler.cancel_frame();
        tracing::debug!(frame = self.clock.frame(), "animation loop disposed");
        true
    }

    /// Run one tick at host time `now` (seconds).
    ///
    /// Does nothing unless running. Sink errors are logged and the loop keeps
    /// going; a sink may stop or dispose the loop through its outcome.
    pub fn on_frame<A, K>(&mut self, now: f64, scene: &mut A, sink: &mut K) -> LoopState
    where
        A: Animate + ?Sized,
        K: FrameSink + ?Sized,
    {
        if self.state != LoopState::Running {
            return self.state;
        }

        let (elapsed, delta) = self.clock.tick(now);
        let time = FrameTime {
            now,
            elapsed,
            delta,
            frame: self.clock.frame(),
        };

        let frame = scene.tick(time);
        match sink.present(&frame) {
            Ok(PresentOutcome::Continue) => {}
            Ok(PresentOutcome::Stop) => {
                self.stop();
            }
            Ok(PresentOutcome::Dispose) => {
                self.dispose();
            }
            Err(err) => {
                tracing::warn!(frame = time.frame, "present failed: {err}");
            }
        }

        if self.state == LoopState::Running {
            self.scheduler.request_frame();
        }
        self.state
    }
}
