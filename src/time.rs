//! Scene clock driven by the host's frame signal.
//!
//! The host hands every frame a timestamp (seconds on any monotonic scale);
//! [`SceneClock`] turns those into scaled elapsed and delta times. Tests and
//! offline rendering can skip timestamps entirely and step the clock with
//! [`SceneClock::advance`].
//!
//! # Example
//!
//! ```ignore
//! use wavesphere::time::SceneClock;
//!
//! let mut clock = SceneClock::new();
//!
//! // In the host's frame callback:
//! let (elapsed, delta) = clock.tick(now_secs);
//!
//! println!("Elapsed: {:.2}s", clock.elapsed());
//! println!("Frame: {}", clock.frame());
//! println!("FPS: {:.1}", clock.fps());
//! ```

use std::time::Instant;

/// Elapsed/delta time source for the animation loop.
///
/// Elapsed time accumulates scaled deltas, so changing the time scale never
/// makes the scene jump.
#[derive(Debug, Clone)]
pub struct SceneClock {
    /// Origin for [`update`](Self::update).
    origin: Instant,
    /// Host timestamp of the previous tick.
    last_tick: Option<f64>,
    /// Kept in f64 so long sessions do not lose small deltas.
    elapsed_secs: f64,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_window_start: Option<f64>,
    fps_update_interval: f64,
    paused: bool,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Longest raw delta accepted, so a stalled host does not teleport waves.
    max_delta: f32,
    time_scale: f32,
}

impl SceneClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_tick: None,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_window_start: None,
            fps_update_interval: 0.5,
            paused: false,
            fixed_delta: None,
            max_delta: 0.1,
            time_scale: 1.0,
        }
    }

    /// Advance to host timestamp `now` (seconds). Call once per frame.
    ///
    /// Returns `(elapsed, delta)`. The first tick has a zero delta.
    pub fn tick(&mut self, now: f64) -> (f32, f32) {
        let raw_delta = match self.last_tick {
            Some(last) => ((now - last).max(0.0) as f32).min(self.max_delta),
            None => 0.0,
        };
        self.last_tick = Some(now);

        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed(), self.delta_secs);
        }

        self.step(self.fixed_delta.unwrap_or(raw_delta));
        self.update_fps(now);
        (self.elapsed(), self.delta_secs)
    }

    /// Tick using wall-clock time since the clock was created.
    pub fn update(&mut self) -> (f32, f32) {
        let now = self.origin.elapsed().as_secs_f64();
        self.tick(now)
    }

    /// Step by exactly `delta` seconds (before scaling), ignoring timestamps.
    pub fn advance(&mut self, delta: f32) -> (f32, f32) {
        if self.paused {
            self.delta_secs = 0.0;
        } else {
            self.step(delta.max(0.0));
        }
        (self.elapsed(), self.delta_secs)
    }

    fn step(&mut self, raw_delta: f32) {
        self.delta_secs = raw_delta * self.time_scale;
        self.elapsed_secs += f64::from(self.delta_secs);
        self.frame_count += 1;
    }

    fn update_fps(&mut self, now: f64) {
        let Some(window_start) = self.fps_window_start else {
            self.fps_window_start = Some(now);
            self.fps_frame_count = self.frame_count;
            return;
        };
        let window = now - window_start;
        if window >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = (frames as f64 / window) as f32;
            self.fps_frame_count = self.frame_count;
            self.fps_window_start = Some(now);
        }
    }

    /// Total scaled time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs as f32
    }

    /// Total scaled time at full precision.
    #[inline]
    pub fn elapsed_f64(&self) -> f64 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames ticked so far (paused ticks excluded).
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// While paused, `delta()` returns 0 and `elapsed()` stops increasing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Use a fixed delta instead of the timestamp difference. `None` restores
    /// real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Cap on the raw delta accepted from timestamps.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta.max(0.0);
    }

    /// - `1.0` = normal speed
    /// - `0.5` = half speed
    /// - `0.0` = frozen
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Forget the previous timestamp so the next tick has a zero delta.
    ///
    /// Used when the loop restarts after a stop.
    pub fn resync(&mut self) {
        self.last_tick = None;
        self.fps_window_start = None;
    }

    /// Back to zero, keeping scale, fixed delta and pause settings.
    pub fn reset(&mut self) {
        self.origin = Instant::now();
        self.last_tick = None;
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_window_start = None;
    }
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new()
    }
}
