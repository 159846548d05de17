/// Game loop timing and control system
///
/// Implements a fixed timestep game loop with variable rendering.
/// Simulation updates run at a constant rate while rendering receives an
/// interpolation factor between the last two updates.
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Target simulation rate (60 updates per second). Shared by every system.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum number of updates per frame to prevent spiral of death
const MAX_PHYSICS_STEPS: u32 = 5;

/// Longest frame delta accepted before clamping (debugger pauses, window drags)
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Something the loop drives: fixed updates followed by one render
pub trait Simulation {
    /// Advance by exactly one fixed step
    fn update(&mut self, dt: f32);

    /// Draw the current state. `alpha` in [0, 1) blends the previous and
    /// current simulated positions.
    fn render(&mut self, alpha: f32);
}

/// Timing configuration for a `GameLoop`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    pub fixed_step: Duration,
    pub max_steps_per_frame: u32,
    pub max_frame_delta: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_step: FIXED_TIMESTEP_DURATION,
            max_steps_per_frame: MAX_PHYSICS_STEPS,
            max_frame_delta: MAX_FRAME_DELTA,
        }
    }
}

/// Cloneable stop switch for a running loop.
///
/// Stopping is idempotent and may be requested from inside `update` or
/// `render`; after it, the loop issues no further calls.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    stopped: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn stop(&self) {
        if !self.stopped.replace(true) {
            log::info!("Game loop stop requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

/// Game loop timing state
pub struct GameLoop {
    config: LoopConfig,

    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    /// Time when game loop started
    start_time: Instant,

    /// Whether the game is paused
    paused: bool,

    /// Frame timing history for FPS calculation
    frame_times: VecDeque<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,

    /// Updates discarded by the spiral-of-death guard
    dropped_steps: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,

    /// Delta time for rendering (time since last frame)
    render_delta_time: f32,

    handle: LoopHandle,
}

impl GameLoop {
    /// Create a new game loop with the default 60 Hz configuration
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    /// Create a game loop with custom timing.
    /// A zero `fixed_step` is replaced by the default 60 Hz step.
    pub fn with_config(mut config: LoopConfig) -> Self {
        if config.fixed_step.is_zero() {
            log::warn!("Zero fixed step requested, using {:?}", FIXED_TIMESTEP_DURATION);
            config.fixed_step = FIXED_TIMESTEP_DURATION;
        }
        let now = Instant::now();
        Self {
            config,
            accumulator: Duration::ZERO,
            last_frame_time: now,
            start_time: now,
            paused: false,
            frame_times: VecDeque::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            update_count: 0,
            dropped_steps: 0,
            current_fps: 0.0,
            render_delta_time: 0.0,
            handle: LoopHandle::default(),
        }
    }

    /// Handle that can stop this loop from anywhere
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Begin a new frame from the wall clock, returns the number of fixed updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Feed an explicit frame delta, returns the number of fixed updates to run.
    /// Deterministic: the same sequence of deltas yields the same step counts.
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        // Store frame time for FPS calculation
        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.pop_front();
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        // Store delta time for rendering
        self.render_delta_time = frame_time.as_secs_f32();

        // If paused, don't accumulate time for updates
        if self.paused {
            return 0;
        }

        self.accumulator += frame_time.min(self.config.max_frame_delta);

        // Calculate number of fixed updates to run
        let step = self.config.fixed_step;
        let mut updates = 0;
        while self.accumulator >= step && updates < self.config.max_steps_per_frame {
            self.accumulator -= step;
            updates += 1;
        }

        // Anything still owed after the cap is discarded
        if self.accumulator >= step {
            let backlog = (self.accumulator.as_nanos() / step.as_nanos()) as u32;
            self.accumulator -= step * backlog;
            self.dropped_steps += backlog as u64;
            log::warn!(
                "Simulation fell behind, dropping {} fixed step(s)",
                backlog
            );
        }

        self.update_count += updates as u64;
        updates
    }

    /// Run one frame against the wall clock
    pub fn run_frame<S: Simulation>(&mut self, sim: &mut S) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.run_frame_with(frame_time, sim);
    }

    /// Run one frame with an explicit delta: fixed updates, then one render.
    /// Nothing is called once the loop handle has been stopped.
    pub fn run_frame_with<S: Simulation>(&mut self, frame_time: Duration, sim: &mut S) {
        if self.handle.is_stopped() {
            return;
        }

        let updates = self.advance(frame_time);
        let dt = self.fixed_timestep();
        for _ in 0..updates {
            if self.handle.is_stopped() {
                return;
            }
            sim.update(dt);
        }

        if self.handle.is_stopped() {
            return;
        }
        sim.render(self.alpha());
    }

    /// Get the fixed timestep for simulation updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        self.config.fixed_step.as_secs_f32()
    }

    /// Get the delta time since last render (in seconds)
    pub fn render_delta_time(&self) -> f32 {
        self.render_delta_time
    }

    /// Get the interpolation alpha for smooth rendering between updates
    /// Alpha = accumulated_time / fixed_timestep
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.config.fixed_step.as_secs_f32()
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total elapsed time since start
    pub fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.start_time)
    }

    /// Get total number of frames processed
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Get total number of updates dropped by the step cap
    pub fn dropped_steps(&self) -> u64 {
        self.dropped_steps
    }

    /// Check if game is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the game
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Game paused");
        }
    }

    /// Resume the game
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            log::info!("Game resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Update FPS calculation
    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        // Calculate average frame time
        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        // Convert to FPS
        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
