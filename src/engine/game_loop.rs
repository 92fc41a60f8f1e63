/// Game loop timing and control system
///
/// Implements a fixed timestep loop: the simulation always advances in
/// equal steps while frames come in at whatever rate the host manages.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default update rate (updates per second)
pub const DEFAULT_UPDATE_RATE: u32 = 144;

/// Maximum number of physics steps per frame to prevent spiral of death
const MAX_PHYSICS_STEPS: u32 = 5;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Game loop timing state
pub struct GameLoop {
    /// Length of one fixed update
    fixed_timestep: Duration,

    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    /// Time when game loop started
    start_time: Instant,

    /// Frame timing history for FPS calculation
    frame_times: VecDeque<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,

    /// Frames where the step cap dropped time
    dropped_frames: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,
}

impl GameLoop {
    /// Create a new game loop running `update_rate` fixed updates per second
    pub fn new(update_rate: u32) -> Self {
        let rate = update_rate.max(1);
        let now = Instant::now();
        Self {
            fixed_timestep: Duration::from_secs_f64(1.0 / rate as f64),
            accumulator: Duration::ZERO,
            last_frame_time: now,
            start_time: now,
            frame_times: VecDeque::with_capacity(FPS_WINDOW_SIZE + 1),
            frame_count: 0,
            update_count: 0,
            dropped_frames: 0,
            current_fps: 0.0,
        }
    }

    /// Begin a new frame, returns the number of fixed updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Feed one frame of `frame_time` into the accumulator
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.pop_front();
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= self.fixed_timestep && updates < MAX_PHYSICS_STEPS {
            self.accumulator -= self.fixed_timestep;
            updates += 1;
        }

        // Drop the backlog instead of trying to catch up forever
        if self.accumulator >= self.fixed_timestep {
            self.accumulator = Duration::ZERO;
            self.dropped_frames += 1;
            log::debug!("Frame took {:?}, dropping simulation backlog", frame_time);
        }

        self.update_count += updates as u64;
        updates
    }

    /// Get the fixed timestep for physics updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// How long the host can idle before the next update is due
    pub fn time_until_next_update(&self) -> Duration {
        let since_frame = Instant::now().duration_since(self.last_frame_time);
        self.fixed_timestep
            .saturating_sub(self.accumulator)
            .saturating_sub(since_frame)
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total elapsed time since start
    pub fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.start_time)
    }

    /// Get total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
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
        Self::new(DEFAULT_UPDATE_RATE)
    }
}
