//! Wheel Pong - a rotating paddle defends a circular arena
//!
//! Core modules:
//! - `sim`: Simulation core (entities, collisions, per-frame session step)
//! - `flow`: Screen state machine (menu, play, game over)
//! - `platform`: Clock and input abstractions
//! - `render`: Renderer/effect sink seams (the core never draws)
//! - `runner`: Fixed-rate frame loop
//! - `config`: Board geometry and presentation settings

pub mod config;
pub mod flow;
pub mod platform;
pub mod render;
pub mod runner;
pub mod sim;

pub use config::{Config, ConfigError};
pub use flow::{FlowFrame, Screen, ScreenFlow, ScreenKind};
pub use platform::{Clock, InputEvent, ManualClock, SystemClock};

use glam::Vec2;

/// Game constants (difficulty curve and timers are fixed, not configurable)
pub mod consts {
    /// Largest dt a single frame may advance the simulation by (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Difficulty ramp period (ms)
    pub const RAMP_INTERVAL_MS: u64 = 15_000;
    /// Ball speed gained on each ramp (fraction of current speed)
    pub const RAMP_BALL_FACTOR: f32 = 0.25;
    /// Paddle rotation gained on each ramp (degrees/tick)
    pub const RAMP_PADDLE_ROT: f32 = 0.3;
    /// Particle emission interval lost on each ramp (ms)
    pub const RAMP_EMISSION_STEP_MS: u64 = 5;
    /// Particle emission interval floor (ms)
    pub const MIN_EMISSION_INTERVAL_MS: u64 = 40;

    /// Window after a scoring hit during which the paddle cannot score again
    pub const HIT_COOLDOWN_MS: u64 = 500;

    /// Power-up spawn interval bounds (ms, inclusive)
    pub const POWERUP_INTERVAL_MIN_MS: u64 = 10_000;
    pub const POWERUP_INTERVAL_MAX_MS: u64 = 16_000;
    /// Time a spawned power-up stays on the board
    pub const POWERUP_LIFETIME_MS: u64 = 4_000;

    /// Ball speed while slowed
    pub const SLOW_SPEED: f32 = 240.0;
    /// How long a slow-down lasts before the old speed comes back
    pub const SLOW_DURATION_MS: u64 = 5_000;

    /// Ball defaults
    pub const BALL_START_OFFSET_Y: f32 = -200.0;
    pub const BALL_START_SPEED: f32 = 240.0;

    /// Paddle defaults (degrees per tick)
    pub const PADDLE_START_ROT: f32 = 2.0;
    /// Width added by the expand power-up
    pub const PADDLE_EXPAND_STEP: u32 = 20;

    /// Trail particles
    pub const PARTICLE_START_ALPHA: i32 = 255;
    pub const PARTICLE_ALPHA_STEP: i32 = 10;
    pub const PARTICLE_EMIT_INTERVAL_MS: u64 = 70;
    pub const PARTICLE_JITTER_DEG: i32 = 15;
    pub const PARTICLE_VEL_FACTOR: f32 = -0.35;
}

/// Rotate a vector by `degrees` (standard rotation matrix; on a y-down
/// screen positive angles turn clockwise)
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Rescale a vector to `len`; a zero vector has no direction and is returned as is
#[inline]
pub fn with_length(v: Vec2, len: f32) -> Vec2 {
    let n = v.normalize_or_zero();
    if n == Vec2::ZERO { v } else { n * len }
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
