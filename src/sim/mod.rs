//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, inputs and clock
//! readings a session plays out identically:
//! - Timers compare against the frame's `now_ms` only
//! - Seeded RNG only
//! - Stable iteration order (arena slot order)
//! - No rendering or platform dependencies beyond the `Clock` trait

pub mod arena;
pub mod collision;
pub mod context;
pub mod mask;
pub mod particles;
pub mod state;
pub mod tick;

pub use arena::SlotArena;
pub use collision::{
    check_boundary, check_paddle_ball_collision, check_powerup_pickup, paddle_ball_contact,
    sprites_overlap,
};
pub use context::{SessionContext, Tick, Update, sanitize_dt};
pub use mask::{Mask, Rect};
pub use particles::{Particle, ParticleSystem};
pub use state::{
    Ball, Effect, GameSession, Paddle, PowerUp, PowerUpKind, Schedule, SessionPhase,
};
pub use tick::FrameResult;
