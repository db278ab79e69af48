//! Game entities and session state
//!
//! Everything one play-through owns lives here; `tick` advances it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::context::{SessionContext, Tick, Update};
use super::mask::{Mask, Rect};
use super::particles::ParticleSystem;
use crate::consts::*;
use crate::{rotate_deg, with_length};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Ball in play
    Playing,
    /// Ball left the boundary
    GameOver,
}

/// Audio/visual cue the core asks the outside world to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Ball bounced off the paddle
    Bump,
    /// Ball left the arena
    Loss,
    /// Power-up collected
    Pickup,
}

/// The rotating paddle
#[derive(Debug, Clone)]
pub struct Paddle {
    /// Sprite center (board coordinates)
    pub center: Vec2,
    /// Vector from the board center to the paddle; its length never changes
    pub radial_offset: Vec2,
    /// Accumulated rotation (degrees)
    pub angle: f32,
    /// Degrees per tick while moving
    pub rotation_speed: f32,
    pub is_moving: bool,
    /// Unrotated art size
    pub hitbox_size: (u32, u32),
    thickness: f32,
    /// Unrotated art
    art: Mask,
    /// Art rotated to `mask_angle`
    mask: Mask,
    mask_angle: f32,
    rect: Rect,
}

impl Paddle {
    pub fn new(ctx: &SessionContext) -> Self {
        let config = &ctx.config;
        let center = config.paddle_start();
        let radial_offset = center - config.center();
        let hitbox_size = (config.paddle_width, config.paddle_height);
        let art = Mask::arc_band(
            hitbox_size.0,
            hitbox_size.1,
            radial_offset.length(),
            config.paddle_thickness,
        );
        Self {
            center,
            radial_offset,
            angle: 0.0,
            rotation_speed: PADDLE_START_ROT,
            is_moving: false,
            hitbox_size,
            thickness: config.paddle_thickness,
            mask: art.clone(),
            art,
            mask_angle: 0.0,
            rect: Rect::from_center(center, hitbox_size.0, hitbox_size.1),
        }
    }

    /// Orbit radius (the session's boundary radius)
    pub fn orbit_radius(&self) -> f32 {
        self.radial_offset.length()
    }

    /// Bounding box of the rotated art
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Opacity bitmap of the rotated art
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Speed up rotation, capped at MAXPADDLEROT
    pub fn ramp_up(&mut self, max_rot: f32) {
        self.rotation_speed = (self.rotation_speed + RAMP_PADDLE_ROT).min(max_rot);
    }

    /// Redraw the art at a new size, keeping the current center and rotation
    pub fn rescale(&mut self, width: u32, height: u32) {
        self.hitbox_size = (width.max(1), height.max(1));
        self.art = Mask::arc_band(
            self.hitbox_size.0,
            self.hitbox_size.1,
            self.orbit_radius(),
            self.thickness,
        );
        self.refresh_mask();
    }

    /// Widen the paddle (expand power-up)
    pub fn expand(&mut self) {
        let (w, h) = self.hitbox_size;
        self.rescale(w + PADDLE_EXPAND_STEP, h);
    }

    fn refresh_mask(&mut self) {
        self.mask = self.art.rotated(self.angle);
        self.mask_angle = self.angle;
        let (w, h) = self.mask.size();
        self.rect = Rect::from_center(self.center, w, h);
    }
}

impl Update for Paddle {
    fn update(&mut self, tick: &mut Tick<'_>) {
        if self.is_moving {
            // Clockwise in math terms; on screen both the orbit and the art
            // turn counter-clockwise together
            self.radial_offset = rotate_deg(self.radial_offset, -self.rotation_speed);
            self.angle += self.rotation_speed;
        }
        self.center = tick.ctx.center() + self.radial_offset;

        if self.angle != self.mask_angle {
            self.refresh_mask();
        } else {
            let (w, h) = self.mask.size();
            self.rect = Rect::from_center(self.center, w, h);
        }
    }
}

/// The ball
#[derive(Debug, Clone)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Speed recorded when the current slow-down started
    pub base_speed_before_slow: f32,
    pub is_slowed: bool,
    /// When the current slow-down was applied (restored 5000 ms later)
    pub slowed_at_ms: u64,
    /// Sprite diameter
    pub size: u32,
    mask: Mask,
    /// Last velocity known to be finite
    last_good_velocity: Vec2,
    pub particles: ParticleSystem,
}

impl Ball {
    pub fn new(ctx: &SessionContext) -> Self {
        let position = ctx.center() + Vec2::new(0.0, BALL_START_OFFSET_Y);
        let velocity = Vec2::new(0.0, BALL_START_SPEED);
        let size = ctx.config.ball_size;
        Self {
            position,
            velocity,
            base_speed_before_slow: velocity.length(),
            is_slowed: false,
            slowed_at_ms: ctx.now_ms(),
            size,
            mask: Mask::circle(size),
            last_good_velocity: velocity,
            particles: ParticleSystem::new(PARTICLE_EMIT_INTERVAL_MS),
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.size, self.size)
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Drop to the slow speed for a while, remembering the current speed
    pub fn slow_down(&mut self, now_ms: u64) {
        self.base_speed_before_slow = self.speed();
        self.velocity = with_length(self.velocity, SLOW_SPEED);
        self.slowed_at_ms = now_ms;
        self.is_slowed = true;
    }

    /// Speed up by 25%, capped at MAXBALLSPEED
    pub fn ramp_up(&mut self, max_speed: f32) {
        self.velocity += self.velocity * RAMP_BALL_FACTOR;
        if self.velocity.length_squared() > max_speed * max_speed {
            self.velocity = with_length(self.velocity, max_speed);
        }
    }

    /// Move by `velocity * dt`
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    fn guard_velocity(&mut self) {
        if self.velocity.is_finite() {
            self.last_good_velocity = self.velocity;
        } else {
            log::warn!(
                "Non-finite ball velocity {:?}, restoring {:?}",
                self.velocity,
                self.last_good_velocity
            );
            self.velocity = self.last_good_velocity;
        }
    }
}

impl Update for Ball {
    fn update(&mut self, tick: &mut Tick<'_>) {
        if self.is_slowed && tick.now_ms.saturating_sub(self.slowed_at_ms) >= SLOW_DURATION_MS {
            self.velocity = with_length(self.velocity, self.base_speed_before_slow);
            self.is_slowed = false;
            log::debug!("Slow-down expired, speed back to {:.1}", self.speed());
        }
        self.guard_velocity();
        self.integrate(tick.dt);

        self.particles.follow(self.position, self.velocity);
        self.particles.update(tick);
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Widens the paddle; declared for future spawn tables, never spawned
    Expand,
    /// Temporarily slows the ball
    SlowDown,
}

/// A timed pickup
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub position: Vec2,
    pub spawned_at_ms: u64,
    pub lifetime_ms: u64,
    pub size: u32,
    pub alive: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, position: Vec2, size: u32, now_ms: u64) -> Self {
        Self {
            kind,
            position,
            spawned_at_ms: now_ms,
            lifetime_ms: POWERUP_LIFETIME_MS,
            size,
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.size, self.size)
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.spawned_at_ms) >= self.lifetime_ms
    }
}

impl Update for PowerUp {
    fn update(&mut self, tick: &mut Tick<'_>) {
        if self.expired(tick.now_ms) {
            self.alive = false;
        }
    }
}

/// Timestamps driving the periodic events of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub last_ramp_ms: u64,
    /// Time of the last scoring hit (session start before the first)
    pub last_hit_ms: u64,
    /// When the current power-up wait started
    pub powerup_timer_ms: u64,
    /// Length of the current power-up wait
    pub powerup_interval_ms: u64,
}

/// One play-through
#[derive(Debug, Clone)]
pub struct GameSession {
    pub seed: u64,
    pub phase: SessionPhase,
    pub score: u32,
    /// Circular boundary (the paddle's orbit radius)
    pub boundary_radius: f32,
    /// Set after a scoring hit; blocks another score for 500 ms
    pub hit_cooldown_active: bool,
    pub schedule: Schedule,
    pub paddle: Paddle,
    pub ball: Ball,
    /// At most one power-up at a time
    pub powerup: Option<PowerUp>,
    /// Frames stepped so far
    pub frames: u64,
    pub(crate) rng: Pcg32,
}

impl GameSession {
    pub fn new(ctx: &SessionContext, seed: u64) -> Self {
        let now = ctx.now_ms();
        let paddle = Paddle::new(ctx);
        let ball = Ball::new(ctx);
        let mut rng = Pcg32::seed_from_u64(seed);
        let powerup_interval_ms = super::tick::roll_powerup_interval(&mut rng);
        log::info!(
            "New session (seed {}), boundary radius {:.1}",
            seed,
            paddle.orbit_radius()
        );
        Self {
            seed,
            phase: SessionPhase::Playing,
            score: 0,
            boundary_radius: paddle.orbit_radius(),
            hit_cooldown_active: false,
            schedule: Schedule {
                last_ramp_ms: now,
                last_hit_ms: now,
                powerup_timer_ms: now,
                powerup_interval_ms,
            },
            paddle,
            ball,
            powerup: None,
            frames: 0,
            rng,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }
}
