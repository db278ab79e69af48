//! Ball trail particles
//!
//! Purely cosmetic: particles never feed back into gameplay.

use glam::Vec2;
use rand::Rng;

use super::arena::SlotArena;
use super::context::{Tick, Update};
use crate::consts::*;
use crate::rotate_deg;

/// A single fading trail particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 255 = opaque; dead once it reaches 0
    pub alpha: i32,
    pub alive: bool,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            alpha: PARTICLE_START_ALPHA,
            alive: true,
        }
    }

    /// Alpha as the 0..=255 value a renderer expects
    pub fn alpha_u8(&self) -> u8 {
        self.alpha.clamp(0, 255) as u8
    }
}

impl Update for Particle {
    fn update(&mut self, tick: &mut Tick<'_>) {
        self.alpha -= PARTICLE_ALPHA_STEP;
        if self.alpha <= 0 {
            self.alive = false;
        }
        self.pos += self.vel * tick.dt;
    }
}

/// Emits one trailing particle per interval behind its parent
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: SlotArena<Particle>,
    /// Emission interval (ms)
    pub interval_ms: u64,
    /// Time of the last emission; `None` emits on the first update
    last_emit_ms: Option<u64>,
    /// Parent position/velocity, refreshed by the owner before each update
    parent_pos: Vec2,
    parent_vel: Vec2,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(PARTICLE_EMIT_INTERVAL_MS)
    }
}

impl ParticleSystem {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            particles: SlotArena::new(),
            interval_ms,
            last_emit_ms: None,
            parent_pos: Vec2::ZERO,
            parent_vel: Vec2::ZERO,
        }
    }

    /// Record where the parent is and how it is moving
    pub fn follow(&mut self, pos: Vec2, vel: Vec2) {
        self.parent_pos = pos;
        self.parent_vel = vel;
    }

    /// Shorten the emission interval, never below the floor
    pub fn speed_up(&mut self, step_ms: u64) {
        self.interval_ms = self
            .interval_ms
            .saturating_sub(step_ms)
            .max(MIN_EMISSION_INTERVAL_MS);
    }

    fn due(&self, now_ms: u64) -> bool {
        match self.last_emit_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Trailing velocity: parent velocity turned by up to ±15° and reversed at 35%
    pub fn trail_velocity(parent_vel: Vec2, jitter_deg: i32) -> Vec2 {
        rotate_deg(parent_vel, jitter_deg as f32) * PARTICLE_VEL_FACTOR
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl Update for ParticleSystem {
    fn update(&mut self, tick: &mut Tick<'_>) {
        if self.due(tick.now_ms) {
            self.last_emit_ms = Some(tick.now_ms);
            let jitter = tick
                .rng
                .random_range(-PARTICLE_JITTER_DEG..=PARTICLE_JITTER_DEG);
            let vel = Self::trail_velocity(self.parent_vel, jitter);
            self.particles.insert(Particle::new(self.parent_pos, vel));
        }

        for particle in self.particles.iter_mut() {
            particle.update(tick);
        }
        self.particles.prune(|p| p.alive);
    }
}
