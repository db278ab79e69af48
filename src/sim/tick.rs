//! Per-frame session step
//!
//! Advances one play-through by a frame: input, periodic events, entity
//! updates, then collisions. Every timer is a comparison against the frame's
//! clock reading, so the outcome depends only on state, inputs and `now`.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{check_boundary, check_paddle_ball_collision, check_powerup_pickup};
use super::context::{SessionContext, Tick, Update};
use super::state::{Effect, GameSession, PowerUp, PowerUpKind, SessionPhase};
use crate::consts::*;
use crate::platform::InputEvent;
use crate::rotate_deg;

/// What one frame produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameResult {
    pub score: u32,
    pub effects: Vec<Effect>,
    /// Ball lost; the session is over
    pub terminal: bool,
}

/// Length of the next power-up wait (ms)
pub fn roll_powerup_interval(rng: &mut Pcg32) -> u64 {
    rng.random_range(POWERUP_INTERVAL_MIN_MS..=POWERUP_INTERVAL_MAX_MS)
}

impl GameSession {
    /// Advance the session by one frame
    pub fn step(&mut self, ctx: &SessionContext, dt: f32, events: &[InputEvent]) -> FrameResult {
        if self.phase == SessionPhase::GameOver {
            return FrameResult {
                score: self.score,
                effects: Vec::new(),
                terminal: true,
            };
        }

        // Entities borrow the RNG through `Tick` while the session is mutated
        let mut rng = self.rng.clone();
        let result = self.step_frame(&mut Tick::new(dt, ctx, &mut rng), events);
        self.rng = rng;
        result
    }

    fn step_frame(&mut self, tick: &mut Tick<'_>, events: &[InputEvent]) -> FrameResult {
        let now = tick.now_ms;
        let mut effects = Vec::new();
        self.frames += 1;

        self.apply_input(events);
        self.run_schedule(tick);

        self.paddle.update(tick);
        self.ball.update(tick);
        if let Some(powerup) = self.powerup.as_mut() {
            powerup.update(tick);
        }
        if self.powerup.as_ref().is_some_and(|p| !p.alive) {
            self.powerup = None;
            self.restart_powerup_timer(now, tick.rng);
            log::debug!("Power-up expired");
        }

        if check_paddle_ball_collision(&self.paddle, &mut self.ball, self.hit_cooldown_active) {
            self.hit_cooldown_active = true;
            self.schedule.last_hit_ms = now;
            self.score += 1;
            effects.push(Effect::Bump);
            log::debug!("Paddle hit, score {}", self.score);
        }

        if check_boundary(self.ball.position, tick.ctx.center(), self.boundary_radius) {
            effects.push(Effect::Loss);
            self.phase = SessionPhase::GameOver;
            log::info!(
                "Ball lost after {} frames, final score {}",
                self.frames,
                self.score
            );
            return FrameResult {
                score: self.score,
                effects,
                terminal: true,
            };
        }

        if let Some(kind) = self.try_pickup() {
            match kind {
                PowerUpKind::SlowDown => self.ball.slow_down(now),
                PowerUpKind::Expand => self.paddle.expand(),
            }
            self.restart_powerup_timer(now, tick.rng);
            effects.push(Effect::Pickup);
            log::debug!("Picked up {:?}", kind);
        }

        FrameResult {
            score: self.score,
            effects,
            terminal: false,
        }
    }

    fn apply_input(&mut self, events: &[InputEvent]) {
        for event in events {
            match event {
                InputEvent::PointerDown { .. } => self.paddle.is_moving = true,
                InputEvent::PointerUp => self.paddle.is_moving = false,
                InputEvent::Exit => {}
            }
        }
    }

    /// Difficulty ramp, hit cooldown and power-up spawning
    fn run_schedule(&mut self, tick: &mut Tick<'_>) {
        let now = tick.now_ms;
        let ctx = tick.ctx;
        let config = &ctx.config;

        if now.saturating_sub(self.schedule.last_ramp_ms) >= RAMP_INTERVAL_MS {
            self.schedule.last_ramp_ms = now;
            self.ball.ramp_up(config.max_ball_speed);
            self.paddle.ramp_up(config.max_paddle_rot);
            self.ball.particles.speed_up(RAMP_EMISSION_STEP_MS);
            log::debug!(
                "Difficulty up: ball {:.1}, paddle {:.1} deg/tick, trail every {} ms",
                self.ball.speed(),
                self.paddle.rotation_speed,
                self.ball.particles.interval_ms
            );
        }

        if self.hit_cooldown_active
            && now.saturating_sub(self.schedule.last_hit_ms) > HIT_COOLDOWN_MS
        {
            self.hit_cooldown_active = false;
        }

        if self.powerup.is_none()
            && now.saturating_sub(self.schedule.powerup_timer_ms)
                >= self.schedule.powerup_interval_ms
        {
            let position = self.powerup_spawn_point(tick);
            self.powerup = Some(PowerUp::new(
                PowerUpKind::SlowDown,
                position,
                config.powerup_size,
                now,
            ));
            log::debug!("Spawned power-up at ({:.0}, {:.0})", position.x, position.y);
        }
    }

    /// Random point along a random orbit direction, kept inside the boundary
    fn powerup_spawn_point(&self, tick: &mut Tick<'_>) -> Vec2 {
        let angle = tick.rng.random_range(0..=360) as f32;
        let divisor: f32 = tick.rng.random_range(1.2..10.0);
        let offset = rotate_deg(self.paddle.radial_offset, angle) / divisor;
        let half = tick.ctx.config.powerup_size as f32 / 2.0;
        let max_len = (self.boundary_radius - half).max(0.0);
        tick.ctx.center() + offset.clamp_length_max(max_len)
    }

    fn try_pickup(&mut self) -> Option<PowerUpKind> {
        let powerup = self.powerup.as_ref()?;
        if !check_powerup_pickup(&self.ball, powerup) {
            return None;
        }
        self.powerup.take().map(|p| p.kind)
    }

    fn restart_powerup_timer(&mut self, now: u64, rng: &mut Pcg32) {
        self.schedule.powerup_timer_ms = now;
        self.schedule.powerup_interval_ms = roll_powerup_interval(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::{Clock, ManualClock};
    use rand::SeedableRng;

    fn setup(seed: u64) -> (ManualClock, SessionContext, GameSession) {
        let clock = ManualClock::new(0);
        let ctx = SessionContext::new(Box::new(clock.clone()), Config::default());
        let session = GameSession::new(&ctx, seed);
        (clock, ctx, session)
    }

    fn press() -> InputEvent {
        InputEvent::PointerDown {
            normalized: Vec2::new(0.5, 0.5),
        }
    }

    /// Park the paddle a quarter turn round, out of the ball's straight path
    fn park_paddle_right(session: &mut GameSession) {
        session.paddle.radial_offset = Vec2::new(320.0, 0.0);
        session.paddle.angle = 90.0;
    }

    #[test]
    fn test_free_fall_until_loss() {
        let (clock, ctx, mut session) = setup(1);
        park_paddle_right(&mut session);

        for k in 1..=8 {
            clock.advance(250);
            let result = session.step(&ctx, 0.25, &[]);
            assert!(!result.terminal);
            assert_eq!(session.ball.position, Vec2::new(360.0, 440.0 + 60.0 * k as f32));
        }

        clock.advance(250);
        let result = session.step(&ctx, 0.25, &[]);
        assert!(result.terminal);
        assert_eq!(result.score, 0);
        assert_eq!(result.effects, vec![Effect::Loss]);
        assert_eq!(session.phase, SessionPhase::GameOver);

        // Further frames change nothing
        let pos = session.ball.position;
        let again = session.step(&ctx, 0.25, &[press()]);
        assert!(again.terminal);
        assert!(again.effects.is_empty());
        assert_eq!(session.ball.position, pos);
    }

    #[test]
    fn test_press_and_release_drive_paddle() {
        let (clock, ctx, mut session) = setup(1);
        session.step(&ctx, 0.0, &[press()]);
        assert!(session.paddle.is_moving);
        assert_eq!(session.paddle.angle, 2.0);

        clock.advance(16);
        session.step(&ctx, 0.0, &[InputEvent::PointerUp]);
        assert!(!session.paddle.is_moving);
        assert_eq!(session.paddle.angle, 2.0);

        // Release then press within one batch: last event wins
        session.step(&ctx, 0.0, &[InputEvent::PointerUp, press()]);
        assert!(session.paddle.is_moving);
    }

    #[test]
    fn test_hit_cooldown_blocks_double_scoring() {
        let (clock, ctx, mut session) = setup(1);
        let resting = Vec2::new(360.0, 930.0);
        session.ball.position = resting;

        let result = session.step(&ctx, 0.0, &[]);
        assert_eq!(result.score, 1);
        assert_eq!(result.effects, vec![Effect::Bump]);
        assert!(session.hit_cooldown_active);
        assert!(session.ball.velocity.y < 0.0);

        for t in [100, 250, 500] {
            clock.set(t);
            session.ball.position = resting;
            let result = session.step(&ctx, 0.0, &[]);
            assert_eq!(result.score, 1, "scored again at {t} ms");
            assert!(result.effects.is_empty());
        }

        clock.set(501);
        session.ball.position = resting;
        let result = session.step(&ctx, 0.0, &[]);
        assert_eq!(result.score, 2);
    }

    #[test]
    fn test_difficulty_ramp_every_15s() {
        let (clock, ctx, mut session) = setup(1);
        clock.set(14_999);
        session.step(&ctx, 0.0, &[]);
        assert!((session.ball.speed() - 240.0).abs() < 1e-3);

        clock.set(15_000);
        session.step(&ctx, 0.0, &[]);
        assert!((session.ball.speed() - 300.0).abs() < 1e-3);
        assert!((session.paddle.rotation_speed - 2.3).abs() < 1e-5);
        assert_eq!(session.ball.particles.interval_ms, 65);
        assert_eq!(session.schedule.last_ramp_ms, 15_000);

        // Clamped at MAXBALLSPEED
        session.ball.velocity = Vec2::new(0.0, 450.0);
        clock.set(30_000);
        session.step(&ctx, 0.0, &[]);
        assert!((session.ball.speed() - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_powerup_expires_and_restarts_timer() {
        let (clock, ctx, mut session) = setup(1);
        clock.set(1_000);
        session.schedule.powerup_timer_ms = 1_000;
        session.powerup = Some(PowerUp::new(
            PowerUpKind::SlowDown,
            Vec2::new(360.0, 840.0),
            55,
            1_000,
        ));

        clock.set(4_999);
        session.step(&ctx, 0.0, &[]);
        assert!(session.powerup.is_some());

        clock.set(5_000);
        session.step(&ctx, 0.0, &[]);
        assert!(session.powerup.is_none());
        assert_eq!(session.schedule.powerup_timer_ms, 5_000);
        assert!((10_000..=16_000).contains(&session.schedule.powerup_interval_ms));
    }

    #[test]
    fn test_pickup_slows_ball_then_restores() {
        let (clock, ctx, mut session) = setup(1);
        session.ball.velocity = Vec2::new(0.0, 400.0);
        session.powerup = Some(PowerUp::new(
            PowerUpKind::SlowDown,
            session.ball.position,
            55,
            0,
        ));

        clock.set(10);
        let result = session.step(&ctx, 0.0, &[]);
        assert_eq!(result.effects, vec![Effect::Pickup]);
        assert!(session.powerup.is_none());
        assert!(session.ball.is_slowed);
        assert!((session.ball.speed() - 240.0).abs() < 1e-3);

        clock.set(5_010);
        session.step(&ctx, 0.0, &[]);
        assert!(!session.ball.is_slowed);
        assert!((session.ball.speed() - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_powerups_never_overlap_in_time() {
        let (clock, ctx, mut session) = setup(42);
        park_paddle_right(&mut session);
        let mut spawns = 0;
        let mut current: Option<u64> = None;
        let mut removed_at: Option<u64> = None;

        for _ in 0..1_200 {
            clock.advance(100);
            session.step(&ctx, 0.0, &[]);
            match (&session.powerup, current) {
                (Some(p), None) => {
                    // New spawn: the previous one is gone and a full wait has passed
                    if let Some(removed) = removed_at {
                        assert!(p.spawned_at_ms - removed >= POWERUP_INTERVAL_MIN_MS);
                    }
                    let center_dist = (p.position - ctx.center()).length();
                    assert!(center_dist <= session.boundary_radius);
                    current = Some(p.spawned_at_ms);
                    spawns += 1;
                }
                (Some(p), Some(spawned)) => assert_eq!(p.spawned_at_ms, spawned),
                (None, Some(_)) => {
                    current = None;
                    removed_at = Some(clock.now_ms());
                }
                (None, None) => {}
            }
        }
        assert!(spawns >= 5, "only {spawns} spawns in 120 s");
    }

    #[test]
    fn test_spawn_point_clamped_inside_boundary() {
        let clock = ManualClock::new(0);
        let config = Config {
            powerup_size: 400,
            ..Config::default()
        };
        let ctx = SessionContext::new(Box::new(clock.clone()), config);
        let session = GameSession::new(&ctx, 5);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut tick = Tick::new(0.0, &ctx, &mut rng);

        // 320 radius less half the 400 px sprite
        let limit = session.boundary_radius - 200.0;
        let mut farthest = 0.0f32;
        for _ in 0..200 {
            let at = session.powerup_spawn_point(&mut tick);
            let dist = (at - ctx.center()).length();
            assert!(dist <= limit + 1e-3, "spawned {dist} from center");
            farthest = farthest.max(dist);
        }
        assert!(farthest > limit - 1e-2, "clamp never engaged");
    }

    #[test]
    fn test_expand_pickup_widens_paddle() {
        let (clock, ctx, mut session) = setup(1);
        session.powerup = Some(PowerUp::new(
            PowerUpKind::Expand,
            session.ball.position,
            55,
            0,
        ));

        clock.set(10);
        let result = session.step(&ctx, 0.0, &[]);
        assert_eq!(result.effects, vec![Effect::Pickup]);
        assert!(session.powerup.is_none());
        assert_eq!(session.paddle.hitbox_size, (220, 120));
        assert!(!session.ball.is_slowed);
        assert_eq!(session.schedule.powerup_timer_ms, 10);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let (_clock, ctx, mut session) = setup(1);
        let before = session.ball.position;
        let result = session.step(&ctx, -1.0, &[]);
        assert!(!result.terminal);
        assert_eq!(session.ball.position, before);
    }

    #[test]
    fn test_same_seed_same_session() {
        let (clock_a, ctx_a, mut a) = setup(7);
        let (clock_b, ctx_b, mut b) = setup(7);
        for i in 0..600 {
            clock_a.advance(100);
            clock_b.advance(100);
            let events = if i % 50 == 0 { vec![press()] } else { vec![] };
            let ra = a.step(&ctx_a, 0.0, &events);
            let rb = b.step(&ctx_b, 0.0, &events);
            assert_eq!(ra, rb);
        }
        assert_eq!(a.paddle.radial_offset, b.paddle.radial_offset);
        assert_eq!(
            a.powerup.as_ref().map(|p| p.position),
            b.powerup.as_ref().map(|p| p.position)
        );
        assert_eq!(a.ball.particles.len(), b.ball.particles.len());
    }
}
