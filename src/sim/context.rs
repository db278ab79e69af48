//! Per-run context and per-frame update arguments

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::config::Config;
use crate::platform::Clock;

/// Clock source and configuration shared by every update in one process run
pub struct SessionContext {
    pub clock: Box<dyn Clock>,
    pub config: Config,
}

impl SessionContext {
    pub fn new(clock: Box<dyn Clock>, config: Config) -> Self {
        Self { clock, config }
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Board center (CENTER)
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.config.center()
    }
}

/// Arguments handed to every entity update within one frame
pub struct Tick<'a> {
    /// Seconds since the previous frame (already sanitized)
    pub dt: f32,
    /// Clock reading for this frame; all timers compare against it
    pub now_ms: u64,
    pub ctx: &'a SessionContext,
    pub rng: &'a mut Pcg32,
}

impl<'a> Tick<'a> {
    pub fn new(dt: f32, ctx: &'a SessionContext, rng: &'a mut Pcg32) -> Self {
        Self {
            dt: sanitize_dt(dt),
            now_ms: ctx.now_ms(),
            ctx,
            rng,
        }
    }
}

/// Per-frame simulation step for an entity
pub trait Update {
    fn update(&mut self, tick: &mut Tick<'_>);
}

/// Negative, NaN or infinite dt becomes 0 so one bad frame cannot corrupt the session
pub fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Discarding invalid frame dt {}", dt);
        return 0.0;
    }
    dt
}
