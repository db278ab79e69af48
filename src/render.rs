//! Renderer and effect-sink seams
//!
//! The core never draws. Each frame it flattens the visible entities into a
//! list of tagged `Drawable`s; a backend either walks that list or uploads
//! the packed `SpriteInstance`s straight into an instance buffer.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::config::Config;
use crate::sim::{Ball, Effect, GameSession, Paddle, Particle, PowerUp, PowerUpKind};

/// Text items a screen can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Title,
    Subtitle,
    PlayButton,
    ExitButton,
    /// Current or final score; the number is carried in `value`
    Score,
    TapToContinue,
}

/// One thing to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Paddle {
        center: Vec2,
        /// Counter-clockwise on screen (degrees)
        angle: f32,
        size: (u32, u32),
    },
    Ball {
        center: Vec2,
        size: u32,
    },
    Particle {
        center: Vec2,
        alpha: u8,
        size: u32,
    },
    PowerUp {
        center: Vec2,
        size: u32,
        kind: PowerUpKind,
    },
    /// Circular arena outline
    Boundary {
        center: Vec2,
        radius: f32,
    },
    Text {
        kind: TextKind,
        value: u32,
        center: Vec2,
        /// Font size in pixels
        size: u32,
    },
}

/// Anything that can describe itself to a renderer
pub trait Renderable {
    fn drawables(&self, config: &Config, out: &mut Vec<Drawable>);
}

impl Renderable for Paddle {
    fn drawables(&self, _config: &Config, out: &mut Vec<Drawable>) {
        out.push(Drawable::Paddle {
            center: self.center,
            angle: self.angle,
            size: self.hitbox_size,
        });
    }
}

impl Renderable for Particle {
    fn drawables(&self, config: &Config, out: &mut Vec<Drawable>) {
        out.push(Drawable::Particle {
            center: self.pos,
            alpha: self.alpha_u8(),
            size: config.particle_size,
        });
    }
}

impl Renderable for Ball {
    fn drawables(&self, config: &Config, out: &mut Vec<Drawable>) {
        // Trail goes under the ball
        for particle in self.particles.iter() {
            particle.drawables(config, out);
        }
        out.push(Drawable::Ball {
            center: self.position,
            size: self.size,
        });
    }
}

impl Renderable for PowerUp {
    fn drawables(&self, _config: &Config, out: &mut Vec<Drawable>) {
        if self.alive {
            out.push(Drawable::PowerUp {
                center: self.position,
                size: self.size,
                kind: self.kind,
            });
        }
    }
}

impl Renderable for GameSession {
    fn drawables(&self, config: &Config, out: &mut Vec<Drawable>) {
        let center = config.center();
        out.push(Drawable::Boundary {
            center,
            radius: self.boundary_radius,
        });
        out.push(Drawable::Text {
            kind: TextKind::Score,
            value: self.score,
            center,
            size: config.score_font_size,
        });
        self.paddle.drawables(config, out);
        self.ball.drawables(config, out);
        if let Some(powerup) = &self.powerup {
            powerup.drawables(config, out);
        }
    }
}

/// Sprite kinds as stored in `SpriteInstance::kind`
pub mod sprite_kind {
    pub const PADDLE: u32 = 0;
    pub const BALL: u32 = 1;
    pub const PARTICLE: u32 = 2;
    pub const POWERUP: u32 = 3;
    pub const BOUNDARY: u32 = 4;
    pub const TEXT: u32 = 5;
}

/// Colors for game elements
pub mod colors {
    pub const PADDLE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BALL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PARTICLE: [f32; 4] = [0.85, 0.85, 0.85, 1.0];
    pub const POWERUP_SLOW: [f32; 4] = [0.4, 0.7, 1.0, 1.0];
    pub const POWERUP_EXPAND: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const BOUNDARY: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
    pub const DARK_GRAY: [f32; 4] = [0.25, 0.25, 0.25, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
}

/// Per-sprite GPU instance data
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    /// Width/height in pixels (boundary: diameter)
    pub size: [f32; 2],
    /// Radians, counter-clockwise on screen
    pub rotation: f32,
    /// One of `sprite_kind`
    pub kind: u32,
    /// Text kind index or power-up kind
    pub variant: u32,
    /// Score for score text
    pub value: u32,
    pub color: [f32; 4],
}

impl SpriteInstance {
    fn at(kind: u32, center: Vec2, size: Vec2, color: [f32; 4]) -> Self {
        Self {
            position: center.to_array(),
            size: size.to_array(),
            rotation: 0.0,
            kind,
            variant: 0,
            value: 0,
            color,
        }
    }
}

impl From<&Drawable> for SpriteInstance {
    fn from(drawable: &Drawable) -> Self {
        match *drawable {
            Drawable::Paddle {
                center,
                angle,
                size,
            } => SpriteInstance {
                rotation: angle.to_radians(),
                ..Self::at(
                    sprite_kind::PADDLE,
                    center,
                    Vec2::new(size.0 as f32, size.1 as f32),
                    colors::PADDLE,
                )
            },
            Drawable::Ball { center, size } => {
                Self::at(sprite_kind::BALL, center, Vec2::splat(size as f32), colors::BALL)
            }
            Drawable::Particle {
                center,
                alpha,
                size,
            } => {
                let mut color = colors::PARTICLE;
                color[3] = alpha as f32 / 255.0;
                Self::at(sprite_kind::PARTICLE, center, Vec2::splat(size as f32), color)
            }
            Drawable::PowerUp { center, size, kind } => {
                let (color, variant) = match kind {
                    PowerUpKind::SlowDown => (colors::POWERUP_SLOW, 0),
                    PowerUpKind::Expand => (colors::POWERUP_EXPAND, 1),
                };
                SpriteInstance {
                    variant,
                    ..Self::at(sprite_kind::POWERUP, center, Vec2::splat(size as f32), color)
                }
            }
            Drawable::Boundary { center, radius } => Self::at(
                sprite_kind::BOUNDARY,
                center,
                Vec2::splat(radius * 2.0),
                colors::BOUNDARY,
            ),
            Drawable::Text {
                kind,
                value,
                center,
                size,
            } => {
                let color = match kind {
                    TextKind::Score => colors::DARK_GRAY,
                    TextKind::TapToContinue => colors::WHITE,
                    _ => colors::GRAY,
                };
                SpriteInstance {
                    variant: kind as u32,
                    value,
                    ..Self::at(sprite_kind::TEXT, center, Vec2::splat(size as f32), color)
                }
            }
        }
    }
}

/// Everything drawn in one frame, back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub drawables: Vec<Drawable>,
}

impl RenderFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }

    pub fn add(&mut self, item: &impl Renderable, config: &Config) {
        item.drawables(config, &mut self.drawables);
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// Pack into instance data, preserving draw order
    pub fn instances(&self) -> Vec<SpriteInstance> {
        self.drawables.iter().map(SpriteInstance::from).collect()
    }
}

/// View instances as raw bytes for a buffer upload
pub fn instance_bytes(instances: &[SpriteInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

/// Consumes one frame per loop iteration
pub trait Renderer {
    fn submit(&mut self, frame: &RenderFrame);
}

/// Maps effects to sounds or visual cues
pub trait EffectSink {
    fn trigger(&mut self, effect: Effect);
}

/// Renderer that only counts frames (headless runs and tests)
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
    /// Drawables in the most recent frame
    pub last_len: usize,
}

impl Renderer for NullRenderer {
    fn submit(&mut self, frame: &RenderFrame) {
        self.frames += 1;
        self.last_len = frame.len();
    }
}

/// Sink that remembers every effect it was handed
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub effects: Vec<Effect>,
}

impl RecordingSink {
    pub fn count(&self, effect: Effect) -> usize {
        self.effects.iter().filter(|e| **e == effect).count()
    }
}

impl EffectSink for RecordingSink {
    fn trigger(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualClock;
    use crate::sim::SessionContext;

    fn ctx() -> SessionContext {
        SessionContext::new(Box::new(ManualClock::new(0)), Config::default())
    }

    #[test]
    fn test_instance_layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 48);
        let frame = RenderFrame {
            drawables: vec![
                Drawable::Ball {
                    center: Vec2::new(1.0, 2.0),
                    size: 60,
                },
                Drawable::Boundary {
                    center: Vec2::ZERO,
                    radius: 320.0,
                },
            ],
        };
        let instances = frame.instances();
        assert_eq!(instance_bytes(&instances).len(), 96);
        assert_eq!(instances[0].position, [1.0, 2.0]);
        assert_eq!(instances[1].size, [640.0, 640.0]);
    }

    #[test]
    fn test_session_draw_order() {
        let ctx = ctx();
        let session = GameSession::new(&ctx, 1);
        let mut frame = RenderFrame::new();
        frame.add(&session, &ctx.config);

        assert!(matches!(frame.drawables[0], Drawable::Boundary { radius, .. } if (radius - 320.0).abs() < 1e-3));
        assert!(matches!(
            frame.drawables[1],
            Drawable::Text {
                kind: TextKind::Score,
                value: 0,
                ..
            }
        ));
        assert!(matches!(frame.drawables[2], Drawable::Paddle { .. }));
        assert!(matches!(frame.drawables.last(), Some(Drawable::Ball { .. })));
    }

    #[test]
    fn test_particle_alpha_reaches_instance_color() {
        let config = Config::default();
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO);
        p.alpha = 51;
        let mut out = Vec::new();
        p.drawables(&config, &mut out);
        let instance = SpriteInstance::from(&out[0]);
        assert!((instance.color[3] - 0.2).abs() < 1e-6);
        assert_eq!(instance.kind, sprite_kind::PARTICLE);
    }

    #[test]
    fn test_dead_powerup_is_not_drawn() {
        let config = Config::default();
        let mut pu = PowerUp::new(PowerUpKind::SlowDown, Vec2::ZERO, 55, 0);
        let mut out = Vec::new();
        pu.drawables(&config, &mut out);
        assert_eq!(out.len(), 1);
        pu.alive = false;
        out.clear();
        pu.drawables(&config, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_recording_sink_counts() {
        let mut sink = RecordingSink::default();
        sink.trigger(Effect::Bump);
        sink.trigger(Effect::Bump);
        sink.trigger(Effect::Loss);
        assert_eq!(sink.count(Effect::Bump), 2);
        assert_eq!(sink.count(Effect::Pickup), 0);
    }
}
