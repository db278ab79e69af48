//! Board geometry and presentation settings
//!
//! Loaded from JSON when present; every field falls back to its default.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static configuration for one process run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Board ===
    pub board_width: f32,
    pub board_height: f32,
    /// Target frames per second
    pub fps: u32,

    // === Caps ===
    /// MAXBALLSPEED (pixels/s)
    pub max_ball_speed: f32,
    /// MAXPADDLEROT (degrees/tick)
    pub max_paddle_rot: f32,

    // === Sprites ===
    pub ball_size: u32,
    pub paddle_width: u32,
    pub paddle_height: u32,
    /// Radial thickness of the paddle's curved art
    pub paddle_thickness: f32,
    pub powerup_size: u32,
    pub particle_size: u32,

    // === Menu ===
    pub button_width: u32,
    pub button_height: u32,
    pub play_button_offset_y: f32,
    pub exit_button_offset_y: f32,

    // === Game over ===
    pub score_font_size: u32,
    pub score_font_max: u32,
    pub score_font_step: u32,
    /// Pause after the tap-to-continue is accepted (ms)
    pub continue_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board_width: 720.0,
            board_height: 1280.0,
            fps: 60,

            max_ball_speed: 500.0,
            max_paddle_rot: 5.0,

            ball_size: 60,
            paddle_width: 200,
            paddle_height: 120,
            paddle_thickness: 24.0,
            powerup_size: 55,
            particle_size: 50,

            button_width: 240,
            button_height: 110,
            play_button_offset_y: 100.0,
            exit_button_offset_y: 300.0,

            score_font_size: 180,
            score_font_max: 280,
            score_font_step: 5,
            continue_delay_ms: 500,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board center (CENTER)
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.board_width / 2.0, self.board_height / 2.0)
    }

    /// Where the paddle starts: straight below the center, three quarters down
    pub fn paddle_start(&self) -> Vec2 {
        Vec2::new(self.board_width / 2.0, self.board_height * 3.0 / 4.0)
    }

    /// Duration of one frame in seconds
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Duration of one frame in whole milliseconds
    pub fn frame_ms(&self) -> u64 {
        (1000 / self.fps.max(1)) as u64
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `path`, or fall back to defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp values that would break the simulation back into a usable range
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.board_width > 0.0) || !(self.board_height > 0.0) {
            log::warn!("Invalid board size, using {}x{}", defaults.board_width, defaults.board_height);
            self.board_width = defaults.board_width;
            self.board_height = defaults.board_height;
        }
        self.fps = self.fps.clamp(1, 240);
        if !(self.max_ball_speed > 0.0) {
            self.max_ball_speed = defaults.max_ball_speed;
        }
        if !(self.max_paddle_rot > 0.0) {
            self.max_paddle_rot = defaults.max_paddle_rot;
        }
        self.ball_size = self.ball_size.max(1);
        self.paddle_width = self.paddle_width.max(1);
        self.paddle_height = self.paddle_height.max(1);
        self.powerup_size = self.powerup_size.max(1);
        self.particle_size = self.particle_size.max(1);
        if !(self.paddle_thickness > 0.0) {
            self.paddle_thickness = defaults.paddle_thickness;
        }
        self.score_font_step = self.score_font_step.max(1);
        self
    }
}
