//! Screen state machine
//!
//! Menu → Playing → GameOver → Menu, until the player picks "exit".

use glam::Vec2;

use crate::config::Config;
use crate::platform::InputEvent;
use crate::render::{Drawable, RenderFrame, TextKind};
use crate::sim::{Effect, GameSession, Rect, SessionContext};

const TITLE_FONT: u32 = 200;
const SUBTITLE_FONT: u32 = 160;
const BUTTON_FONT: u32 = 120;
const PROMPT_FONT: u32 = 50;
const TITLE_OFFSET_Y: f32 = -350.0;
const SUBTITLE_OFFSET_Y: f32 = -200.0;
const PROMPT_OFFSET_Y: f32 = 200.0;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Menu,
    Playing,
    GameOver,
    Exit,
}

/// Screen plus the state it owns
#[derive(Debug, Clone)]
pub enum Screen {
    Menu,
    Playing(Box<GameSession>),
    /// Final score with its growing counter
    GameOver { score: u32, font_size: u32 },
    /// Terminal; the loop stops
    Exit,
}

impl Screen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            Screen::Menu => ScreenKind::Menu,
            Screen::Playing(_) => ScreenKind::Playing,
            Screen::GameOver { .. } => ScreenKind::GameOver,
            Screen::Exit => ScreenKind::Exit,
        }
    }
}

/// What one flow frame asks of the loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowFrame {
    pub effects: Vec<Effect>,
    /// Pause the loop this long before the next frame
    pub delay_ms: Option<u64>,
    /// Stop the loop
    pub exit: bool,
    /// `(from, to)` if the screen changed this frame
    pub transition: Option<(ScreenKind, ScreenKind)>,
    /// Set on the frame a session ends
    pub final_score: Option<u32>,
}

/// "play" button hit area
pub fn play_button(config: &Config) -> Rect {
    Rect::from_center(
        config.center() + Vec2::new(0.0, config.play_button_offset_y),
        config.button_width,
        config.button_height,
    )
}

/// "exit" button hit area
pub fn exit_button(config: &Config) -> Rect {
    Rect::from_center(
        config.center() + Vec2::new(0.0, config.exit_button_offset_y),
        config.button_width,
        config.button_height,
    )
}

/// Top-level screen flow
pub struct ScreenFlow {
    screen: Screen,
    /// Sessions started so far
    sessions: u64,
    /// Fixed seed base; `None` seeds each session from the clock
    seed_base: Option<u64>,
}

impl Default for ScreenFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenFlow {
    pub fn new() -> Self {
        Self {
            screen: Screen::Menu,
            sessions: 0,
            seed_base: None,
        }
    }

    /// Seed sessions `seed`, `seed + 1`, ... for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed_base: Some(seed),
            ..Self::new()
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_kind(&self) -> ScreenKind {
        self.screen.kind()
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.screen, Screen::Exit)
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions
    }

    /// The running session, while on the Playing screen
    pub fn session(&self) -> Option<&GameSession> {
        match &self.screen {
            Screen::Playing(session) => Some(&**session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        match &mut self.screen {
            Screen::Playing(session) => Some(&mut **session),
            _ => None,
        }
    }

    fn next_seed(&self, ctx: &SessionContext) -> u64 {
        match self.seed_base {
            Some(base) => base.wrapping_add(self.sessions),
            None => ctx.now_ms() ^ self.sessions.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn switch(&mut self, next: Screen, out: &mut FlowFrame) {
        let from = self.screen.kind();
        let to = next.kind();
        log::info!("Screen {:?} -> {:?}", from, to);
        self.screen = next;
        out.transition = Some((from, to));
    }

    /// Advance the current screen by one frame
    pub fn frame(&mut self, ctx: &SessionContext, dt: f32, events: &[InputEvent]) -> FlowFrame {
        let mut out = FlowFrame::default();
        match &mut self.screen {
            Screen::Menu => self.menu_frame(ctx, events, &mut out),
            Screen::Playing(session) => {
                let result = session.step(ctx, dt, events);
                out.effects = result.effects;
                if result.terminal {
                    out.final_score = Some(result.score);
                    let next = Screen::GameOver {
                        score: result.score,
                        font_size: ctx.config.score_font_size,
                    };
                    self.switch(next, &mut out);
                }
            }
            Screen::GameOver { font_size, .. } => {
                let config = &ctx.config;
                let tapped = events
                    .iter()
                    .any(|e| matches!(e, InputEvent::PointerDown { .. }));
                if tapped && *font_size >= config.score_font_max {
                    out.delay_ms = Some(config.continue_delay_ms);
                    self.switch(Screen::Menu, &mut out);
                } else if *font_size <= config.score_font_max {
                    *font_size += config.score_font_step;
                }
            }
            Screen::Exit => {}
        }
        out.exit = self.is_exit();
        out
    }

    fn menu_frame(&mut self, ctx: &SessionContext, events: &[InputEvent], out: &mut FlowFrame) {
        let config = &ctx.config;
        for event in events {
            match event {
                InputEvent::Exit => {
                    self.switch(Screen::Exit, out);
                    return;
                }
                InputEvent::PointerDown { .. } => {
                    let Some(pos) = event.board_position(config) else {
                        continue;
                    };
                    if play_button(config).contains_point(pos) {
                        let session = GameSession::new(ctx, self.next_seed(ctx));
                        self.sessions += 1;
                        self.switch(Screen::Playing(Box::new(session)), out);
                        return;
                    }
                    if exit_button(config).contains_point(pos) {
                        self.switch(Screen::Exit, out);
                        return;
                    }
                }
                InputEvent::PointerUp => {}
            }
        }
    }

    /// Describe the current screen
    pub fn render(&self, ctx: &SessionContext) -> RenderFrame {
        let config = &ctx.config;
        let center = config.center();
        let mut frame = RenderFrame::new();
        let text = |kind, value, center, size| Drawable::Text {
            kind,
            value,
            center,
            size,
        };

        match &self.screen {
            Screen::Menu => {
                frame.push(text(
                    TextKind::Title,
                    0,
                    center + Vec2::new(0.0, TITLE_OFFSET_Y),
                    TITLE_FONT,
                ));
                frame.push(text(
                    TextKind::Subtitle,
                    0,
                    center + Vec2::new(0.0, SUBTITLE_OFFSET_Y),
                    SUBTITLE_FONT,
                ));
                frame.push(text(
                    TextKind::PlayButton,
                    0,
                    play_button(config).center(),
                    BUTTON_FONT,
                ));
                frame.push(text(
                    TextKind::ExitButton,
                    0,
                    exit_button(config).center(),
                    BUTTON_FONT,
                ));
            }
            Screen::Playing(session) => frame.add(&**session, config),
            Screen::GameOver { score, font_size } => {
                if *font_size > config.score_font_max {
                    frame.push(text(
                        TextKind::TapToContinue,
                        0,
                        center + Vec2::new(0.0, PROMPT_OFFSET_Y),
                        PROMPT_FONT,
                    ));
                }
                frame.push(text(TextKind::Score, *score, center, *font_size));
            }
            Screen::Exit => {}
        }
        frame
    }
}
