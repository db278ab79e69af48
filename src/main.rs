//! Wheel Pong entry point
//!
//! Runs a headless demo: an autopilot plays a few games against the real
//! frame loop and the scores are logged. Uses a simulated clock unless
//! `--realtime` is given.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use wheel_pong::flow::{Screen, ScreenFlow, exit_button, play_button};
    use wheel_pong::render::{EffectSink, NullRenderer};
    use wheel_pong::runner::FrameLoop;
    use wheel_pong::sim::{Effect, GameSession, SessionContext};
    use wheel_pong::{Clock, Config, InputEvent, ManualClock, SystemClock};

    const CONFIG_PATH: &str = "wheel-pong.json";
    /// Stop after this many frames even if games are still running
    const FRAME_LIMIT: u64 = 60 * 60 * 10;
    /// Paddle is "on target" within this many degrees
    const AIM_TOLERANCE_DEG: f32 = 4.0;

    pub struct Options {
        pub realtime: bool,
        pub games: u64,
        pub seed: Option<u64>,
    }

    impl Options {
        pub fn from_args(args: impl Iterator<Item = String>) -> Self {
            let mut options = Options {
                realtime: false,
                games: 3,
                seed: None,
            };
            let mut args = args.skip(1);
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--realtime" => options.realtime = true,
                    "--games" => match args.next().and_then(|v| v.parse().ok()) {
                        Some(n) => options.games = n,
                        None => log::warn!("--games needs a number"),
                    },
                    "--seed" => match args.next().and_then(|v| v.parse().ok()) {
                        Some(n) => options.seed = Some(n),
                        None => log::warn!("--seed needs a number"),
                    },
                    other => log::warn!("Ignoring unknown argument {}", other),
                }
            }
            options
        }
    }

    /// Logs effects in place of audio
    struct LogSink;

    impl EffectSink for LogSink {
        fn trigger(&mut self, effect: Effect) {
            log::debug!("effect: {:?}", effect);
        }
    }

    /// Where the ball will cross the boundary, as an offset from the center
    fn predicted_exit(session: &GameSession, center: Vec2) -> Vec2 {
        let p = session.ball.position - center;
        let v = session.ball.velocity;
        let r = session.boundary_radius;
        // |p + v t| = r, take the positive root
        let a = v.length_squared();
        if a <= f32::EPSILON {
            return p;
        }
        let b = 2.0 * p.dot(v);
        let c = p.length_squared() - r * r;
        let disc = (b * b - 4.0 * a * c).max(0.0);
        let t = (-b + disc.sqrt()) / (2.0 * a);
        p + v * t.max(0.0)
    }

    /// Hold the paddle down until it points at the ball's exit point.
    /// The paddle only turns one way, so it may have to go most of the way round.
    fn steer(session: &GameSession, center: Vec2) -> Option<InputEvent> {
        let target = predicted_exit(session, center);
        let paddle = session.paddle.radial_offset;
        // Each tick turns the offset by -rotation_speed
        let behind = (paddle.y.atan2(paddle.x) - target.y.atan2(target.x))
            .to_degrees()
            .rem_euclid(360.0);
        let want = behind > AIM_TOLERANCE_DEG && behind < 360.0 - AIM_TOLERANCE_DEG;
        match (want, session.paddle.is_moving) {
            (true, false) => Some(InputEvent::PointerDown {
                normalized: Vec2::splat(0.5),
            }),
            (false, true) => Some(InputEvent::PointerUp),
            _ => None,
        }
    }

    fn autopilot(flow: &ScreenFlow, config: &Config, games: u64) -> Vec<InputEvent> {
        match flow.screen() {
            Screen::Menu if flow.sessions_started() < games => {
                vec![InputEvent::pointer_down_at(play_button(config).center(), config)]
            }
            Screen::Menu => {
                vec![InputEvent::pointer_down_at(exit_button(config).center(), config)]
            }
            Screen::Playing(session) => steer(session, config.center()).into_iter().collect(),
            Screen::GameOver { font_size, .. } if *font_size >= config.score_font_max => {
                vec![InputEvent::pointer_down_at(config.center(), config)]
            }
            _ => Vec::new(),
        }
    }

    pub fn run(options: Options) {
        let config = Config::load_or_default(CONFIG_PATH);
        let clock: Box<dyn Clock> = if options.realtime {
            Box::new(SystemClock::new())
        } else {
            Box::new(ManualClock::new(0))
        };
        let flow = match options.seed {
            Some(seed) => ScreenFlow::with_seed(seed),
            None => ScreenFlow::new(),
        };
        let mut frame_loop = FrameLoop::new(SessionContext::new(clock, config), flow);
        let mut renderer = NullRenderer::default();
        let mut sink = LogSink;

        log::info!(
            "Playing {} games ({} clock)",
            options.games,
            if options.realtime { "system" } else { "simulated" }
        );
        let mut frames = 0;
        while !frame_loop.flow().is_exit() && frames < FRAME_LIMIT {
            let events = autopilot(frame_loop.flow(), &frame_loop.ctx().config, options.games);
            let out = frame_loop.tick(events, &mut renderer, &mut sink);
            if let Some(score) = out.final_score {
                log::info!("Game {} over, score {}", frame_loop.stats().scores.len(), score);
            }
            frames += 1;
        }

        let stats = frame_loop.stats();
        if !frame_loop.flow().is_exit() {
            log::warn!("Frame limit reached before the demo finished");
        }
        let best = stats.scores.iter().max().copied().unwrap_or(0);
        log::info!(
            "{} games in {} frames, scores {:?}, best {}",
            stats.scores.len(),
            stats.frames,
            stats.scores,
            best
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Wheel Pong (headless) starting...");
    demo::run(demo::Options::from_args(std::env::args()));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm entry point; there is no wasm binary
}
