//! Fixed-rate frame loop
//!
//! Real elapsed time is accumulated and consumed in fixed `1/fps` steps, so
//! the flow always sees the same dt no matter how irregular the host is.

use std::collections::VecDeque;

use crate::consts::*;
use crate::flow::{FlowFrame, ScreenFlow};
use crate::platform::InputEvent;
use crate::render::{EffectSink, Renderer};
use crate::sim::SessionContext;

/// Where a loop gets its input each frame
pub trait InputSource {
    /// Events that arrived since the last poll
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Replays prepared batches, one per poll, then stays silent
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(batches: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }

    /// Append `count` empty polls
    pub fn idle(mut self, count: usize) -> Self {
        self.batches.extend(std::iter::repeat_n(Vec::new(), count));
        self
    }

    pub fn then(mut self, batch: Vec<InputEvent>) -> Self {
        self.batches.push_back(batch);
        self
    }

    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.batches.pop_front().unwrap_or_default()
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Outer frames (one render each)
    pub frames: u64,
    /// Simulation steps across all frames
    pub steps: u64,
    /// Final score of every finished session, in order
    pub scores: Vec<u32>,
}

/// Drives a `ScreenFlow` against a clock
pub struct FrameLoop {
    ctx: SessionContext,
    flow: ScreenFlow,
    accumulator: f32,
    last_time_ms: u64,
    /// Events waiting for the next simulation step
    pending: Vec<InputEvent>,
    stats: RunStats,
}

impl FrameLoop {
    pub fn new(ctx: SessionContext, flow: ScreenFlow) -> Self {
        let last_time_ms = ctx.now_ms();
        Self {
            ctx,
            flow,
            accumulator: 0.0,
            last_time_ms,
            pending: Vec::new(),
            stats: RunStats::default(),
        }
    }

    pub fn ctx(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn flow(&self) -> &ScreenFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut ScreenFlow {
        &mut self.flow
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run one outer frame: step, render, forward effects, then pace
    pub fn tick<R: Renderer, S: EffectSink>(
        &mut self,
        events: Vec<InputEvent>,
        renderer: &mut R,
        sink: &mut S,
    ) -> FlowFrame {
        let frame_start = self.ctx.now_ms();
        let elapsed = frame_start.saturating_sub(self.last_time_ms) as f32 / 1000.0;
        self.last_time_ms = frame_start;
        self.pending.extend(events);

        // Cap elapsed time so a stall cannot trigger a burst of catch-up steps
        self.accumulator += elapsed.min(MAX_FRAME_DT);
        let step = self.ctx.config.frame_dt();

        let mut out = FlowFrame::default();
        let mut substeps = 0;
        while self.accumulator >= step && substeps < MAX_SUBSTEPS {
            // Input only reaches the first step of a frame
            let events = std::mem::take(&mut self.pending);
            let frame = self.flow.frame(&self.ctx, step, &events);
            self.accumulator -= step;
            substeps += 1;
            self.stats.steps += 1;

            let stop = frame.exit || frame.delay_ms.is_some();
            merge(&mut out, frame);
            if stop {
                break;
            }
        }
        // A host slower than MAX_SUBSTEPS steps per frame would grow a backlog
        // that replays at high speed once it recovers; drop it instead
        if substeps == MAX_SUBSTEPS {
            self.accumulator %= step;
        }

        renderer.submit(&self.flow.render(&self.ctx));
        self.stats.frames += 1;
        for effect in &out.effects {
            sink.trigger(*effect);
        }
        if let Some(score) = out.final_score {
            self.stats.scores.push(score);
        }

        if let Some(delay) = out.delay_ms {
            self.ctx.clock.sleep_ms(delay);
            self.accumulator = 0.0;
            self.last_time_ms = self.ctx.now_ms();
        }

        if !out.exit {
            let spent = self.ctx.now_ms().saturating_sub(frame_start);
            let budget = self.ctx.config.frame_ms();
            if spent < budget {
                self.ctx.clock.sleep_ms(budget - spent);
            }
        }
        out
    }

    /// Loop until the flow exits
    pub fn run<I, R, S>(&mut self, input: &mut I, renderer: &mut R, sink: &mut S) -> RunStats
    where
        I: InputSource,
        R: Renderer,
        S: EffectSink,
    {
        self.run_for(u64::MAX, input, renderer, sink)
    }

    /// Loop until the flow exits or `max_frames` outer frames have run
    pub fn run_for<I, R, S>(
        &mut self,
        max_frames: u64,
        input: &mut I,
        renderer: &mut R,
        sink: &mut S,
    ) -> RunStats
    where
        I: InputSource,
        R: Renderer,
        S: EffectSink,
    {
        let mut frames = 0;
        while frames < max_frames && !self.flow.is_exit() {
            let events = input.poll();
            self.tick(events, renderer, sink);
            frames += 1;
        }
        log::info!(
            "Loop finished after {} frames ({} steps), {} games",
            self.stats.frames,
            self.stats.steps,
            self.stats.scores.len()
        );
        self.stats.clone()
    }
}

fn merge(into: &mut FlowFrame, frame: FlowFrame) {
    into.effects.extend(frame.effects);
    into.delay_ms = into.delay_ms.or(frame.delay_ms);
    into.exit |= frame.exit;
    if frame.transition.is_some() {
        into.transition = frame.transition;
    }
    into.final_score = into.final_score.or(frame.final_score);
}
