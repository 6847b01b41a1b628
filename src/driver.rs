//! Fixed-step frame loop.
//!
//! Every frame: poll input, simulate, redraw, refresh the stats column, then
//! wait out whatever is left of the frame budget.  `Init` re-enters after a
//! player death when the world is configured to restart.

use crate::compute::{Controls, GameWorld, TickReport};
use crate::config::{ConfigError, GameConfig};
use crate::entities::GameStatus;
use crate::platform::{InputSource, Surface, TickSource};
use crate::render::{RenderStats, RenderSync};

pub const FPS_SAMPLE_FRAMES: usize = 8;
pub const ENTITY_SAMPLE_FRAMES: usize = 20;
const MAX_SHOWN_FPS: u32 = 99;
const MAX_SHOWN_ENTITIES: u32 = 999;

// ── Performance counters ─────────────────────────────────────────────────────

/// Ring buffer of the last `N` samples.
#[derive(Clone, Copy, Debug)]
pub struct SlidingWindow<const N: usize> {
    samples: [u64; N],
    next: usize,
    filled: usize,
}

impl<const N: usize> Default for SlidingWindow<N> {
    fn default() -> Self {
        Self {
            samples: [0; N],
            next: 0,
            filled: 0,
        }
    }
}

impl<const N: usize> SlidingWindow<N> {
    pub fn push(&mut self, value: u64) {
        self.samples[self.next] = value;
        self.next = (self.next + 1) % N;
        self.filled = (self.filled + 1).min(N);
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn sum(&self) -> u64 {
        self.samples[..self.filled].iter().sum()
    }

    /// Rounded mean, or `None` before the first sample.
    pub fn mean(&self) -> Option<u64> {
        if self.filled == 0 {
            return None;
        }
        let n = self.filled as u64;
        Some((self.sum() + n / 2) / n)
    }
}

/// FPS and entity count, both averaged over a sliding window.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerfCounters {
    frame_ticks: SlidingWindow<FPS_SAMPLE_FRAMES>,
    entities: SlidingWindow<ENTITY_SAMPLE_FRAMES>,
}

impl PerfCounters {
    /// Duration of one whole frame, pacing included.
    pub fn record_frame(&mut self, ticks: u64) {
        self.frame_ticks.push(ticks);
    }

    pub fn record_entities(&mut self, count: usize) {
        self.entities.push(count as u64);
    }

    pub fn fps(&self, ticks_per_second: u64) -> u32 {
        let total = self.frame_ticks.sum();
        if total == 0 {
            return 0;
        }
        let fps = self.frame_ticks.len() as u64 * ticks_per_second / total;
        fps.min(MAX_SHOWN_FPS as u64) as u32
    }

    pub fn entities(&self) -> u32 {
        self.entities
            .mean()
            .map_or(0, |m| m.min(MAX_SHOWN_ENTITIES as u64) as u32)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Driver ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Running,
}

#[derive(Clone, Copy, Debug)]
pub struct FrameReport {
    /// Phase this frame ran in.
    pub phase: Phase,
    /// `None` for `Init` frames.
    pub tick: Option<TickReport>,
    pub render: RenderStats,
    /// Work took longer than the frame budget.
    pub overran: bool,
    pub fps: u32,
    pub entities: u32,
}

pub struct FrameDriver<S, I, C> {
    world: GameWorld,
    render: RenderSync,
    surface: S,
    input: I,
    clock: C,
    phase: Phase,
    perf: PerfCounters,
    budget: u64,
    last_start: Option<u64>,
    overruns: u64,
}

impl<S: Surface, I: InputSource, C: TickSource> FrameDriver<S, I, C> {
    pub fn new(config: GameConfig, surface: S, input: I, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let budget = (clock.ticks_per_second() / config.target_fps as u64).max(1);
        log::info!(
            "frame driver: {} fps target, budget {} ticks",
            config.target_fps,
            budget
        );
        Ok(Self {
            world: GameWorld::new(config),
            render: RenderSync::new(),
            surface,
            input,
            clock,
            phase: Phase::Init,
            perf: PerfCounters::default(),
            budget,
            last_start: None,
            overruns: 0,
        })
    }

    /// Run one frame, including the end-of-frame wait.
    pub fn step(&mut self) -> std::io::Result<FrameReport> {
        let start = self.clock.now();
        if let Some(prev) = self.last_start {
            self.perf.record_frame(start.saturating_sub(prev));
        }
        self.last_start = Some(start);

        self.input.poll();
        let phase = self.phase;
        let tick = match phase {
            Phase::Init => {
                self.world.init();
                self.perf.reset();
                self.phase = Phase::Running;
                None
            }
            Phase::Running => {
                let controls = Controls::read(&mut self.input);
                let report = self.world.tick(&controls);
                if self.world.status == GameStatus::PlayerDown {
                    self.phase = Phase::Init;
                }
                Some(report)
            }
        };

        let render = self.render.sync(&self.world, &mut self.surface);
        self.perf.record_entities(self.world.active_entities());
        let fps = self.perf.fps(self.clock.ticks_per_second());
        let entities = self.perf.entities();
        self.render
            .draw_hud(&self.world.config.playfield, fps, entities, &mut self.surface);
        self.surface.present()?;

        let deadline = start + self.budget;
        let overran = self.clock.now() > deadline;
        if overran {
            self.overruns += 1;
            log::trace!("frame {} over budget", self.world.frame);
        } else {
            self.clock.wait_until(deadline);
        }

        Ok(FrameReport {
            phase,
            tick,
            render,
            overran,
            fps,
            entities,
        })
    }

    pub fn run_frames(&mut self, frames: u64) -> std::io::Result<()> {
        for _ in 0..frames {
            self.step()?;
        }
        Ok(())
    }

    /// Step until `keep_running` says stop.  Returns frames run.
    pub fn run<F: FnMut(&I) -> bool>(&mut self, mut keep_running: F) -> std::io::Result<u64> {
        let mut frames = 0;
        while keep_running(&self.input) {
            self.step()?;
            frames += 1;
        }
        Ok(frames)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn perf(&self) -> &PerfCounters {
        &self.perf
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}
