// src/tuner.rs
//
// Adaptive launch-shape tuning for the parallel path.
//
// The tuned parameter is the minimum number of sites a rayon task handles
// (`with_min_len`). A tuner cycles through its candidates, timing
// `samples_per_candidate` launches of each, then locks onto the fastest. After
// `retune_after` further launches it starts over. The parameter only affects
// how work is split; every site is still computed by the same kernel.

use std::time::{Duration, Instant};

pub const DEFAULT_START: usize = 128;
pub const DEFAULT_END: usize = 256;
pub const DEFAULT_STEP: usize = 32;
pub const DEFAULT_SAMPLES: usize = 10;
pub const DEFAULT_RETUNE_AFTER: usize = 200_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tuning,
    Tuned,
}

#[derive(Debug, Clone)]
pub struct LaunchTuner {
    candidates: Vec<usize>,
    samples_per_candidate: usize,
    retune_after: usize,
    phase: Phase,
    current: usize,
    samples: usize,
    elapsed: Vec<Duration>,
    best: usize,
    launches_since_tune: usize,
    started: Option<Instant>,
}

impl Default for LaunchTuner {
    fn default() -> Self {
        Self::new(
            DEFAULT_START,
            DEFAULT_END,
            DEFAULT_STEP,
            DEFAULT_SAMPLES,
            DEFAULT_RETUNE_AFTER,
        )
    }
}

impl LaunchTuner {
    /// Candidates are start, start+step, ... up to and including end.
    pub fn new(start: usize, end: usize, step: usize, samples_per_candidate: usize, retune_after: usize) -> Self {
        let step = step.max(1);
        let mut candidates: Vec<usize> = (start.max(1)..=end.max(start.max(1))).step_by(step).collect();
        if candidates.is_empty() {
            candidates.push(start.max(1));
        }
        let n = candidates.len();
        Self {
            candidates,
            samples_per_candidate: samples_per_candidate.max(1),
            retune_after,
            phase: Phase::Tuning,
            current: 0,
            samples: 0,
            elapsed: vec![Duration::ZERO; n],
            best: 0,
            launches_since_tune: 0,
            started: None,
        }
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Value to use for the next launch.
    pub fn parameter(&self) -> usize {
        match self.phase {
            Phase::Tuning => self.candidates[self.current],
            Phase::Tuned => self.candidates[self.best],
        }
    }

    pub fn is_tuned(&self) -> bool {
        self.phase == Phase::Tuned
    }

    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn end(&mut self) {
        let Some(t0) = self.started.take() else {
            return;
        };
        self.record(t0.elapsed());
    }

    fn record(&mut self, dt: Duration) {
        match self.phase {
            Phase::Tuning => {
                self.elapsed[self.current] += dt;
                self.samples += 1;
                if self.samples < self.samples_per_candidate {
                    return;
                }
                self.samples = 0;
                self.current += 1;
                if self.current == self.candidates.len() {
                    self.best = self
                        .elapsed
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, d)| **d)
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.phase = Phase::Tuned;
                    self.launches_since_tune = 0;
                    self.current = 0;
                    log::debug!(
                        "[tuner] locked min_len={} from {:?}",
                        self.candidates[self.best],
                        self.candidates
                    );
                }
            }
            Phase::Tuned => {
                self.launches_since_tune += 1;
                if self.retune_after > 0 && self.launches_since_tune >= self.retune_after {
                    self.phase = Phase::Tuning;
                    self.current = 0;
                    self.samples = 0;
                    self.elapsed.iter_mut().for_each(|d| *d = Duration::ZERO);
                }
            }
        }
    }
}
