//! Timing-compensated sampling loop
//!
//! Each cycle goes Sampling → Computing → Emitting → Sleeping. The time spent
//! in the first three states, plus any time the caller's callback takes, is
//! subtracted from the configured interval, so a fast cycle never runs early
//! and a slow one runs back-to-back. There is no catch-up across cycles.

use std::fmt::{self, Display};
use std::io::Write;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::config::Config;
use crate::error::Result;
use crate::mcp3002::Mcp3002Pair;
use crate::sampler::{Aggregator, CycleSample};
use crate::transport::SpiTransport;
use crate::trigger::{Emitter, RunningAverage, TriggerPolicy};

/// Control flow for the sampling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Keep sampling
    Continue,
    /// Stop after this cycle
    Break,
}

/// Phase of the current sampling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Sampling,
    Computing,
    Emitting,
    Sleeping,
}

impl Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CycleState::Sampling => "sampling",
            CycleState::Computing => "computing",
            CycleState::Emitting => "emitting",
            CycleState::Sleeping => "sleeping",
        };
        write!(f, "{}", text)
    }
}

/// What happened in one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub sample: CycleSample,
    /// A line was written to the output stream
    pub emitted: bool,
    /// Time spent sampling, computing and emitting
    pub elapsed: Duration,
    /// Interval left after `elapsed`. [`Pusher::run`] also deducts the
    /// callback's own time before sleeping.
    pub sleep: Duration,
}

/// Time left in the interval after `elapsed`; zero on overrun
pub fn remaining_sleep(interval: Duration, elapsed: Duration) -> Duration {
    interval - elapsed.min(interval)
}

/// The sampler: owns both converters, the emitter and the running average
pub struct Pusher<T: SpiTransport, W: Write> {
    adc: Mcp3002Pair<T>,
    aggregator: Aggregator,
    emitter: Emitter<W>,
    interval: Duration,
    verbose: bool,
    state: CycleState,
}

impl<T: SpiTransport, W: Write> Pusher<T, W> {
    /// Build a pusher with the fixed calibration and trigger threshold
    pub fn new(adc: Mcp3002Pair<T>, config: &Config, out: W) -> Self {
        Self {
            adc,
            aggregator: Aggregator::default(),
            emitter: Emitter::new(out, TriggerPolicy::default(), config.verbose),
            interval: config.interval,
            verbose: config.verbose,
            state: CycleState::Sleeping,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn running_average(&self) -> &RunningAverage {
        self.emitter.running_average()
    }

    /// Transfers that came back later than the converter pair's limit
    pub fn late_transfers(&self) -> u64 {
        self.adc.late_transfers()
    }

    pub fn into_output(self) -> W {
        self.emitter.into_inner()
    }

    fn enter(&mut self, state: CycleState) {
        trace!("{} -> {}", self.state, state);
        self.state = state;
    }

    /// Sample, compute and emit once, leaving the loop in `Sleeping`.
    /// Does not sleep.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let start = Instant::now();

        self.enter(CycleState::Sampling);
        let raw = self.aggregator.read_cycle(&mut self.adc)?;

        self.enter(CycleState::Computing);
        let sample = self.aggregator.compute(&raw);

        self.enter(CycleState::Emitting);
        let emitted = self.emitter.evaluate_and_emit(&sample)?;

        self.enter(CycleState::Sleeping);
        let elapsed = start.elapsed();
        if self.verbose {
            debug!("Sampling took {} us", elapsed.as_micros());
        }

        Ok(CycleReport {
            sample,
            emitted,
            elapsed,
            sleep: remaining_sleep(self.interval, elapsed),
        })
    }

    /// Run cycles until `callback` returns [`StreamControl::Break`] or an
    /// error occurs. Returns the number of completed cycles.
    ///
    /// The callback runs inside the cycle's time budget: the sleep is
    /// measured from the start of the cycle to the callback's return.
    pub fn run<F>(&mut self, mut callback: F) -> Result<u64>
    where
        F: FnMut(&CycleReport) -> StreamControl,
    {
        let mut cycles = 0u64;

        loop {
            let start = Instant::now();
            let report = self.run_cycle()?;
            cycles += 1;

            if callback(&report) == StreamControl::Break {
                break;
            }

            let sleep = remaining_sleep(self.interval, start.elapsed());
            if !sleep.is_zero() {
                std::thread::sleep(sleep);
            }
        }

        Ok(cycles)
    }
}
