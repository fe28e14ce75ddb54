//! Trigger policy, output line formatting and the since-launch average

use std::fmt::{self, Display};
use std::io::Write;

use crate::sampler::{AxisCodes, CycleSample};

/// Squared-magnitude threshold in g² (magnitude > ~0.632 g)
pub const MIN_TRIGGER_G2: f64 = 0.4;

/// Decides whether a cycle is worth emitting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerPolicy {
    threshold_g2: f64,
}

impl TriggerPolicy {
    pub fn new(threshold_g2: f64) -> Self {
        Self { threshold_g2 }
    }

    /// Strictly above the threshold; a reading exactly on it does not fire
    pub fn fires(&self, sample: &CycleSample) -> bool {
        sample.accel.magnitude_squared() > self.threshold_g2
    }
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self::new(MIN_TRIGGER_G2)
    }
}

/// Cumulative mean of emitted codes since the process started
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningAverage {
    sum: [i64; 3],
    count: u64,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, codes: &AxisCodes) {
        self.sum[0] += codes.x as i64;
        self.sum[1] += codes.y as i64;
        self.sum[2] += codes.z as i64;
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Per-axis mean with truncating division, `None` before the first sample
    pub fn average(&self) -> Option<[i64; 3]> {
        if self.count == 0 {
            return None;
        }
        let count = self.count as i64;
        Some(self.sum.map(|sum| sum / count))
    }
}

/// The machine-parsed output line: `x gx y gy z gz`
///
/// G values use the full 3300/1024/800 scale. Readers that compare against
/// logs from older builds, which used 3/800 g per code, will see g values
/// about 7.4% higher here for the same code.
pub struct ReadingLine<'a>(pub &'a CycleSample);

impl Display for ReadingLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let CycleSample { codes, accel } = self.0;
        write!(
            f,
            "{} {:.6} {} {:.6} {} {:.6}",
            codes.x, accel.x, codes.y, accel.y, codes.z, accel.z
        )
    }
}

/// The verbose-mode average line
pub struct AverageLine(pub [i64; 3]);

impl Display for AverageLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0;
        write!(f, "  [Average since launch {} {} {}]", x, y, z)
    }
}

/// Emits triggered cycles to the downstream stream
pub struct Emitter<W: Write> {
    out: W,
    policy: TriggerPolicy,
    verbose: bool,
    average: RunningAverage,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W, policy: TriggerPolicy, verbose: bool) -> Self {
        Self {
            out,
            policy,
            verbose,
            average: RunningAverage::new(),
        }
    }

    /// Write the reading if it triggers (or verbose is on). Returns whether
    /// anything was written.
    pub fn evaluate_and_emit(&mut self, sample: &CycleSample) -> std::io::Result<bool> {
        if !(self.verbose || self.policy.fires(sample)) {
            return Ok(false);
        }

        writeln!(self.out, "{}", ReadingLine(sample))?;

        if self.verbose {
            self.average.add(&sample.codes);
            if let Some(average) = self.average.average() {
                writeln!(self.out, "{}", AverageLine(average))?;
            }
        }

        self.out.flush()?;
        Ok(true)
    }

    pub fn running_average(&self) -> &RunningAverage {
        &self.average
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
