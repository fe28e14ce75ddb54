//! Sample aggregation: repeated reads, offset correction, conversion to g

use crate::calibration::{Calibration, SUBSAMPLES_PER_AXIS};
use crate::error::TransportError;
use crate::mcp3002::{Axis, Mcp3002Pair};
use crate::transport::SpiTransport;

/// Averaged, offset-corrected codes for one cycle (may be negative)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisCodes {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl AxisCodes {
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Acceleration in g
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Acceleration {
    /// Squared magnitude in g²
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
}

/// Result of one sampling cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleSample {
    pub codes: AxisCodes,
    pub accel: Acceleration,
}

impl CycleSample {
    /// Build a sample from averaged codes
    pub fn from_codes(codes: AxisCodes, calibration: &Calibration) -> Self {
        Self {
            codes,
            accel: Acceleration {
                x: calibration.to_g(codes.x),
                y: calibration.to_g(codes.y),
                z: calibration.to_g(codes.z),
            },
        }
    }
}

/// Raw sub-samples gathered in one cycle, per axis. Stored inline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCycle {
    samples: [[u16; SUBSAMPLES_PER_AXIS]; 3],
}

impl RawCycle {
    pub fn samples(&self, axis: Axis) -> &[u16] {
        &self.samples[axis.index()]
    }
}

/// Reads every axis a fixed number of times per cycle and averages
pub struct Aggregator {
    calibration: Calibration,
}

impl Aggregator {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    /// Collect the cycle's sub-samples, reading X, Y, Z in turn
    pub fn read_cycle<T: SpiTransport>(
        &self,
        adc: &mut Mcp3002Pair<T>,
    ) -> Result<RawCycle, TransportError> {
        let mut raw = RawCycle::default();

        for i in 0..SUBSAMPLES_PER_AXIS {
            for axis in Axis::ALL {
                raw.samples[axis.index()][i] = adc.read_channel(axis)?;
            }
        }

        Ok(raw)
    }

    /// Average, offset-correct and convert a cycle's sub-samples
    pub fn compute(&self, raw: &RawCycle) -> CycleSample {
        let average =
            |axis: Axis| average_with_offset(raw.samples(axis), self.calibration.offset(axis));
        let codes = AxisCodes {
            x: average(Axis::X),
            y: average(Axis::Y),
            z: average(Axis::Z),
        };

        CycleSample::from_codes(codes, &self.calibration)
    }

    /// Read and compute in one step
    pub fn aggregate_cycle<T: SpiTransport>(
        &self,
        adc: &mut Mcp3002Pair<T>,
    ) -> Result<CycleSample, TransportError> {
        let raw = self.read_cycle(adc)?;
        Ok(self.compute(&raw))
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}

/// `(Σ (sample + offset)) / n`, truncating toward zero. Zero for no samples.
pub fn average_with_offset(samples: &[u16], offset: i32) -> i32 {
    if samples.is_empty() {
        return 0;
    }
    let sum: i32 = samples.iter().map(|&code| code as i32 + offset).sum();
    sum / samples.len() as i32
}
