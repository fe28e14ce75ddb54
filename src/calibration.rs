//! Calibration and conversion constants
//!
//! Offsets were measured on the reference board and are not adjustable at
//! runtime. The same table is used whatever accelerometer type is declared.

use crate::mcp3002::Axis;

/// Resolution of the MCP3002 (10 bits)
pub const ADC_CODES: u32 = 1024;

/// Nominal code for 0 g on a ratiometric sensor
pub const MID_SCALE: i32 = 512;

/// ADC reference voltage in millivolts
pub const VREF_MV: u32 = 3300;

/// Accelerometer sensitivity in millivolts per g
pub const SENSITIVITY_MV_PER_G: u32 = 800;

/// G per averaged code: (3300 mV / 1024 codes) / 800 mV/g, about 0.0040283.
/// Older builds of the pusher truncated this to 3/800, so their g values
/// read about 7.4% lower for the same code.
pub const G_PER_CODE: f64 = VREF_MV as f64 / ADC_CODES as f64 / SENSITIVITY_MV_PER_G as f64;

// Per-axis offsets: mid-scale plus measured bias
pub const X_OFFSET: i32 = -MID_SCALE - 2;
pub const Y_OFFSET: i32 = -MID_SCALE + 67;
pub const Z_OFFSET: i32 = -MID_SCALE - 248 + 41; // resting 1 g on Z

/// Sub-samples averaged per axis in each cycle
pub const SUBSAMPLES_PER_AXIS: usize = 10;

/// Offset and scale applied to raw codes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    offsets: [i32; 3],
    g_per_code: f64,
}

impl Calibration {
    pub fn new(offsets: [i32; 3], g_per_code: f64) -> Self {
        Self {
            offsets,
            g_per_code,
        }
    }

    /// Offset added to every raw sub-sample of `axis`
    pub fn offset(&self, axis: Axis) -> i32 {
        self.offsets[axis.index()]
    }

    /// Convert an averaged, offset-corrected code to g
    pub fn to_g(&self, code: i32) -> f64 {
        code as f64 * self.g_per_code
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new([X_OFFSET, Y_OFFSET, Z_OFFSET], G_PER_CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let cal = Calibration::default();
        assert_eq!(cal.offset(Axis::X), -514);
        assert_eq!(cal.offset(Axis::Y), -445);
        assert_eq!(cal.offset(Axis::Z), -719);
    }

    #[test]
    fn test_scale_factor() {
        assert!((G_PER_CODE - 0.0040283).abs() < 1e-7);
        // 33/8192 is exact in binary floating point
        assert_eq!(G_PER_CODE, 33.0 / 8192.0);
    }

    #[test]
    fn test_to_g_is_linear() {
        let cal = Calibration::default();
        assert_eq!(cal.to_g(0), 0.0);
        assert_eq!(cal.to_g(100), 100.0 * G_PER_CODE);
        assert_eq!(cal.to_g(-207), -cal.to_g(207));
        assert!((cal.to_g(248) - 0.999).abs() < 0.001); // ~1 g
    }
}
