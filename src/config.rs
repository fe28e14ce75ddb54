//! Command-line surface and startup configuration
//!
//! Arguments are positional, in the order the downstream launch scripts use:
//!
//! ```text
//! sensor-pusher <TYPE> [SAMPLING_MS] [DEBUG]
//! ```

use std::time::Duration;

use clap::{CommandFactory, Parser};
use log::warn;

use crate::error::ConfigError;

/// Longest accepted sampling interval in milliseconds
pub const MAX_INTERVAL_MS: i64 = 1000;

/// Interval used when none is given
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(MAX_INTERVAL_MS as u64);

/// Labels the launch scripts pass. All share one calibration.
pub const KNOWN_ACCEL_TYPES: [&str; 3] = ["ADXL", "LIS", "MMA"];

#[derive(Parser, Debug)]
#[command(name = "sensor-pusher")]
#[command(
    about = "Caribe Wave sensor pusher: pushes accelerometer readings to stdout for the next stage",
    long_about = None
)]
pub struct Args {
    /// Type of accelerometer: ADXL, LIS or MMA
    #[arg(value_name = "TYPE")]
    pub accel_type: Option<String>,

    /// Sampling interval in milliseconds, between 0 and 1000
    #[arg(value_name = "SAMPLING_MS", allow_hyphen_values = true)]
    pub interval_ms: Option<String>,

    /// Debug output: 1 or 0
    #[arg(value_name = "DEBUG", allow_hyphen_values = true)]
    pub debug: Option<String>,

    /// Anything past the third argument is ignored
    #[arg(hide = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

impl Args {
    /// Debug mode is on when the flag starts with `1`
    pub fn verbose(&self) -> bool {
        self.debug
            .as_deref()
            .is_some_and(|flag| flag.starts_with('1'))
    }
}

/// Print the usage text to stdout
pub fn print_usage() -> std::io::Result<()> {
    Args::command().print_help()
}

/// Validated startup configuration, immutable once the loop starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Free-form accelerometer label, echoed in diagnostics only
    pub accel_type: String,
    /// Target period of one sampling cycle
    pub interval: Duration,
    /// Emit every cycle and print the running average
    pub verbose: bool,
}

impl Config {
    /// Validate parsed arguments
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let accel_type = args.accel_type.clone().unwrap_or_default();
        if accel_type.trim().is_empty() {
            return Err(ConfigError::MissingAccelType);
        }
        if !KNOWN_ACCEL_TYPES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(accel_type.trim()))
        {
            warn!(
                "Unknown accelerometer type {:?}, using the common calibration",
                accel_type
            );
        }

        let interval = match args.interval_ms.as_deref() {
            Some(text) => interval_from_millis(parse_millis(text)?),
            None => DEFAULT_INTERVAL,
        };

        let verbose = args.verbose();

        if !args.extra.is_empty() {
            warn!("Too many arguments supplied, ignoring {:?}", args.extra);
        }

        Ok(Self {
            accel_type,
            interval,
            verbose,
        })
    }

    /// Sampling interval in microseconds
    pub fn interval_micros(&self) -> u128 {
        self.interval.as_micros()
    }
}

/// Parse a millisecond count. Integers too large for `i64` saturate, so
/// they still clamp to the upper bound.
pub fn parse_millis(text: &str) -> Result<i64, ConfigError> {
    let text = text.trim();
    match text.parse::<i64>() {
        Ok(ms) => Ok(ms),
        Err(_) => {
            let digits = text.strip_prefix(&['-', '+'][..]).unwrap_or(text);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ConfigError::InvalidInterval(text.to_string()));
            }
            Ok(if text.starts_with('-') { i64::MIN } else { i64::MAX })
        }
    }
}

/// Clamp to [0, 1000] ms and convert
pub fn interval_from_millis(ms: i64) -> Duration {
    let clamped = ms.clamp(0, MAX_INTERVAL_MS);
    if clamped != ms {
        warn!(
            "Sampling interval {} ms out of range, using {} ms",
            ms, clamped
        );
    }
    Duration::from_millis(clamped as u64)
}
