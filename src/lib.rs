//! Accelerometer sensor pusher for SPI-attached MCP3002 ADCs
//!
//! Polls a 3-axis analog accelerometer through two MCP3002 converters on a
//! Linux SPI controller, converts the readings to g and writes triggered
//! readings to a line-oriented stream for the next processing stage.
//!
//! # Quick Start
//!
//! ```no_run
//! use spi_accel_pusher::{Bus, Config, Mcp3002Pair, Pusher, SpidevTransport, StreamControl};
//! use std::time::Duration;
//!
//! let adc = Mcp3002Pair::new(
//!     SpidevTransport::open_default(Bus::Bus0)?,
//!     SpidevTransport::open_default(Bus::Bus1)?,
//! );
//! let config = Config {
//!     accel_type: "ADXL".to_string(),
//!     interval: Duration::from_millis(100),
//!     verbose: false,
//! };
//!
//! // Emit triggered readings to stdout for ten cycles
//! let mut pusher = Pusher::new(adc, &config, std::io::stdout().lock());
//! let mut remaining = 10;
//! pusher.run(|report| {
//!     if report.emitted {
//!         eprintln!("|a|² = {:.3} g²", report.sample.accel.magnitude_squared());
//!     }
//!     remaining -= 1;
//!     if remaining == 0 {
//!         StreamControl::Break
//!     } else {
//!         StreamControl::Continue
//!     }
//! })?;
//! # Ok::<(), spi_accel_pusher::PusherError>(())
//! ```
//!
//! ## Output format
//!
//! One line per triggered cycle, `x gx y gy z gz`, with codes as signed
//! integers and accelerations to six decimals:
//!
//! ```text
//! -2 -0.008057 67 0.269897 -207 -0.833862
//! ```
//!
//! The g columns use `(3300 / 1024) / 800` g per code. Older builds
//! truncated this to `3 / 800`, so their g columns read about 7.4% lower
//! for the same codes; the code columns are unchanged.

pub mod calibration;
pub mod config;
pub mod error;
pub mod mcp3002;
pub mod pacing;
pub mod sampler;
pub mod transport;
pub mod trigger;

// Re-export public API
pub use calibration::Calibration;
pub use config::{Args, Config};
pub use error::{ConfigError, PusherError, Result, TransportError};
pub use mcp3002::{Axis, Mcp3002Pair};
pub use pacing::{CycleReport, CycleState, Pusher, StreamControl};
pub use sampler::{Acceleration, Aggregator, AxisCodes, CycleSample};
pub use transport::{Bus, SpiTransport, SpidevTransport};
pub use trigger::{Emitter, RunningAverage, TriggerPolicy};
