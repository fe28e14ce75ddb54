//! Sensor pusher - streams triggered accelerometer readings to stdout
//!
//! Readings go to stdout for the next stage of the pipeline; diagnostics go
//! to stderr through the logger.

use clap::Parser;
use log::{debug, info, warn};
use spi_accel_pusher::config::print_usage;
use spi_accel_pusher::{
    Args, Bus, Config, Mcp3002Pair, Pusher, PusherError, SpiTransport, SpidevTransport,
    StreamControl, TransportError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args_os().len() <= 1 {
        print_usage()?;
        return Ok(());
    }

    let args = Args::parse();

    let verbose = args.verbose();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .init();

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run without arguments for usage.");
            return Err(Box::new(PusherError::from(e)));
        }
    };

    info!("Starting up at {}", chrono::Local::now().to_rfc3339());
    debug!("Debug flag is TRUE");
    info!("Sampling interval will be {} us", config.interval_micros());
    info!("Accelerometer type is {}", config.accel_type);

    let adc = match open_buses() {
        Ok(adc) => adc,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Please check:");
            eprintln!("  1. SPI is enabled (dtparam=spi=on in /boot/config.txt)");
            eprintln!("  2. /dev/spidev0.0 and /dev/spidev0.1 exist");
            eprintln!("  3. This user is in the spi group");
            return Err(Box::new(e));
        }
    };

    for bus in Bus::ALL {
        let transport = adc.transport(bus);
        info!("Opened {} as fd {}", transport.bus(), transport.raw_fd());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut pusher = Pusher::new(adc, &config, std::io::stdout().lock());

    let result = pusher.run(|_| {
        if running.load(Ordering::SeqCst) {
            StreamControl::Continue
        } else {
            StreamControl::Break
        }
    });

    match result {
        Ok(cycles) => {
            info!("Received Ctrl+C, stopped after {} cycles", cycles);
            let late = pusher.late_transfers();
            if late > 0 {
                warn!("{} SPI transfers were slower than expected", late);
            }
            Ok(())
        }
        Err(PusherError::Transport(e)) => {
            eprintln!("Error reading accelerometer: {}", e);
            eprintln!("Check the SPI wiring and the converter supply (3.3V).");
            Err(Box::new(e))
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(Box::new(e))
        }
    }
}

/// Open both converters at 1.2 MHz
fn open_buses() -> Result<Mcp3002Pair<SpidevTransport>, TransportError> {
    let bus0 = SpidevTransport::open_default(Bus::Bus0)?;
    let bus1 = SpidevTransport::open_default(Bus::Bus1)?;
    Ok(Mcp3002Pair::new(bus0, bus1))
}
