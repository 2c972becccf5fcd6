//! UWB Positioning Driver
//!
//! Runs the framing loop against a byte source: send the start command,
//! assemble and validate frames until asked to stop, then send the stop
//! command. Health is exposed through counters and status snapshots.

mod clock;
mod config;
mod counters;
mod driver;
mod lifecycle;
mod sink;

pub use clock::monotonic_micros;
pub use config::DriverConfig;
pub use counters::{CounterSnapshot, DriverCounters};
pub use driver::UwbDriver;
pub use lifecycle::{DriverHandle, DriverStatus};
pub use sink::ReportSink;
