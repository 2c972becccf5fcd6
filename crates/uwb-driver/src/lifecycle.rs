//! Driver Lifecycle
//!
//! `start` opens the serial port and spawns the framing loop on the tokio
//! runtime. Port and configuration errors are returned before anything is
//! spawned. `stop` is cooperative: the loop finishes the framing attempt in
//! progress (at most one message timeout plus one byte timeout) first.

use crate::config::DriverConfig;
use crate::counters::{CounterSnapshot, DriverCounters};
use crate::driver::UwbDriver;
use crate::sink::ReportSink;
use frame_validator::FrameValidator;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uwb_protocol::{open_port, ByteSource, FrameReader, UwbError};

/// Health snapshot of a running (or stopped) driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStatus {
    pub device: String,
    pub baud: u32,
    pub running: bool,
    pub uptime_secs: u64,
    #[serde(flatten)]
    pub counters: CounterSnapshot,
}

/// Handle to a spawned framing loop
pub struct DriverHandle {
    device: String,
    baud: u32,
    stop: Arc<AtomicBool>,
    counters: Arc<DriverCounters>,
    started_at: Instant,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Open the configured serial port and start the framing loop
    pub fn start<K>(config: &DriverConfig, sink: K) -> Result<Self, UwbError>
    where
        K: ReportSink + 'static,
    {
        let port_config = config.port_config()?;
        // validate timing before touching the device
        config.timeouts()?;
        let port = open_port(&port_config)?;

        info!(
            "Constructing UWB. Device: {}, Baud: {}",
            port_config.device, port_config.baud
        );
        Self::spawn(port, sink, config, Arc::new(DriverCounters::new()))
    }

    /// Start the framing loop over an already-open byte source
    pub fn spawn<S, K>(
        source: S,
        sink: K,
        config: &DriverConfig,
        counters: Arc<DriverCounters>,
    ) -> Result<Self, UwbError>
    where
        S: ByteSource + 'static,
        K: ReportSink + 'static,
    {
        let reader = FrameReader::new(config.timeouts()?);
        let validator = FrameValidator::new(config.validation.clone());
        debug!(
            "Coordinate limit {} (wire units)",
            validator.config().coordinate_limit
        );
        let driver = UwbDriver::new(source, sink, reader, validator, counters.clone());
        let stop = driver.stop_flag();
        let task = tokio::spawn(driver.run());

        Ok(Self {
            device: config.device.clone(),
            baud: config.baud,
            stop,
            counters,
            started_at: Instant::now(),
            task,
        })
    }

    /// Current health snapshot
    pub fn status(&self) -> DriverStatus {
        DriverStatus {
            device: self.device.clone(),
            baud: self.baud,
            running: !self.task.is_finished(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            counters: self.counters.snapshot(),
        }
    }

    /// Shared counters
    pub fn counters(&self) -> Arc<DriverCounters> {
        self.counters.clone()
    }

    /// Ask the loop to stop and wait for it to send the stop command
    pub async fn stop(self) -> DriverStatus {
        info!("Stopping UWB driver on {}", self.device);
        self.stop.store(true, Ordering::SeqCst);

        let DriverHandle {
            device,
            baud,
            counters,
            started_at,
            task,
            ..
        } = self;
        if let Err(e) = task.await {
            error!("UWB framing loop ended abnormally: {}", e);
        }

        DriverStatus {
            device,
            baud,
            running: false,
            uptime_secs: started_at.elapsed().as_secs(),
            counters: counters.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::sync::mpsc;
    use uwb_protocol::{PositionMessage, PositionReport};

    #[tokio::test(start_paused = true)]
    async fn test_spawn_status_stop() {
        let (near, mut far) = tokio::io::duplex(1024);
        let (tx, mut rx) = mpsc::channel::<PositionReport>(4);
        let config = DriverConfig::default();
        let handle =
            DriverHandle::spawn(near, tx, &config, Arc::new(DriverCounters::new())).unwrap();

        let msg = PositionMessage {
            status: 0,
            pos_x: 150,
            pos_y: 250,
            pos_z: -350,
        };
        far.write_all(&msg.encode()).await.unwrap();
        let report = rx.recv().await.unwrap();
        assert_eq!(report.pos_z, -3.5);
        assert_eq!(handle.counters().published(), 1);

        let status = handle.status();
        assert!(status.running);
        assert_eq!(status.device, "/dev/ttyS2");
        assert_eq!(status.counters.published, 1);

        let status = handle.stop().await;
        assert!(!status.running);
        assert_eq!(status.counters.published, 1);
        assert_eq!(status.counters.errors, status.counters.reads - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeouts_are_used() {
        let (near, _far) = tokio::io::duplex(1024);
        let (tx, _rx) = mpsc::channel::<PositionReport>(4);
        let config = DriverConfig {
            message_timeout_ms: 100,
            ..Default::default()
        };
        let handle =
            DriverHandle::spawn(near, tx, &config, Arc::new(DriverCounters::new())).unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(handle.status().counters.silent, 3);
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_baud_before_opening() {
        let (tx, _rx) = mpsc::channel::<PositionReport>(4);
        let config = DriverConfig::new("/dev/uwb-does-not-exist", 14400);
        assert!(matches!(
            DriverHandle::start(&config, tx),
            Err(UwbError::InvalidBaudRate(14400))
        ));
    }

    #[tokio::test]
    async fn test_start_reports_missing_device() {
        let (tx, _rx) = mpsc::channel::<PositionReport>(4);
        let config = DriverConfig::new("/dev/uwb-does-not-exist", 115200);
        assert!(matches!(
            DriverHandle::start(&config, tx),
            Err(UwbError::PortOpen { .. })
        ));
    }
}
