//! Framing Loop

use crate::clock::monotonic_micros;
use crate::counters::DriverCounters;
use crate::sink::ReportSink;
use frame_validator::FrameValidator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uwb_protocol::{send_command, ByteSource, FrameReader, PositionReport, RangingCommand};

/// Owns the byte source for the lifetime of one driver run
pub struct UwbDriver<S, K> {
    source: S,
    sink: K,
    reader: FrameReader,
    validator: FrameValidator,
    counters: Arc<DriverCounters>,
    stop: Arc<AtomicBool>,
}

impl<S, K> UwbDriver<S, K>
where
    S: ByteSource,
    K: ReportSink,
{
    /// Create a driver over `source` publishing into `sink`
    pub fn new(
        source: S,
        sink: K,
        reader: FrameReader,
        validator: FrameValidator,
        counters: Arc<DriverCounters>,
    ) -> Self {
        Self {
            source,
            sink,
            reader,
            validator,
            counters,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends the loop once the current framing attempt finishes
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Run until the stop flag is set, then release the byte source
    pub async fn run(mut self) {
        info!("Starting UWB framing loop");
        send_command(&mut self.source, RangingCommand::PureRanging).await;

        while !self.stop.load(Ordering::SeqCst) {
            self.poll_once().await;
        }

        send_command(&mut self.source, RangingCommand::StopRanging).await;
        info!(
            "UWB framing loop stopped after {} attempts",
            self.reader.attempts()
        );
    }

    /// Run one framing attempt and publish or count its result
    async fn poll_once(&mut self) {
        let frame = self.reader.read_frame(&mut self.source).await;
        self.counters.record_read();

        match self.validator.validate(&frame) {
            Ok(msg) => {
                let report = PositionReport::from_message(&msg, monotonic_micros());
                self.sink.publish(report);
                self.counters.record_published();
            }
            Err(reason) => {
                self.counters.record_error();
                if reason.is_silence() {
                    self.counters.record_silent();
                    warn!("UWB module is not responding.");
                } else {
                    debug!("Rejected frame: {}", reason);
                }
            }
        }
    }
}
