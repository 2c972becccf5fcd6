//! Report Sink

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uwb_protocol::PositionReport;

/// Consumer of accepted position reports
///
/// `publish` is called from the framing loop and must not block.
pub trait ReportSink: Send {
    /// Hand over one report
    fn publish(&mut self, report: PositionReport);
}

impl ReportSink for mpsc::Sender<PositionReport> {
    fn publish(&mut self, report: PositionReport) {
        match self.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("Report channel full, dropping report"),
            Err(TrySendError::Closed(_)) => warn!("Report receiver dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(timestamp: u64) -> PositionReport {
        PositionReport {
            timestamp,
            pos_x: 1.0,
            pos_y: 2.0,
            pos_z: 3.0,
        }
    }

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (mut tx, mut rx) = mpsc::channel(4);
        tx.publish(report(1));
        assert_eq!(rx.recv().await, Some(report(1)));
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_blocking() {
        let (mut tx, mut rx) = mpsc::channel(1);
        tx.publish(report(1));
        tx.publish(report(2));
        assert_eq!(rx.recv().await, Some(report(1)));
        assert!(rx.try_recv().is_err());
    }
}
