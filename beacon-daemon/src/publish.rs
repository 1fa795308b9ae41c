/*!
 * Report Publishing
 * Fire-and-forget delivery of one report per scan cycle
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Found,
    NotFound,
    ScanFailed,
}

/// What a cycle publishes. `ssid` is empty unless the target network was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub channel: String,
    pub ssid: String,
    pub status: ReportStatus,
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub node: Uuid,
}

impl Report {
    pub fn is_found(&self) -> bool {
        self.status == ReportStatus::Found
    }
}

/// Publishing must not block the poll loop. Implementations buffer or drop.
pub trait Publisher: Send + Sync {
    fn publish(&self, report: &Report);
}

/// Bounded broadcast channel. Lagging receivers lose the oldest reports.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<Report>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Report> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Publisher for BroadcastPublisher {
    fn publish(&self, report: &Report) {
        // no subscribers is fine
        let _ = self.sender.send(report.clone());
    }
}

/// Echoes the payload to the operational log.
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&self, report: &Report) {
        tracing::info!(channel = %report.channel, "{}", report.ssid);
    }
}

#[derive(Default)]
pub struct Fanout {
    targets: Vec<Box<dyn Publisher>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, publisher: impl Publisher + 'static) -> Self {
        self.targets.push(Box::new(publisher));
        self
    }
}

impl Publisher for Fanout {
    fn publish(&self, report: &Report) {
        for target in &self.targets {
            target.publish(report);
        }
    }
}
