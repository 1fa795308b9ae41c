/*!
 * BEACON Phone-Hotspot Detection
 * Onyx Digital Intelligence Development LLC
 */

pub mod config;
pub mod error;
pub mod ipc;
pub mod matcher;
pub mod monitor;
pub mod network;
pub mod publish;

pub use config::DaemonConfig;
pub use error::DetectError;
pub use matcher::{find_target_network, MatchedNetwork, TargetPrefix};
pub use monitor::{Monitor, MonitorState};
pub use network::{InterfaceName, InterfaceSelector, NetworkScanner, ScanCommand, ScanResult};
pub use publish::{BroadcastPublisher, Fanout, LogPublisher, Publisher, Report, ReportStatus};
