/*!
 * Poll/Report Loop
 * One scan cycle per tick, never two at once
 */

use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use uuid::Uuid;

use crate::matcher::{find_target_network, TargetPrefix};
use crate::network::{InterfaceName, NetworkScanner};
use crate::publish::{Publisher, Report, ReportStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Cycling,
}

pub struct Monitor<S, P> {
    iface: InterfaceName,
    prefix: TargetPrefix,
    channel: String,
    period: Duration,
    node: Uuid,
    scanner: S,
    publisher: P,
    cycles: u64,
    state: MonitorState,
}

impl<S: NetworkScanner, P: Publisher> Monitor<S, P> {
    pub fn new(
        iface: InterfaceName,
        prefix: TargetPrefix,
        period: Duration,
        scanner: S,
        publisher: P,
    ) -> Self {
        Self {
            iface,
            prefix,
            channel: "wifiAvailable".to_string(),
            period,
            node: Uuid::new_v4(),
            scanner,
            publisher,
            cycles: 0,
            state: MonitorState::Idle,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn node(&self) -> Uuid {
        self.node
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    fn set_state(&mut self, state: MonitorState) {
        tracing::trace!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Scan, match, publish and log once.
    pub async fn run_cycle(&mut self) -> Report {
        self.set_state(MonitorState::Cycling);
        self.cycles += 1;

        let (ssid, status) = match self.scanner.scan_networks(&self.iface).await {
            Ok(result) if result.is_empty() => {
                tracing::debug!("scan on {} returned no SSID lines", self.iface);
                tracing::info!("{} not found", self.prefix);
                (String::new(), ReportStatus::NotFound)
            }
            Ok(result) => match find_target_network(&result, &self.prefix) {
                Some(network) => {
                    tracing::info!("found {}", network);
                    (network.into_string(), ReportStatus::Found)
                }
                None => {
                    tracing::info!("{} not found", self.prefix);
                    (String::new(), ReportStatus::NotFound)
                }
            },
            Err(e) => {
                tracing::warn!("cycle {}: {}", self.cycles, e);
                (String::new(), ReportStatus::ScanFailed)
            }
        };

        let report = Report {
            channel: self.channel.clone(),
            ssid,
            status,
            cycle: self.cycles,
            timestamp: Utc::now(),
            node: self.node,
        };
        self.publisher.publish(&report);

        self.set_state(MonitorState::Idle);
        report
    }

    /// Runs cycles at the configured period until `shutdown` resolves.
    ///
    /// A cycle that overruns the period delays the next tick rather than
    /// stacking ticks up. Shutdown abandons the cycle in flight.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(
            "Watching {} for {} every {}ms",
            self.iface,
            self.prefix,
            self.period.as_millis()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Abandoning cycle {} for shutdown", self.cycles);
                    break;
                }
                _ = self.run_cycle() => {}
            }
        }

        self.set_state(MonitorState::Idle);
        tracing::info!("Monitor stopped after {} cycle(s)", self.cycles);
    }
}
