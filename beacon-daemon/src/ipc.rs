/*!
 * IPC Server for BEACON Daemon
 * JSON report stream over Unix socket
 */

use anyhow::Result;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::publish::{BroadcastPublisher, Report};

pub struct IpcServer {
    listener: UnixListener,
    publisher: BroadcastPublisher,
}

impl IpcServer {
    pub fn new(listener: UnixListener, publisher: BroadcastPublisher) -> Self {
        Self { listener, publisher }
    }

    /// Binds `path`, replacing a socket file left behind by an earlier run.
    pub fn bind(path: &Path, publisher: BroadcastPublisher) -> Result<Self> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let listener = UnixListener::bind(path)?;
        Ok(Self::new(listener, publisher))
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!("IPC server listening for report subscribers...");

        loop {
            match self.listener.accept().await {
                Ok((stream, _)) => {
                    tracing::debug!("New subscriber connected");
                    let reports = self.publisher.subscribe();

                    tokio::spawn(async move {
                        if let Err(e) = stream_reports(stream, reports).await {
                            tracing::debug!("Subscriber dropped: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

async fn stream_reports(mut stream: UnixStream, mut reports: broadcast::Receiver<Report>) -> Result<()> {
    loop {
        let report = match reports.recv().await {
            Ok(report) => report,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Subscriber lagging, skipped {} report(s)", skipped);
                continue;
            }
            Err(RecvError::Closed) => return Ok(()),
        };

        let mut line = serde_json::to_vec(&report)?;
        line.push(b'\n');
        stream.write_all(&line).await?;
    }
}
