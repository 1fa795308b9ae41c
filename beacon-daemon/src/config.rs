use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DetectError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub detector: DetectorConfig,
    pub interface: InterfaceConfig,
    pub scan: ScanConfig,
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// SSID family to look for, without its two-character suffix.
    pub target_prefix: String,
    /// Scan cycles per second.
    pub poll_rate_hz: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Skip selection and use this interface.
    pub name: Option<String>,
    /// Where the kernel exposes per-interface wireless capability.
    pub sysfs_root: PathBuf,
    pub heuristic: NameHeuristic,
}

/// Naming fallback used when the capability query is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NameHeuristic {
    pub prefix: String,
    pub marker_index: Option<usize>,
    pub marker_char: Option<char>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub program: String,
    /// `{iface}` is replaced with the selected interface name.
    pub args: Vec<String>,
    /// Only output lines containing this marker are kept. Empty keeps everything.
    pub line_filter: String,
    pub timeout_ms: u64,
    /// Optional copy of each cycle's scan text for operators. Never read back.
    pub capture_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    pub channel: String,
    pub socket_path: Option<PathBuf>,
    pub buffer: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            target_prefix: "PhoneArtifact".to_string(),
            poll_rate_hz: 20.0,
        }
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            name: None,
            sysfs_root: PathBuf::from("/sys/class/net"),
            heuristic: NameHeuristic::default(),
        }
    }
}

impl Default for NameHeuristic {
    fn default() -> Self {
        Self {
            prefix: "w".to_string(),
            marker_index: Some(2),
            marker_char: Some('x'),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            program: "iwlist".to_string(),
            args: vec!["{iface}".to_string(), "scan".to_string()],
            line_filter: "SSID".to_string(),
            timeout_ms: 5000,
            capture_path: None,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            channel: "wifiAvailable".to_string(),
            socket_path: None,
            buffer: 1000,
        }
    }
}

impl DaemonConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() != ErrorKind::NotFound => {
                return Err(anyhow::anyhow!("cannot read {}: {}", path.display(), e));
            }
            Err(_) => {
                // Create default config if not found
                let config = Self::default();
                let _ = fs::write(path, toml::to_string_pretty(&config)?);
                config
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), DetectError> {
        if self.detector.target_prefix.is_empty() {
            return Err(DetectError::Config("detector.target_prefix must not be empty".into()));
        }
        let rate = self.detector.poll_rate_hz;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DetectError::Config(format!(
                "detector.poll_rate_hz must be a positive number, got {}",
                rate
            )));
        }
        match Duration::try_from_secs_f64(1.0 / rate) {
            Ok(period) if !period.is_zero() => {}
            _ => {
                return Err(DetectError::Config(format!(
                    "detector.poll_rate_hz {} gives no usable poll period",
                    rate
                )))
            }
        }
        if self.scan.program.trim().is_empty() {
            return Err(DetectError::Config("scan.program must not be empty".into()));
        }
        if self.scan.timeout_ms == 0 {
            return Err(DetectError::Config("scan.timeout_ms must be greater than zero".into()));
        }
        if self.publish.buffer == 0 {
            return Err(DetectError::Config("publish.buffer must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.detector.poll_rate_hz)
    }
}

impl ScanConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
