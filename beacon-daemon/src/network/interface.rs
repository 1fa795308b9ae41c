/*!
 * Wireless Interface Selection
 * Kernel capability query first, configurable naming heuristic as fallback
 */

use nix::ifaddrs::getifaddrs;
use nix::sys::socket::{AddressFamily, SockaddrLike};
use std::path::{Path, PathBuf};

use super::InterfaceName;
use crate::config::{InterfaceConfig, NameHeuristic};
use crate::error::{DetectError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

/// An interface that has at least one IPv4 or IPv6 address assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCandidate {
    pub name: String,
    pub families: Vec<IpFamily>,
}

impl InterfaceCandidate {
    pub fn new(name: impl Into<String>, families: &[IpFamily]) -> Self {
        Self {
            name: name.into(),
            families: families.to_vec(),
        }
    }
}

/// How wireless capability is decided on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirelessDetection {
    /// `<sysfs_root>/<iface>/wireless` or `phy80211` marks a radio.
    Capability,
    /// No capability query available; names are matched instead.
    Heuristic,
}

/// Enumerates address-bearing interfaces in OS order, one entry per interface.
pub fn enumerate_interfaces() -> Result<Vec<InterfaceCandidate>> {
    let mut candidates: Vec<InterfaceCandidate> = Vec::new();

    for ifaddr in getifaddrs()? {
        let family = match ifaddr.address.as_ref().and_then(|addr| addr.family()) {
            Some(AddressFamily::Inet) => IpFamily::V4,
            Some(AddressFamily::Inet6) => IpFamily::V6,
            _ => continue,
        };

        match candidates.iter_mut().find(|c| c.name == ifaddr.interface_name) {
            Some(existing) => {
                if !existing.families.contains(&family) {
                    existing.families.push(family);
                }
            }
            None => candidates.push(InterfaceCandidate::new(ifaddr.interface_name, &[family])),
        }
    }

    Ok(candidates)
}

impl NameHeuristic {
    pub fn matches(&self, name: &str) -> bool {
        if !name.starts_with(&self.prefix) {
            return false;
        }
        match (self.marker_index, self.marker_char) {
            (Some(index), Some(marker)) => name.chars().nth(index) == Some(marker),
            _ => true,
        }
    }
}

pub struct InterfaceSelector {
    sysfs_root: PathBuf,
    heuristic: NameHeuristic,
    preferred: Option<String>,
}

impl InterfaceSelector {
    pub fn new(sysfs_root: impl Into<PathBuf>, heuristic: NameHeuristic) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            heuristic,
            preferred: None,
        }
    }

    pub fn from_config(config: &InterfaceConfig) -> Self {
        Self {
            sysfs_root: config.sysfs_root.clone(),
            heuristic: config.heuristic.clone(),
            preferred: config.name.clone(),
        }
    }

    pub fn with_preferred(mut self, name: impl Into<String>) -> Self {
        self.preferred = Some(name.into());
        self
    }

    pub fn detection(&self) -> WirelessDetection {
        if self.sysfs_root.is_dir() {
            WirelessDetection::Capability
        } else {
            WirelessDetection::Heuristic
        }
    }

    pub fn is_wireless(&self, name: &str) -> bool {
        match self.detection() {
            WirelessDetection::Capability => has_wireless_capability(&self.sysfs_root, name),
            WirelessDetection::Heuristic => self.heuristic.matches(name),
        }
    }

    /// Queries the OS and picks the wireless interface.
    pub fn select_wireless_interface(&self) -> Result<InterfaceName> {
        let candidates = enumerate_interfaces()?;
        self.select(&candidates)
    }

    /// Picks the first wireless candidate, or the configured override if present.
    pub fn select(&self, candidates: &[InterfaceCandidate]) -> Result<InterfaceName> {
        if candidates.is_empty() {
            return Err(DetectError::no_interface("no interface has an IPv4 or IPv6 address"));
        }

        if let Some(preferred) = &self.preferred {
            if !candidates.iter().any(|c| &c.name == preferred) {
                return Err(DetectError::no_interface(format!(
                    "configured interface {} has no assigned address",
                    preferred
                )));
            }
            if !self.is_wireless(preferred) {
                tracing::warn!("Configured interface {} does not look wireless, using it anyway", preferred);
            }
            return Ok(InterfaceName::new(preferred.clone()));
        }

        let detection = self.detection();
        match candidates.iter().find(|c| self.is_wireless(&c.name)) {
            Some(candidate) => {
                tracing::info!("Selecting interface {} ({:?} detection)", candidate.name, detection);
                Ok(InterfaceName::new(candidate.name.clone()))
            }
            None => Err(DetectError::no_interface(format!(
                "none of {} address-bearing interface(s) is wireless ({:?} detection)",
                candidates.len(),
                detection
            ))),
        }
    }
}

fn has_wireless_capability(sysfs_root: &Path, name: &str) -> bool {
    let device = sysfs_root.join(name);
    device.join("wireless").exists() || device.join("phy80211").exists()
}
