pub mod interface;
pub mod wifi;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

use crate::error::Result;

pub use interface::{InterfaceCandidate, InterfaceSelector, WirelessDetection};
pub use wifi::{ScanCommand, ScanResult};

/// Name of the local interface the daemon scans with. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceName(String);

impl InterfaceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InterfaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Something that can list the wireless networks visible from an interface.
pub trait NetworkScanner {
    fn scan_networks(
        &self,
        iface: &InterfaceName,
    ) -> impl Future<Output = Result<ScanResult>> + Send;
}
