/*!
 * BEACON Error Taxonomy
 * Startup failures are fatal, scan failures are absorbed per cycle
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    /// No address-bearing interface qualified as wireless.
    #[error("no wireless interface found: {reason}")]
    NoInterfaceFound { reason: String },

    /// The OS refused to enumerate interface addresses.
    #[error("interface enumeration failed: {0}")]
    InterfaceQuery(#[from] nix::Error),

    /// The external scan utility could not be started, timed out, or exited unsuccessfully.
    #[error("scan invocation failed: {reason}")]
    ScanInvocationFailed { reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DetectError {
    pub fn no_interface(reason: impl Into<String>) -> Self {
        Self::NoInterfaceFound { reason: reason.into() }
    }

    pub fn scan_failed(reason: impl Into<String>) -> Self {
        Self::ScanInvocationFailed { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, DetectError>;
