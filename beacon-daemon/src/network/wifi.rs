/*!
 * WiFi Network Scanning
 * Runs the external scan utility and keeps its SSID lines in memory
 */

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::{InterfaceName, NetworkScanner};
use crate::config::ScanConfig;
use crate::error::{DetectError, Result};

const IFACE_PLACEHOLDER: &str = "{iface}";

/// Lines captured by one scan. Owned by the cycle that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    lines: Vec<String>,
}

impl ScanResult {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Splits raw tool output into lines, keeping those that contain `filter`.
    pub fn from_output(output: &str, filter: &str) -> Self {
        let lines = output
            .lines()
            .filter(|line| filter.is_empty() || line.contains(filter))
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines joined in order with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct ScanCommand {
    program: String,
    args: Vec<String>,
    line_filter: String,
    timeout: Duration,
    capture_path: Option<PathBuf>,
}

impl ScanCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let defaults = ScanConfig::default();
        Self {
            program: program.into(),
            args,
            timeout: defaults.timeout(),
            line_filter: defaults.line_filter,
            capture_path: None,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            line_filter: config.line_filter.clone(),
            timeout: config.timeout(),
            capture_path: config.capture_path.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_capture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.capture_path = Some(path.into());
        self
    }

    pub fn render_args(&self, iface: &InterfaceName) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(IFACE_PLACEHOLDER, iface.as_str()))
            .collect()
    }

    async fn run(&self, iface: &InterfaceName) -> Result<ScanResult> {
        let args = self.render_args(iface);
        tracing::debug!("Running {} {}", self.program, args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DetectError::scan_failed(format!("could not start {}: {}", self.program, e)))?;

        // The child is killed when the timed-out future drops it.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output
                .map_err(|e| DetectError::scan_failed(format!("{} failed: {}", self.program, e)))?,
            Err(_) => {
                return Err(DetectError::scan_failed(format!(
                    "{} did not finish within {}ms",
                    self.program,
                    self.timeout.as_millis()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DetectError::scan_failed(format!(
                "{} ended with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = ScanResult::from_output(&stdout, &self.line_filter);
        self.capture(&result).await;
        Ok(result)
    }

    async fn capture(&self, result: &ScanResult) {
        let Some(path) = &self.capture_path else {
            return;
        };
        if let Err(e) = tokio::fs::write(path, result.text()).await {
            tracing::warn!("Could not write scan capture to {}: {}", path.display(), e);
        }
    }
}

impl NetworkScanner for ScanCommand {
    fn scan_networks(
        &self,
        iface: &InterfaceName,
    ) -> impl std::future::Future<Output = Result<ScanResult>> + Send {
        self.run(iface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> ScanCommand {
        ScanCommand::new("/bin/sh", vec!["-c".to_string(), script.to_string()])
    }

    fn wlan0() -> InterfaceName {
        InterfaceName::new("wlan0")
    }

    #[test]
    fn filters_lines_without_marker() {
        let output = "wlan0     Scan completed :\n          ESSID:\"HomeNet\"\n          Quality=70/70\n          ESSID:\"PhoneArtifact42\"\n";
        let result = ScanResult::from_output(output, "SSID");
        assert_eq!(
            result.lines(),
            &["          ESSID:\"HomeNet\"", "          ESSID:\"PhoneArtifact42\""]
        );
    }

    #[test]
    fn empty_filter_keeps_every_line() {
        let result = ScanResult::from_output("a\nb\n", "");
        assert_eq!(result.text(), "a\nb");
    }

    #[test]
    fn new_takes_scan_defaults() {
        let command = ScanCommand::new("iwlist", vec![]);
        let defaults = ScanConfig::default();
        assert_eq!(command.line_filter, defaults.line_filter);
        assert_eq!(command.timeout, defaults.timeout());
        assert!(command.capture_path.is_none());
    }

    #[test]
    fn substitutes_interface_placeholder() {
        let command = ScanCommand::new("iwlist", vec!["{iface}".into(), "scan".into()]);
        assert_eq!(command.render_args(&wlan0()), vec!["wlan0", "scan"]);
    }

    #[tokio::test]
    async fn captures_filtered_stdout() {
        let command = sh("printf 'Cell 01\\nESSID:\"HomeNet\"\\nESSID:\"PhoneArtifact17\"\\n'");
        let result = command.scan_networks(&wlan0()).await.unwrap();
        assert_eq!(result.text(), "ESSID:\"HomeNet\"\nESSID:\"PhoneArtifact17\"");
    }

    #[tokio::test]
    async fn interface_reaches_the_tool() {
        let command = ScanCommand::new(
            "/bin/sh",
            vec!["-c".into(), "echo \"SSID: seen-on-$1\"".into(), "sh".into(), "{iface}".into()],
        );
        let result = command.scan_networks(&wlan0()).await.unwrap();
        assert_eq!(result.text(), "SSID: seen-on-wlan0");
    }

    #[tokio::test]
    async fn missing_program_fails_invocation() {
        let command = ScanCommand::new("/nonexistent/beacon-iwlist", vec![]);
        let err = command.scan_networks(&wlan0()).await.unwrap_err();
        assert!(matches!(err, DetectError::ScanInvocationFailed { .. }));
    }

    #[tokio::test]
    async fn non_zero_exit_fails_invocation() {
        let command = sh("echo 'SSID: PhoneArtifact17'; echo 'Interface doesn'\\''t support scanning' >&2; exit 255");
        let err = command.scan_networks(&wlan0()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("255"), "unexpected message: {}", message);
        assert!(message.contains("support scanning"), "unexpected message: {}", message);
    }

    #[tokio::test]
    async fn hung_tool_times_out() {
        let command = sh("sleep 5").with_timeout(Duration::from_millis(100));
        let started = std::time::Instant::now();
        let err = command.scan_networks(&wlan0()).await.unwrap_err();
        assert!(matches!(err, DetectError::ScanInvocationFailed { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn writes_capture_file() {
        let path = std::env::temp_dir().join(format!("beacon-capture-{}.txt", uuid::Uuid::new_v4()));
        let command = sh("echo 'SSID: HomeNet'").with_capture_path(&path);
        command.scan_networks(&wlan0()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "SSID: HomeNet");
        let _ = std::fs::remove_file(&path);
    }
}
