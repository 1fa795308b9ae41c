use beacon_daemon::{
    BroadcastPublisher, InterfaceName, Monitor, ReportStatus, ScanCommand, TargetPrefix,
};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log output so tests can inspect status lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/*************************************************************
                 End-to-end scan cycle scenarios
**************************************************************/

fn printing(text: &str) -> ScanCommand {
    ScanCommand::new(
        "/bin/sh",
        vec!["-c".into(), "printf '%s' \"$1\"".into(), "sh".into(), text.to_string()],
    )
}

fn detector(scanner: ScanCommand) -> (Monitor<ScanCommand, BroadcastPublisher>, BroadcastPublisher) {
    let publisher = BroadcastPublisher::new(16);
    let monitor = Monitor::new(
        InterfaceName::new("wlx00c0ca9a1b2c"),
        TargetPrefix::new("PhoneArtifact").unwrap(),
        Duration::from_millis(20),
        scanner,
        publisher.clone(),
    );
    (monitor, publisher)
}

#[tokio::test]
async fn reports_phone_network_when_visible() {
    let (mut monitor, publisher) = detector(printing("SSID: PhoneArtifact17\nSSID: HomeNet"));
    let mut reports = publisher.subscribe();

    let report = monitor.run_cycle().await;
    assert_eq!(report.ssid, "PhoneArtifact17");
    assert_eq!(reports.recv().await.unwrap(), report);
}

#[tokio::test]
async fn reports_empty_when_phone_absent() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (mut monitor, _publisher) = detector(printing("SSID: HomeNet\nSSID: OfficeNet"));
    let report = monitor.run_cycle().await;
    assert_eq!(report.ssid, "");
    assert_eq!(report.status, ReportStatus::NotFound);

    let output = logs.contents();
    assert!(output.contains("PhoneArtifact not found"), "log was: {}", output);
}

#[tokio::test]
async fn prefix_without_suffix_is_not_found() {
    let (mut monitor, _publisher) = detector(printing("SSID: HomeNet\nSSID: PhoneArtifact"));
    let report = monitor.run_cycle().await;
    assert_eq!(report.ssid, "");
    assert_eq!(report.status, ReportStatus::NotFound);
}

#[tokio::test]
async fn only_ssid_lines_are_matched() {
    // "PhoneArtifact" in a non-SSID line is filtered out before matching
    let (mut monitor, _publisher) = detector(printing(
        "Extra: PhoneArtifact99\nSSID: HomeNet\nSSID: PhoneArtifact03",
    ));
    let report = monitor.run_cycle().await;
    assert_eq!(report.ssid, "PhoneArtifact03");
}

#[tokio::test]
async fn unlaunchable_scanner_reports_empty_and_keeps_polling() {
    let scanner = ScanCommand::new("/nonexistent/beacon-iwlist", vec!["{iface}".into(), "scan".into()]);
    let (mut monitor, publisher) = detector(scanner);
    let mut reports = publisher.subscribe();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        while seen.len() < 3 {
            seen.push(reports.recv().await.unwrap());
        }
        let _ = tx.send(());
        seen
    });

    monitor
        .run(async move {
            let _ = rx.await;
        })
        .await;

    let seen = collector.await.unwrap();
    assert_eq!(seen.len(), 3);
    for (index, report) in seen.iter().enumerate() {
        assert_eq!(report.ssid, "");
        assert_eq!(report.status, ReportStatus::ScanFailed);
        assert_eq!(report.cycle, index as u64 + 1);
    }
    assert!(monitor.cycles() >= 3);
}

#[tokio::test]
async fn slow_scans_do_not_overlap() {
    // each scan outlasts the 20ms period
    let scanner = ScanCommand::new(
        "/bin/sh",
        vec!["-c".into(), "sleep 0.05; echo 'SSID: PhoneArtifact21'".into()],
    );
    let (mut monitor, publisher) = detector(scanner);
    let mut reports = publisher.subscribe();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let collector = tokio::spawn(async move {
        let mut stamps = Vec::new();
        while stamps.len() < 3 {
            stamps.push(reports.recv().await.unwrap().timestamp);
        }
        let _ = tx.send(());
        stamps
    });

    monitor
        .run(async move {
            let _ = rx.await;
        })
        .await;

    let stamps = collector.await.unwrap();
    for pair in stamps.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap.num_milliseconds() >= 40, "cycles overlapped: {:?}", gap);
    }
}
