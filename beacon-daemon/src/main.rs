/*!
 * BEACON Detection Daemon
 * Watches for the phone artifact hotspot and reports it every cycle
 * Onyx Digital Intelligence Development LLC
 */

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use beacon_daemon::ipc::IpcServer;
use beacon_daemon::network::interface::enumerate_interfaces;
use beacon_daemon::{
    BroadcastPublisher, DaemonConfig, Fanout, InterfaceName, InterfaceSelector, LogPublisher,
    Monitor, ScanCommand, TargetPrefix,
};

#[derive(Parser)]
#[command(name = "beacond")]
#[command(about = "BEACON phone-hotspot SSID detection daemon")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "/etc/beacon/beacond.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detection loop
    Run,
    /// Run a single scan cycle and print the report
    Once,
    /// List interfaces and which one would be selected
    Interfaces,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("beacon_daemon={0},beacond={0}", log_level))
        .with_writer(std::io::stderr)
        .init();

    let config = DaemonConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_daemon(config).await,
        Commands::Once => run_once(config).await,
        Commands::Interfaces => list_interfaces(config),
    }
}

fn select_interface(config: &DaemonConfig) -> Result<InterfaceName> {
    let selector = InterfaceSelector::from_config(&config.interface);
    match selector.select_wireless_interface() {
        Ok(iface) => Ok(iface),
        Err(e) => {
            error!("Did not read wireless interface name, terminating: {}", e);
            Err(e.into())
        }
    }
}

async fn run_daemon(config: DaemonConfig) -> Result<()> {
    info!("BEACON detection daemon starting...");

    let iface = select_interface(&config)?;
    let prefix = TargetPrefix::new(config.detector.target_prefix.clone())?;

    let broadcast = BroadcastPublisher::new(config.publish.buffer);
    if let Some(socket_path) = &config.publish.socket_path {
        let server = IpcServer::bind(socket_path, broadcast.clone())?;
        info!("Streaming reports on socket: {}", socket_path.display());
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("IPC server stopped: {}", e);
            }
        });
    }

    let publisher = Fanout::new().with(broadcast).with(LogPublisher);
    let mut monitor = Monitor::new(
        iface,
        prefix,
        config.poll_period(),
        ScanCommand::from_config(&config.scan),
        publisher,
    )
    .with_channel(config.publish.channel.clone());

    info!("Node {} publishing on channel {}", monitor.node(), config.publish.channel);
    monitor.run(shutdown_signal()).await;

    if let Some(socket_path) = &config.publish.socket_path {
        let _ = std::fs::remove_file(socket_path);
    }
    Ok(())
}

async fn run_once(config: DaemonConfig) -> Result<()> {
    let iface = select_interface(&config)?;
    let prefix = TargetPrefix::new(config.detector.target_prefix.clone())?;

    let mut monitor = Monitor::new(
        iface,
        prefix,
        config.poll_period(),
        ScanCommand::from_config(&config.scan),
        LogPublisher,
    )
    .with_channel(config.publish.channel.clone());

    let report = monitor.run_cycle().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn list_interfaces(config: DaemonConfig) -> Result<()> {
    let selector = InterfaceSelector::from_config(&config.interface);
    let candidates = enumerate_interfaces()?;

    println!("Wireless detection: {:?}", selector.detection());
    for candidate in &candidates {
        let kind = if selector.is_wireless(&candidate.name) { "wireless" } else { "-" };
        println!("  {:<16} {:<10} {:?}", candidate.name, kind, candidate.families);
    }

    match selector.select(&candidates) {
        Ok(iface) => println!("Selected: {}", iface),
        Err(e) => println!("Selected: none ({})", e),
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Could not install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown requested");
}
