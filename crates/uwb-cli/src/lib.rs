//! UWB Driver Host
//!
//! Command-line front end: loads configuration, sets up logging and the
//! optional Prometheus endpoint, starts the driver and writes accepted
//! position reports to stdout as JSON lines.

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use uwb_driver::{DriverConfig, DriverHandle, DriverStatus};
use uwb_protocol::PositionReport;

/// Driver for UWB positioning modules. Publishes a position report
/// whenever the module has a position measurement available.
#[derive(Debug, Parser)]
#[command(name = "uwb", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the driver and run until SIGINT/SIGTERM (SIGUSR1 logs status)
    Start(StartArgs),
}

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Name of device for serial communication with UWB
    #[arg(short = 'd', long, value_name = "DEV")]
    pub device: Option<String>,

    /// Baud rate for serial communication with UWB
    #[arg(short = 'b', long)]
    pub baud: Option<u32>,

    /// Configuration file (defaults to ./uwb.toml if present)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Driver settings
    pub driver: DriverConfig,
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Prometheus listen address
    pub metrics_addr: Option<String>,
    /// Reports buffered between the driver and stdout
    pub report_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            log_level: "info".to_string(),
            log_json: false,
            metrics_addr: None,
            report_buffer: 64,
        }
    }
}

/// Load configuration: defaults, then file, then `UWB_*` environment, then flags
pub fn load_config(args: &StartArgs) -> Result<AppConfig> {
    let mut builder = Config::builder();
    builder = match &args.config {
        Some(path) => builder.add_source(File::from(path.as_path())),
        None => builder.add_source(File::with_name("uwb").required(false)),
    };

    let mut builder = builder
        .add_source(
            Environment::with_prefix("UWB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("driver.device", args.device.clone())?
        .set_override_option("driver.baud", args.baud.map(i64::from))?
        .set_override_option("metrics_addr", args.metrics_addr.map(|a| a.to_string()))?;
    if args.log_json {
        builder = builder.set_override("log_json", true)?;
    }

    let config: AppConfig = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;
    ensure!(config.report_buffer > 0, "report_buffer must be at least 1");
    Ok(config)
}

/// Initialize logging
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("Invalid log level {level:?}"))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set tracing subscriber")
}

/// Serve the driver counters for Prometheus
pub fn install_metrics(addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid metrics address {addr:?}"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!("Serving metrics on {}", addr);
    Ok(())
}

/// Write each report to `out` as one JSON line until the driver drops its sender
pub async fn write_reports<W>(mut rx: mpsc::Receiver<PositionReport>, mut out: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(report) = rx.recv().await {
        let mut line = serde_json::to_vec(&report)?;
        line.push(b'\n');
        out.write_all(&line).await?;
        out.flush().await?;
    }
    Ok(())
}

fn log_status(status: &DriverStatus) {
    match serde_json::to_string(status) {
        Ok(json) => info!("Status: {}", json),
        Err(e) => warn!("Failed to encode status: {}", e),
    }
}

/// What the host has been asked to do while the driver runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Stop the driver and exit
    Stop,
    /// Log a status snapshot
    Status,
}

/// Turn SIGINT/SIGTERM into `Stop` and SIGUSR1 into `Status`
#[cfg(unix)]
fn listen_for_requests() -> Result<mpsc::Receiver<HostRequest>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut status = signal(SignalKind::user_defined1())?;
    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        loop {
            let request = tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Failed to listen for ctrl-c: {}", e);
                    }
                    HostRequest::Stop
                }
                _ = terminate.recv() => HostRequest::Stop,
                _ = status.recv() => HostRequest::Status,
            };
            if tx.send(request).await.is_err() || request == HostRequest::Stop {
                break;
            }
        }
    });
    Ok(rx)
}

/// Turn ctrl-c into `Stop`
#[cfg(not(unix))]
fn listen_for_requests() -> Result<mpsc::Receiver<HostRequest>> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
        }
        let _ = tx.send(HostRequest::Stop).await;
    });
    Ok(rx)
}

/// Serve host requests until asked to stop or until the report writer ends,
/// then stop the driver and return its final status.
///
/// A writer that ends first (broken stdout, or a driver that quit) is an
/// error: the driver is stopped rather than left publishing into nothing.
pub async fn supervise(
    handle: DriverHandle,
    mut writer: JoinHandle<Result<()>>,
    mut requests: mpsc::Receiver<HostRequest>,
) -> Result<DriverStatus> {
    let writer_exit = loop {
        tokio::select! {
            request = requests.recv() => match request {
                Some(HostRequest::Status) => log_status(&handle.status()),
                Some(HostRequest::Stop) | None => break None,
            },
            result = &mut writer => break Some(result),
        }
    };

    if writer_exit.is_some() {
        error!("Report output closed, stopping UWB driver");
    }
    let status = handle.stop().await;
    log_status(&status);

    match writer_exit {
        None => writer.await.context("Report writer panicked")??,
        Some(result) => {
            result
                .context("Report writer panicked")?
                .context("Failed to write position reports")?;
            bail!("UWB driver stopped publishing reports");
        }
    }
    Ok(status)
}

async fn start(args: StartArgs) -> Result<()> {
    let config = load_config(&args)?;
    init_logging(&config.log_level, config.log_json)?;

    info!("=== UWB driver v{} ===", env!("CARGO_PKG_VERSION"));
    if let Some(addr) = &config.metrics_addr {
        install_metrics(addr)?;
    }

    let requests = listen_for_requests()?;
    let (tx, rx) = mpsc::channel(config.report_buffer);
    let writer = tokio::spawn(write_reports(rx, tokio::io::stdout()));

    let handle = DriverHandle::start(&config.driver, tx)
        .with_context(|| format!("Failed to start UWB driver on {}", config.driver.device))?;

    supervise(handle, writer, requests).await?;
    Ok(())
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Start(args) => start(args).await,
    }
}
