//! Govee hygrometer bridge - diagnostic entry point
//!
//! Runs the bridge's discovery and read paths against the real vendor API
//! without a host platform attached.

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::future::join_all;
use govee_hygrometer::{
    client::{GoveeApi, GoveeHttpClient},
    discovery::DeviceDirectory,
    logging::{init_logging, LogConfig},
    services::ReadingFetcher,
    BridgeConfig, DeviceDescriptor, GoveePlatform, InMemoryRegistry, LaunchSignal,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

/// Govee hygrometer bridge
#[derive(Parser, Debug)]
#[command(name = "govee-hygrometer")]
#[command(about = "Read Govee thermo-hygrometers through the Govee cloud API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Govee API key (overrides the configuration file)
    #[arg(long, global = true, env = "GOVEE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List devices on the account
    List,
    /// Fetch one reading
    Read {
        /// Device model (SKU), e.g. H5179
        #[arg(long)]
        model: String,
        /// Device address as shown by `list`
        #[arg(long)]
        address: String,
    },
    /// Fetch readings for every device on the account
    ReadAll,
    /// Run one discovery cycle against an empty registry and print the report
    Sync,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::from_env()?,
        };
        if let Some(api_key) = &self.api_key {
            config.govee.api_key = api_key.clone();
        }
        config.validate()?;
        Ok(config)
    }

    fn initialize_logging(&self, config: &BridgeConfig) -> anyhow::Result<()> {
        let mut log_config = LogConfig::from_settings(&config.logging);
        let env_config = LogConfig::from_env();
        if env_config.file_path.is_some() {
            log_config.file_path = env_config.file_path;
        }
        log_config.stderr = env_config.stderr;
        if self.debug {
            log_config.level = Level::DEBUG;
        }
        init_logging(log_config).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("Invalid configuration")?;
    cli.initialize_logging(&config)?;

    match cli.command {
        Command::List => {
            let api: Arc<dyn GoveeApi> = Arc::new(GoveeHttpClient::new(&config.govee)?);
            let devices = DeviceDirectory::new(api).discover_devices().await;
            for device in &devices {
                println!("{}\t{}\t{}", device.model, device.address, device.display_name);
            }
            info!("{} device(s)", devices.len());
        }
        Command::Read { model, address } => {
            let api: Arc<dyn GoveeApi> = Arc::new(GoveeHttpClient::new(&config.govee)?);
            let fetcher = ReadingFetcher::new(api);
            let descriptor = DeviceDescriptor::new(model, address.clone(), address);
            let reading = fetcher.fetch_reading(&descriptor).await?;
            println!("{}", serde_json::to_string_pretty(&reading)?);
        }
        Command::ReadAll => {
            let api: Arc<dyn GoveeApi> = Arc::new(GoveeHttpClient::new(&config.govee)?);
            let devices = DeviceDirectory::new(api.clone()).discover_devices().await;
            let fetcher = ReadingFetcher::new(api);
            let readings = join_all(devices.iter().map(|device| fetcher.fetch_reading(device))).await;

            for (device, reading) in devices.iter().zip(readings) {
                match reading {
                    Ok(reading) => println!(
                        "{}\t{:.2} C\t{:.2} %",
                        device.display_name,
                        reading.temperature_celsius,
                        reading.relative_humidity_percent
                    ),
                    Err(e) => println!("{}\tnot responding: {}", device.display_name, e.sanitized_message()),
                }
            }
        }
        Command::Sync => {
            let registry = Arc::new(InMemoryRegistry::new());
            let platform = GoveePlatform::from_config(&config, registry)?;
            let launch = LaunchSignal::new();
            launch.fire();
            let report = platform.run(&launch).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
