//! Relay server that lists itself on a master server.
//!
//! Demonstrates the advertiser in a host process:
//! - The server owns its user list; the advertiser pulls a snapshot per heartbeat
//! - Ctrl-C withdraws the listing before exiting
//!
//! Run against a config file:
//!   cargo run -p masterlist-demo-relay -- --config masterlist.toml
//!
//! Or with flags only:
//!   cargo run -p masterlist-demo-relay -- --name "My Relay" --directory-host api.example.org
//!
//! Then connect and send a name as the first line:
//!   nc localhost 12000

mod lobby;
mod server;

use clap::Parser;
use lobby::Lobby;
use masterlist_client::{
    AdvertiserHandle, Advertiser, DirectorySection, HttpTransport, MasterlistConfig, ServerSection,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "relay", version, about = "Relay server advertised on a master server")]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(short, long, env = "MASTERLIST_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Server name shown in the list
    #[arg(short, long)]
    name: Option<String>,

    /// Public address to advertise (looked up when omitted)
    #[arg(long)]
    ip: Option<String>,

    /// Master server host
    #[arg(long, env = "MASTERLIST_HOST")]
    directory_host: Option<String>,

    /// Run without listing on the master server
    #[arg(long)]
    no_advertise: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<MasterlistConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading config from {:?}", path);
                MasterlistConfig::from_file(path)?
            }
            None => {
                let host = self.directory_host.clone().ok_or_else(|| {
                    anyhow::anyhow!("either --config or --directory-host is required")
                })?;
                let name = self.name.clone().unwrap_or_else(|| "Relay".to_string());
                MasterlistConfig::new(ServerSection::new(name), DirectorySection::new(host))
            }
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(name) = &self.name {
            config.server.name = name.clone();
        }
        if let Some(ip) = &self.ip {
            config.server.ip = Some(ip.clone());
        }
        if let Some(host) = &self.directory_host {
            config.directory.host = host.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("relay=info".parse()?)
                .add_directive("masterlist_client=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    let lobby = Arc::new(RwLock::new(Lobby::new(config.server.max_clients)));

    tracing::info!(
        "Starting '{}' on port {}, directory {}",
        config.server.name,
        config.server.port,
        config.directory.base_url()
    );

    // The blocking HTTP client must be created and dropped off the runtime.
    let advertiser = {
        let config = config.clone();
        let lobby = lobby.clone();
        let advertise = !args.no_advertise;
        tokio::task::spawn_blocking(move || -> anyhow::Result<AdvertiserHandle> {
            let transport = HttpTransport::new(&config.directory)?;
            let users = move || lobby.blocking_read().snapshot();
            let handle = Advertiser::new(transport, &config, users).spawn()?;
            if advertise {
                handle.activate();
            }
            Ok(handle)
        })
        .await??
    };

    let addr: SocketAddr = ([0, 0, 0, 0], config.server.port).into();
    let result = tokio::select! {
        result = server::run(addr, lobby) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, withdrawing listing...");
            Ok(())
        }
    };

    let status = tokio::task::spawn_blocking(move || advertiser.shutdown()).await?;
    tracing::info!(
        "Relay stopped (registered: {}, failures: {})",
        status.registered,
        status.failures
    );
    result
}
