//! Binary that converges this node by reading hook names from stdin.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ensemble_host::{LocalHost, LocalHostOptions};
use ensemble_keeper::{Agent, Event, KeeperContext, KeeperContextOptions, Result, Settings};
use ensemble_membership::MembershipStore;
use ensemble_peers::{FileTransport, PeerReconciler};
use ensemble_probe::FourLetterWordClient;
use ensemble_render::TemplateRenderer;
use ensemble_service::SystemdService;
use ensemble_store_fs::FsStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Deployment unit name, `<application>/<ordinal>`
    #[arg(long, env = "JUJU_UNIT_NAME")]
    unit_name: String,

    /// Directory for membership state, status and relation files
    #[arg(long, default_value = "/var/lib/ensemble-keeper")]
    state_dir: PathBuf,

    /// JSON settings file; defaults apply when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory holding deployment resources (defaults to `<state-dir>/resources`)
    #[arg(long)]
    resources_dir: Option<PathBuf>,

    /// Address to advertise to peers and clients
    #[arg(long)]
    ingress_address: Option<IpAddr>,

    /// Seconds between periodic re-evaluations
    #[arg(long, default_value_t = 30)]
    tick_interval_secs: u64,

    /// Maximum log level
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(args.log_level)
            .finish(),
    )?;

    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    info!(
        "starting {} with {:?} gating",
        args.unit_name, settings.gating_policy
    );

    let host = Arc::new(LocalHost::new(LocalHostOptions {
        ingress_address: args.ingress_address,
        resources_dir: args
            .resources_dir
            .unwrap_or_else(|| args.state_dir.join("resources")),
        state_dir: args.state_dir.clone(),
    }));

    let transport = FileTransport::new(
        args.state_dir.join("peers.json"),
        args.state_dir.join("client-endpoint.json"),
    );

    let context = KeeperContext::new(KeeperContextOptions {
        host: host.clone(),
        membership: MembershipStore::new(FsStore::new(args.state_dir.join("kv"))),
        port_opener: host.clone(),
        prober: Arc::new(FourLetterWordClient::default()),
        reconciler: PeerReconciler::new(Arc::new(transport)),
        renderer: Arc::new(TemplateRenderer::new(host)),
        service: Arc::new(SystemdService::new(settings.service_name.clone())),
        settings,
        unit_name: args.unit_name,
    });

    let mut agent = Agent::new(context);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticker = tokio::time::interval(Duration::from_secs(args.tick_interval_secs));

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<Event>() {
                    Ok(event) => {
                        agent.dispatch(event).await;
                    }
                    Err(e) => warn!("{}", e),
                },
                Ok(None) => {
                    info!("event stream closed, continuing on ticks");
                    stdin_open = false;
                }
                Err(e) => {
                    error!("failed to read event stream: {}", e);
                    stdin_open = false;
                }
            },
            _ = ticker.tick() => {
                agent.dispatch(Event::Tick).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
