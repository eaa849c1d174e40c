mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tierchain_core::config::Config;
use tierchain_core::outcome::RandomOutcomes;
use tierchain_service::AppState;
use tierchain_service::server::run_service;

use crate::telemetry::{init_logging, init_tracer};

#[derive(Parser, Debug)]
#[command(name = "tierchain")]
#[command(about = "Three-tier traced call chain demo")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Serve the tier picked by the service name (default)")]
    Run(Overrides),
    #[command(about = "Print the resolved configuration as JSON")]
    Config(Overrides),
}

#[derive(Args, Debug, Default)]
struct Overrides {
    #[arg(long, help = "service-a, service-b or service-c")]
    service_name: Option<String>,
    #[arg(long)]
    service_a_port: Option<u16>,
    #[arg(long)]
    service_b_port: Option<u16>,
    #[arg(long)]
    service_c_port: Option<u16>,
    #[arg(long)]
    otlp_endpoint: Option<String>,
    #[arg(long)]
    bind_host: Option<String>,
    #[arg(long)]
    downstream_host: Option<String>,
}

impl Overrides {
    fn apply(self, cfg: &mut Config) {
        if let Some(v) = self.service_name {
            cfg.service_name = v;
        }
        if let Some(v) = self.service_a_port {
            cfg.service_a_port = v;
        }
        if let Some(v) = self.service_b_port {
            cfg.service_b_port = v;
        }
        if let Some(v) = self.service_c_port {
            cfg.service_c_port = v;
        }
        if let Some(v) = self.otlp_endpoint {
            cfg.otlp_endpoint = v;
        }
        if let Some(v) = self.bind_host {
            cfg.bind_host = v;
        }
        if let Some(v) = self.downstream_host {
            cfg.downstream_host = v;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::Run(Overrides::default())) {
        Commands::Run(overrides) => run_server(resolve_config(overrides)?).await,
        Commands::Config(overrides) => {
            let cfg = resolve_config(overrides)?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(())
        }
    }
}

fn resolve_config(overrides: Overrides) -> anyhow::Result<Config> {
    let mut cfg = Config::load().context("load config")?;
    overrides.apply(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

async fn run_server(cfg: Config) -> anyhow::Result<()> {
    init_logging(&cfg.service_name);
    let telemetry = init_tracer(&cfg)?;

    let listen = cfg.listen_addr();
    let addr = tokio::net::lookup_host(&listen)
        .await
        .with_context(|| format!("resolve listen address {listen}"))?
        .next()
        .with_context(|| format!("no address for {listen}"))?;

    let outcomes = Arc::new(RandomOutcomes::new(cfg.latency_min, cfg.latency_max));
    let state = AppState::new(cfg, telemetry.tracer(), outcomes);

    let served = run_service(state, addr, shutdown_signal()).await;
    telemetry.shutdown();
    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received ctrl-c, shutting down");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down gracefully");
        }
    }
}
