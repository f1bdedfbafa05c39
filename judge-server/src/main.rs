use clap::Parser;
use judge_core::EngineConfig;
use judge_server::{create_app, run_server};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// Maximum number of concurrently executing submissions
    #[arg(short, long, default_value = "10")]
    max_concurrent: usize,

    /// Directory holding materialized sources and inputs
    #[arg(short, long, default_value = "/tmp/judge-workspace")]
    workspace: PathBuf,

    /// Wall-clock limit per compile/run phase, in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config =
        EngineConfig::new(&args.workspace).with_timeout(Duration::from_secs(args.timeout));

    let app = create_app(args.max_concurrent, config).await?;
    run_server(app, args.addr).await?;

    Ok(())
}
