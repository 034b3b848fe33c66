use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tangle_router::config::AppConfig;
use tangle_router::trytes::{Hash, TryteString};
use tangle_router::RoutingClient;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tangle-router", about = "Route ledger node commands across several nodes")]
struct Cli {
    /// Config file stem (tangle-router.toml / .yaml / .json)
    #[arg(long, default_value = "tangle-router")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the tail of a bundle and replay it
    Reattach {
        /// Bundle hash; prompted for when omitted
        #[arg(long)]
        bundle: Option<String>,
        #[arg(long)]
        depth: Option<u32>,
    },
    /// Replay the bundle starting at a tail transaction
    Replay {
        #[arg(long)]
        tail: String,
        #[arg(long)]
        depth: Option<u32>,
    },
    /// Print the reconstructed transactions of a bundle
    Bundle {
        #[arg(long)]
        bundle: String,
    },
    /// Attach, broadcast and store a pre-signed bundle (one transaction per line, tail first)
    Send {
        #[arg(long)]
        trytes_file: String,
        #[arg(long)]
        depth: Option<u32>,
    },
    /// Print the effective route table
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run(Cli::parse()).await {
        tracing::error!(error = ?err, "fatal tangle-router error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load_from(&cli.config).context("load configuration")?;
    let client = config.build_client().context("build routing client")?;
    info!(
        default_node = %config.default_node,
        overrides = config.routes.len(),
        "routing client configured"
    );

    match cli.command {
        Command::Reattach { bundle, depth } => {
            let bundle = match bundle {
                Some(b) => b,
                None => prompt("Paste bundle hash: ").await?,
            };
            let bundle_hash: Hash = bundle.parse().context("parse bundle hash")?;
            let depth = depth.unwrap_or_else(|| config.depth());

            info!(bundle = %bundle_hash, "fetching bundle transactions");
            let attached = client.reattach(&bundle_hash, depth).await?;
            println!("Reattached bundle {} ({} transactions)", attached.hash, attached.len());
        }
        Command::Replay { tail, depth } => {
            let tail: Hash = tail.parse().context("parse tail hash")?;
            let attached = client
                .replay_bundle(&tail, depth.unwrap_or_else(|| config.depth()))
                .await?;
            println!("Replayed bundle {} ({} transactions)", attached.hash, attached.len());
        }
        Command::Bundle { bundle } => {
            let bundle_hash: Hash = bundle.parse().context("parse bundle hash")?;
            let records = client.reconstruct_bundle(&bundle_hash).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Send { trytes_file, depth } => {
            let trytes = read_trytes(&trytes_file).await?;
            let attached = send(&client, trytes, depth.unwrap_or_else(|| config.depth())).await?;
            println!("Bundle Hash: {}", attached.hash);
        }
        Command::Routes => {
            for (op, address) in client.router().table() {
                println!("{:<20} {:<28} {}", op.name(), op.command(), address);
            }
        }
    }
    Ok(())
}

async fn send(
    client: &RoutingClient,
    trytes: Vec<TryteString>,
    depth: u32,
) -> Result<tangle_router::AttachedBundle> {
    info!(transactions = trytes.len(), "sending transfer");
    client
        .send_trytes(trytes, depth)
        .await
        .map_err(|e| anyhow!(e).context("send transfer"))
}

async fn read_trytes(path: &str) -> Result<Vec<TryteString>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {path}"))?;
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.parse::<TryteString>().with_context(|| format!("invalid trytes in {path}")))
        .collect()
}

async fn prompt(message: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(message.as_bytes()).await?;
    stdout.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let line = line.trim().to_string();
    if line.is_empty() {
        return Err(anyhow!("no bundle hash given"));
    }
    Ok(line)
}

fn init_tracing() -> Result<()> {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn,reqwest=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
