//! Query and move ERC20 tokens from the command line.
//!
//! Reads need only a config file; writes also need a private key, taken from
//! `--private-key` or `TOKENCTL_PRIVATE_KEY`.

use clap::Parser;
use config::TokenConfig;
use std::time::Duration;
use token::HttpTokenClient;
use tokenctl::{
    execute,
    metrics::{install_prometheus_exporter, Metrics},
    signing_key, watch, Command,
};
use tracing::info;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "tokenctl")]
#[command(about = "Query and move ERC20 tokens")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "TOKENCTL_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout is reserved for command output
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let mut cli = Cli::parse();
    init_tracing(cli.log_json);

    let private_key = cli.private_key.take().map(Zeroizing::new);
    let signer = signing_key(&cli.command, private_key.as_deref().map(String::as_str))?;

    let config = TokenConfig::from_file(&cli.config)?;
    info!(
        rpc_url = %config.rpc_url,
        token = %config.token_address,
        gas_price = config.gas_price,
        "Loaded config"
    );

    if let Some(port) = cli.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Serving Prometheus metrics");
    }
    let metrics = Metrics::new();

    let client = HttpTokenClient::from_config(&config).await?;

    if let Command::Watch {
        owners,
        interval_secs,
    } = &cli.command
    {
        info!(owners = owners.len(), interval_secs, "Starting balance watch");
        let period = Duration::from_secs(*interval_secs);
        watch(&client, owners, period, &metrics, tokio::signal::ctrl_c()).await;

        return Ok(());
    }

    let outcome = execute(&client, &cli.command, signer.as_ref(), &metrics).await?;
    println!("{}", outcome.render(cli.json));

    Ok(())
}
