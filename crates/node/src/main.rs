use bourse_core::MarketCode;
use bourse_node::{MarketNode, NodeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        r#"Bourse market node - one city's share registry and trading engine

USAGE:
    bourse-node [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --market <NAME>     Use the built-in wiring for NewYork, London or Tokyo
    --log-json          Emit logs as JSON
    --help              Print this help message

ENVIRONMENT VARIABLES:
    HOST                Listen host (default: 0.0.0.0)
    RPC_PORT            HTTP/JSON RPC port (preset: 8080/8081/8082)
    COMMAND_PORT        UDP command port (preset: 5000/5001/5002)
    RUST_LOG            Log level filter

EXAMPLES:
    # Start the London node with the standard wiring
    bourse-node --market London

    # Run with config file
    bourse-node --config tokyo.json

    # Standard wiring on a custom RPC port
    RPC_PORT=9080 bourse-node --market NewYork
"#
    );
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bourse_node=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut market: Option<MarketCode> = None;
    let mut log_json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            "--market" | "-m" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --market requires a market name");
                    std::process::exit(1);
                }
                match args[i].parse::<MarketCode>() {
                    Ok(m) => market = Some(m),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            "--log-json" => log_json = true,
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    init_tracing(log_json);

    let config = match (config_path, market) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path);
            NodeConfig::from_file(&path)?
        }
        (None, Some(market)) => {
            tracing::info!("Using built-in wiring for {}", market);
            NodeConfig::preset(market)
        }
        (None, None) => {
            tracing::info!("No --config or --market given, defaulting to NewYork");
            NodeConfig::preset(MarketCode::NewYork)
        }
    };
    let config = config.with_env_overrides(|var| std::env::var(var).ok())?;

    tracing::info!("Market: {}", config.market);
    tracing::info!("RPC: http://{}", config.server.rpc_addr());
    tracing::info!("Commands: udp://{}", config.server.command_addr());
    for peer in &config.peers {
        tracing::info!(
            "Peer {}: rpc {} / commands {}",
            peer.market,
            peer.rpc_url,
            peer.command_address
        );
    }
    tracing::info!("Seed shares: {}", config.seed_shares.len());

    let node = MarketNode::from_config(config)?;
    node.run().await?;
    Ok(())
}
