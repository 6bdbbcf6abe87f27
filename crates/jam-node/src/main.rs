//! `jam-node`: boot a genesis state from a config file, then either serve the
//! conformance harness over a Unix socket or replay a single block from a JSON file
//! and print the resulting state root.

mod config;
mod harness;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use config::NodeConfig;

#[derive(Parser, Debug)]
#[command(name = "jam-node")]
#[command(about = "JAM block-import state transition function node", long_about = None)]
struct Cli {
    /// Node config file (YAML): validator set and runtime parameters.
    #[arg(long, short)]
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the block-import conformance harness on a Unix domain socket.
    Conformance {
        #[arg(long)]
        socket: PathBuf,
    },
    /// Import a single block (given as a JSON file) against genesis and print the
    /// resulting state root.
    ImportBlock {
        #[arg(long)]
        block: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .compact()
        .init();

    let node_config = NodeConfig::load(&cli.config)?;
    let stf_config = node_config.stf_config();
    let validators = node_config.validator_descriptors()?;

    info!(
        validator_count = validators.len(),
        core_count = stf_config.core_count,
        epoch_length = stf_config.epoch_length,
        "building genesis state"
    );

    let genesis = jam_state::genesis::genesis_state(validators, vec![], [0u8; 32], &stf_config);

    match cli.command {
        Command::Conformance { socket } => {
            harness::run(&socket, genesis, stf_config).await?;
        }
        Command::ImportBlock { block } => {
            let body = std::fs::read_to_string(&block)
                .with_context(|| format!("reading block file at {}", block.display()))?;
            let block: jam_state::stf::Block =
                serde_json::from_str(&body).context("parsing block JSON")?;

            let verifier = jam_crypto::MockRingVerifier;
            let posterior = jam_state::stf::import_block(&genesis, &block, &stf_config, &verifier)?;

            println!("{}", hex::encode(posterior.state_root()));
        }
    }

    Ok(())
}
