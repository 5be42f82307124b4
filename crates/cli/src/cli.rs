// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::ensure_hex_zeroizing;
use crate::helpers::telemetry::setup_simple_tracing;
use crate::{demo, encrypt, probe, status};
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use fhevm_config::load_config::load_config;
use fhevm_config::validation::ValidRpcUrl;
use fhevm_config::FhevmConfig;
use fhevm_data::{close_all_connections, DataStore, InMemoryStore, SharedStore, SledStore};
use fhevm_relayer::UnavailableRelayerSdk;
use fhevm_sdk::FhevmEnvironment;
use std::sync::Arc;
use tracing::{info, instrument, Level};
use zeroize::Zeroizing;

const DB_TREE: &str = "fhevm";

#[derive(Parser, Debug)]
#[command(name = "fhevm")]
#[command(about = "Encrypt for and decrypt from FHEVM contracts on a mock node or the relayer network", long_about = None)]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")"))]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `fhevm -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// JSON-RPC endpoint. Overrides `rpc_url` from the config file.
    #[arg(long = "rpc-url", global = true)]
    rpc_url: Option<ValidRpcUrl>,

    /// Skip chain id detection and use this chain id
    #[arg(long = "chain-id", global = true)]
    chain_id: Option<u64>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        setup_simple_tracing(self.log_level());
        let config = self.load_config()?;

        if config.storage.in_memory {
            return self
                .run(&config, SharedStore::new(InMemoryStore::new()))
                .await;
        }

        let path = config.storage.db_path();
        info!("Using database at {:?}", path);
        let store = SharedStore::new(SledStore::new(&path, DB_TREE)?);
        let result = self.run(&config, store).await;
        close_all_connections();
        result
    }

    /// Config file and environment with command line overrides applied
    pub fn load_config(&self) -> Result<FhevmConfig> {
        let mut config = load_config(self.config.clone())?;
        if let Some(rpc_url) = self.rpc_url.clone() {
            config.rpc_url = Some(rpc_url.into());
        }
        if let Some(chain_id) = self.chain_id {
            config.chain_id = Some(chain_id);
        }
        config.validate()?;
        Ok(config)
    }

    async fn run<S: DataStore>(self, config: &FhevmConfig, store: SharedStore<S>) -> Result<()> {
        let env = FhevmEnvironment::from_config(config, Arc::new(UnavailableRelayerSdk), store)?;

        match self.command {
            Commands::Probe => probe::execute(&env, config).await?,
            Commands::Status => status::execute(&env, config).await?,
            Commands::Encrypt {
                contract,
                user,
                ty,
                value,
            } => encrypt::execute(&env, config, contract, user, ty, value).await?,
            Commands::Demo {
                contract,
                value,
                private_key,
            } => {
                let private_key =
                    private_key.or_else(|| config.private_key.clone().map(Zeroizing::new));
                demo::execute(&env, config, contract, value, private_key).await?
            }
        }

        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the chain and check whether its node supports the FHE mock
    Probe,

    /// Create a client and report each lifecycle step
    Status,

    /// Encrypt a value for a contract and print the handles and input proof as JSON
    Encrypt {
        /// Contract that will receive the encrypted input
        #[arg(long)]
        contract: String,

        /// User submitting the input. Defaults to the configured wallet.
        #[arg(long)]
        user: Option<String>,

        /// Encrypted type tag: bool, uint8 .. uint256, address
        #[arg(long = "type", default_value = "uint32")]
        ty: String,

        /// Plaintext value
        value: String,
    },

    /// Encrypt a value, then decrypt it twice with a single wallet signature
    Demo {
        /// Contract the value is encrypted for
        #[arg(long)]
        contract: String,

        /// Plaintext to round trip as a uint64
        #[arg(default_value_t = 42)]
        value: u64,

        /// Wallet key signing the decryption request. Overrides `private_key` from the config.
        #[arg(long = "private-key", value_parser = ensure_hex_zeroizing)]
        private_key: Option<Zeroizing<String>>,
    },
}
