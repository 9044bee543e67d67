use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use stellar_wallet_core::api::{HorizonClient, SorobanRpcClient};
use stellar_wallet_core::memo::{
    CachedMemoDirectory, MemoCheckInput, MemoValidator, StellarExpertDirectory,
};
use stellar_wallet_core::tx::{self, BroadcastConfig, TransactionSession};
use stellar_wallet_core::utils::logging;
use stellar_wallet_core::utils::WalletConfig;
use stellar_wallet_core::{
    fees, wallet, BuildPaymentTransactionParams, BuildSwapTransactionParams, Network,
};

#[derive(Parser)]
#[command(name = "stellar-wallet", version, about = "Stellar wallet transaction tools")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an address; exits non-zero when it is invalid
    ValidateAddress { address: String },

    /// Build a payment from JSON parameters, optionally signing and submitting it
    BuildPayment {
        /// Parameters file, or stdin when omitted
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Environment variable holding the secret seed used to sign
        #[arg(long)]
        sign_with_env: Option<String>,

        /// Submit after signing
        #[arg(long, requires = "sign_with_env")]
        submit: bool,
    },

    /// Build a path-payment swap from JSON parameters
    BuildSwap {
        #[arg(short, long)]
        params: Option<PathBuf>,
    },

    /// Add or remove a trustline
    ChangeTrust {
        #[arg(short, long, default_value = "testnet")]
        network: Network,

        /// Account adding the trustline
        #[arg(long)]
        account: String,

        /// Asset as CODE:ISSUER
        #[arg(long)]
        asset: String,

        #[arg(long)]
        remove: bool,
    },

    /// Check whether a transaction is missing a required memo
    CheckMemo {
        #[arg(short, long, default_value = "public")]
        network: Network,

        #[arg(long)]
        xdr: String,

        /// Memo entered outside the transaction
        #[arg(long)]
        memo: Option<String>,
    },

    /// Sign an envelope with the secret seed held in an environment variable
    Sign {
        #[arg(short, long, default_value = "testnet")]
        network: Network,

        #[arg(long)]
        xdr: String,

        #[arg(long, default_value = "STELLAR_SECRET_KEY")]
        secret_env: String,
    },

    /// Submit a signed envelope
    Submit {
        #[arg(short, long, default_value = "testnet")]
        network: Network,

        #[arg(long)]
        xdr: String,
    },

    /// Recommended fee and congestion level
    Fees {
        #[arg(short, long, default_value = "public")]
        network: Network,
    },

    /// Decode an envelope
    Decode {
        #[arg(short, long, default_value = "testnet")]
        network: Network,

        #[arg(long)]
        xdr: String,
    },

    /// Generate a new keypair
    GenerateKeypair,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_params<T: serde::de::DeserializeOwned>(path: Option<&PathBuf>) -> Result<T> {
    let json = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    serde_json::from_str(&json).context("Invalid parameters")
}

fn read_secret(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| anyhow!("Environment variable {} is not set", var))
}

fn horizon(config: &WalletConfig, network: Network) -> Result<HorizonClient> {
    Ok(HorizonClient::for_network(
        &config.network_details(network),
        config.http_timeout_secs,
    )?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = WalletConfig::load(cli.config.as_deref())?;
    if cli.debug || config.debug_logging {
        logging::enable_debug();
    }

    match cli.command {
        Commands::ValidateAddress { address } => {
            let validation = wallet::validate_address_detailed(&address);
            print_json(&validation)?;
            if !validation.is_valid {
                bail!("Invalid Stellar address");
            }
        }

        Commands::BuildPayment {
            params,
            sign_with_env,
            submit,
        } => {
            let params: BuildPaymentTransactionParams = read_params(params.as_ref())?;
            let network = params
                .network
                .ok_or_else(|| anyhow!("Parameters must include a network"))?;
            let details = config.network_details(network);
            let horizon = horizon(&config, network)?;
            let rpc = SorobanRpcClient::for_network(&details, config.http_timeout_secs)?;

            let mut session = TransactionSession::new();
            session.build(&horizon, &rpc, &details, params)?;
            if let Some(var) = sign_with_env {
                session.sign(&read_secret(&var)?, network)?;
            }
            if submit {
                session.submit(
                    &horizon,
                    &BroadcastConfig::with_retries(config.submit_max_retries),
                )?;
            }
            print_json(&session)?;
        }

        Commands::BuildSwap { params } => {
            let params: BuildSwapTransactionParams = read_params(params.as_ref())?;
            let network = params
                .network
                .ok_or_else(|| anyhow!("Parameters must include a network"))?;
            let built = tx::build_swap_transaction(&horizon(&config, network)?, &params)?;
            print_json(&built)?;
        }

        Commands::ChangeTrust {
            network,
            account,
            asset,
            remove,
        } => {
            let built = tx::build_change_trust_transaction(
                &horizon(&config, network)?,
                network,
                &account,
                &asset,
                remove,
            )?;
            print_json(&built)?;
        }

        Commands::CheckMemo { network, xdr, memo } => {
            let directory = CachedMemoDirectory::new(
                StellarExpertDirectory::from_config(&config)?,
                Duration::from_secs(config.memo_cache_ttl_secs),
            );
            let validator = MemoValidator::new(directory);
            let input = MemoCheckInput {
                xdr: Some(xdr),
                transaction_memo: memo,
                network: Some(network),
                validation_enabled: config.validate_memo,
            };
            print_json(&validator.validate(&horizon(&config, network)?, &input))?;
        }

        Commands::Sign {
            network,
            xdr,
            secret_env,
        } => {
            let signed = tx::sign_transaction(&xdr, &read_secret(&secret_env)?, network)?;
            print_json(&signed)?;
        }

        Commands::Submit { network, xdr } => {
            let result = tx::submit_transaction(
                &horizon(&config, network)?,
                &xdr,
                &BroadcastConfig::with_retries(config.submit_max_retries),
            )?;
            print_json(&result)?;
        }

        Commands::Fees { network } => {
            print_json(&fees::get_network_fees(&horizon(&config, network)?))?;
        }

        Commands::Decode { network, xdr } => {
            print_json(&tx::decode_transaction(&xdr, network)?)?;
        }

        Commands::GenerateKeypair => {
            print_json(&wallet::create_new_keypair())?;
        }
    }

    Ok(())
}
