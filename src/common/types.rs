use crate::constants::{RELAY_PROGRAM_DEVNET, RELAY_PROGRAM_MAINNET};
use anyhow::anyhow;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

/// Solana cluster the relay program is deployed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    MainnetBeta,
    Devnet,
    Testnet,
}

impl Network {
    /// Relay program id for this cluster
    pub fn relay_program_id(&self) -> Pubkey {
        match self {
            Network::MainnetBeta => RELAY_PROGRAM_MAINNET,
            // testnet has no dedicated deployment
            Network::Devnet | Network::Testnet => RELAY_PROGRAM_DEVNET,
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" | "mainnetbeta" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(anyhow!("unknown solana network: {other}")),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
        };
        f.write_str(name)
    }
}

/// Fee relayer configuration
///
/// Holds everything the relay components need to reach the outside world: the fee
/// relayer server, the RPC node and the cluster the relay program lives on.
#[derive(Debug, Clone)]
pub struct FeeRelayerConfig {
    /// Base url of the fee relayer server, e.g. `https://fee-relayer.example.org`
    pub base_url: String,
    /// Server API version. `/v{N}` is inserted into every path when `version > 1`
    pub version: u32,
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub network: Network,
    /// HTTP request timeout (milliseconds)
    pub timeout_millis: u64,
    /// When false the usage-limit endpoint is never queried and every fee is paid
    pub free_transactions_enabled: bool,
}

impl Default for FeeRelayerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            version: 1,
            rpc_url: "http://127.0.0.1:8899".to_string(),
            commitment: CommitmentConfig::confirmed(),
            network: Network::MainnetBeta,
            timeout_millis: 10_000,
            free_transactions_enabled: true,
        }
    }
}

impl FeeRelayerConfig {
    pub fn new(base_url: String, version: u32, rpc_url: String) -> Self {
        Self { base_url, version, rpc_url, ..Self::default() }
    }

    /// Build a config from the process environment
    ///
    /// - `FEE_RELAYER_URL` (required)
    /// - `FEE_RELAYER_VERSION` (default: 1)
    /// - `RPC_URL` (default: http://127.0.0.1:8899)
    /// - `SOLANA_NETWORK` (default: mainnet-beta)
    pub fn from_env() -> AnyResult<Self> {
        let base_url = std::env::var("FEE_RELAYER_URL")
            .map_err(|_| anyhow!("FEE_RELAYER_URL is not set"))?;
        let version = match std::env::var("FEE_RELAYER_VERSION") {
            Ok(v) => v.parse::<u32>().map_err(|e| anyhow!("invalid FEE_RELAYER_VERSION {v}: {e}"))?,
            Err(_) => 1,
        };
        let rpc_url = std::env::var("RPC_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8899".to_string());
        let network = match std::env::var("SOLANA_NETWORK") {
            Ok(v) => v.parse()?,
            Err(_) => Network::MainnetBeta,
        };

        Ok(Self { base_url, version, rpc_url, network, ..Self::default() })
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_timeout_millis(mut self, timeout_millis: u64) -> Self {
        self.timeout_millis = timeout_millis;
        self
    }

    /// Disable free transactions: the relay context reports an exhausted quota
    pub fn with_free_transactions(mut self, enabled: bool) -> Self {
        self.free_transactions_enabled = enabled;
        self
    }
}

pub type SolanaRpcClient = solana_client::nonblocking::rpc_client::RpcClient;
pub type AnyResult<T> = anyhow::Result<T>;
