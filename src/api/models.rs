//! Fee relayer 请求与响应模型

use serde::{Deserialize, Serialize};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::HashMap;

use crate::common::{RelayError, RelayResult};
use crate::relay::context::UsageStatus;

// ===== 响应 =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTokenData {
    pub name: String,
    pub code: String,
    pub mint: String,
    pub account: String,
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub secs: u64,
    pub nanos: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub use_free_fee: bool,
    pub max_fee_amount: u64,
    pub max_fee_count: u32,
    pub max_token_account_creation_amount: u64,
    pub max_token_account_creation_count: u32,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFee {
    pub total_fee_amount: u64,
    pub fee_count: u32,
    pub rent_count: u32,
}

/// `/free_fee_limits/{authority}` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLimitForAuthorityResponse {
    /// Authority pubkey as raw bytes
    pub authority: Vec<u8>,
    pub limits: Limits,
    pub processed_fee: ProcessedFee,
}

impl FeeLimitForAuthorityResponse {
    /// 服务端关闭免费额度时，最大次数按 0 处理
    pub fn usage_status(&self) -> UsageStatus {
        let max_usage = if self.limits.use_free_fee { self.limits.max_fee_count } else { 0 };
        UsageStatus::new(
            max_usage,
            self.processed_fee.fee_count,
            self.limits.max_fee_amount,
            self.processed_fee.total_fee_amount,
        )
    }
}

/// `/sign_relay_transaction` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignedRelayTransaction {
    pub signature: String,
    pub transaction: String,
}

// ===== 统计信息 =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationType {
    TopUp,
    Transfer,
    Swap,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceType {
    Android,
    Ios,
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Environment {
    Dev,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsInfo {
    pub operation_type: OperationType,
    pub device_type: DeviceType,
    pub currency: Option<String>,
    pub build: Option<String>,
    pub environment: Environment,
}

impl StatsInfo {
    pub fn new(operation_type: OperationType, device_type: DeviceType, environment: Environment) -> Self {
        Self { operation_type, device_type, currency: None, build: None, environment }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }
}

// ===== 兑换数据 =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectSwapData {
    pub program_id: String,
    pub account_pubkey: String,
    pub authority_pubkey: String,
    pub transfer_authority_pubkey: String,
    pub source_pubkey: String,
    pub destination_pubkey: String,
    pub pool_token_mint_pubkey: String,
    pub pool_fee_account_pubkey: String,
    pub amount_in: u64,
    pub minimum_amount_out: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitiveSwapData {
    pub from: DirectSwapData,
    pub to: DirectSwapData,
    pub transit_token_mint_pubkey: String,
    pub needs_create_transit_token_account: bool,
}

/// Serialized as `{"Spl": {...}}` or `{"SplTransitive": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SwapData {
    Spl(DirectSwapData),
    SplTransitive(TransitiveSwapData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapTransactionSignatures {
    pub user_authority_signature: String,
    pub transfer_authority_signature: Option<String>,
}

// ===== 请求参数 =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSolParams {
    #[serde(rename = "sender_pubkey")]
    pub sender: String,
    #[serde(rename = "recipient_pubkey")]
    pub recipient: String,
    #[serde(rename = "lamports")]
    pub amount: u64,
    pub signature: String,
    pub blockhash: String,
    #[serde(rename = "info")]
    pub stats_info: StatsInfo,
}

impl TransferSolParams {
    pub fn new(
        sender: &Pubkey,
        recipient: &Pubkey,
        amount: u64,
        signature: &Signature,
        blockhash: String,
        device_type: DeviceType,
        build: Option<String>,
        environment: Environment,
    ) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount,
            signature: signature.to_string(),
            blockhash,
            stats_info: StatsInfo {
                operation_type: OperationType::Transfer,
                device_type,
                currency: Some("SOL".to_string()),
                build,
                environment,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSplTokenParams {
    #[serde(rename = "sender_token_account_pubkey")]
    pub sender: String,
    #[serde(rename = "recipient_pubkey")]
    pub recipient: String,
    #[serde(rename = "token_mint_pubkey")]
    pub mint_address: String,
    #[serde(rename = "authority_pubkey")]
    pub authority: String,
    pub amount: u64,
    pub decimals: u8,
    pub signature: String,
    pub blockhash: String,
    #[serde(rename = "info")]
    pub stats_info: StatsInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopUpWithSwapParams {
    #[serde(rename = "user_source_token_account_pubkey")]
    pub user_source_token_account: String,
    #[serde(rename = "source_token_mint_pubkey")]
    pub source_token_mint: String,
    #[serde(rename = "user_authority_pubkey")]
    pub user_authority: String,
    pub top_up_swap: SwapData,
    pub fee_amount: u64,
    pub signatures: SwapTransactionSignatures,
    pub blockhash: String,
    #[serde(rename = "info")]
    pub stats_info: StatsInfo,
}

impl TopUpWithSwapParams {
    pub fn new(
        user_source_token_account: &Pubkey,
        source_token_mint: &Pubkey,
        user_authority: &Pubkey,
        top_up_swap: SwapData,
        fee_amount: u64,
        signatures: SwapTransactionSignatures,
        blockhash: String,
        device_type: DeviceType,
        build: Option<String>,
        environment: Environment,
    ) -> Self {
        Self {
            user_source_token_account: user_source_token_account.to_string(),
            source_token_mint: source_token_mint.to_string(),
            user_authority: user_authority.to_string(),
            top_up_swap,
            fee_amount,
            signatures,
            blockhash,
            stats_info: StatsInfo {
                operation_type: OperationType::TopUp,
                device_type,
                currency: Some(source_token_mint.to_string()),
                build,
                environment,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapParams {
    pub user_source_token_account_pubkey: String,
    pub user_destination_pubkey: String,
    pub user_destination_account_owner: Option<String>,
    pub source_token_mint_pubkey: String,
    pub destination_token_mint_pubkey: String,
    pub user_authority_pubkey: String,
    pub user_swap: SwapData,
    pub fee_amount: u64,
    pub signatures: SwapTransactionSignatures,
    pub blockhash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestAccountMeta {
    #[serde(rename = "pubkey")]
    pub pubkey_index: u8,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInstruction {
    #[serde(rename = "program_id")]
    pub program_index: u8,
    pub accounts: Vec<RequestAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled transaction, account keys by index, with the signatures collected so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayTransactionParam {
    pub instructions: Vec<RequestInstruction>,
    /// Key: index into `pubkeys`
    pub signatures: HashMap<String, String>,
    pub pubkeys: Vec<String>,
    pub blockhash: String,
    #[serde(rename = "info")]
    pub stats_info: StatsInfo,
}

impl RelayTransactionParam {
    /// Build from a compiled message. Every signer must be one of the message keys.
    pub fn from_message(
        message: &Message,
        signatures: &[(Pubkey, Signature)],
        stats_info: StatsInfo,
    ) -> RelayResult<Self> {
        let pubkeys: Vec<String> = message.account_keys.iter().map(|k| k.to_string()).collect();

        let instructions = message
            .instructions
            .iter()
            .map(|ix| RequestInstruction {
                program_index: ix.program_id_index,
                accounts: ix
                    .accounts
                    .iter()
                    .map(|&index| RequestAccountMeta {
                        pubkey_index: index,
                        is_signer: message.is_signer(index as usize),
                        is_writable: message.is_maybe_writable(index as usize, None),
                    })
                    .collect(),
                data: ix.data.clone(),
            })
            .collect();

        let mut signature_map = HashMap::with_capacity(signatures.len());
        for (signer, signature) in signatures {
            let index = message
                .account_keys
                .iter()
                .position(|k| k == signer)
                .ok_or(RelayError::InvalidSignature(*signer))?;
            signature_map.insert(index.to_string(), signature.to_string());
        }

        Ok(Self {
            instructions,
            signatures: signature_map,
            pubkeys,
            blockhash: message.recent_blockhash.to_string(),
            stats_info,
        })
    }
}

// ===== 请求类型 =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestType {
    RelayTransaction(RelayTransactionParam),
    SignRelayTransaction(RelayTransactionParam),
    TransferSol(TransferSolParams),
    RelayTopUpWithSwap(TopUpWithSwapParams),
    RelayTransferSplTokens(TransferSplTokenParams),
    RelaySwap(SwapParams),
}

impl RequestType {
    pub fn path(&self) -> &'static str {
        match self {
            RequestType::RelayTransaction(_) => "/relay_transaction",
            RequestType::SignRelayTransaction(_) => "/sign_relay_transaction",
            RequestType::TransferSol(_) => "/transfer_sol",
            RequestType::RelayTopUpWithSwap(_) => "/relay_top_up_with_swap",
            RequestType::RelayTransferSplTokens(_) => "/relay_transfer_spl_tokens",
            RequestType::RelaySwap(_) => "/relay_swap",
        }
    }

    /// JSON request body
    pub fn params(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            RequestType::RelayTransaction(p) | RequestType::SignRelayTransaction(p) => serde_json::to_vec(p),
            RequestType::TransferSol(p) => serde_json::to_vec(p),
            RequestType::RelayTopUpWithSwap(p) => serde_json::to_vec(p),
            RequestType::RelayTransferSplTokens(p) => serde_json::to_vec(p),
            RequestType::RelaySwap(p) => serde_json::to_vec(p),
        }
    }
}
