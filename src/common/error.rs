use crate::api::error::FeeRelayerError;
use crate::swap::PoolError;
use solana_rpc_client_api::client_error::Error as ClientError;
use solana_sdk::pubkey::Pubkey;

/// 中继层错误
///
/// Covers every failure the relay components can surface to a caller. Lookups
/// never retry: RPC and HTTP failures are handed back as-is.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("RPC 请求失败: {0}")]
    Rpc(#[from] ClientError),
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("fee relayer 返回错误: {0}")]
    Server(#[from] FeeRelayerError),
    #[error("响应解码失败: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("未知错误")]
    Unknown,
    #[error("无效的 URL: {0}")]
    InvalidUrl(String),
    #[error("签名者不在交易账户列表中: {0}")]
    InvalidSignature(Pubkey),
    #[error("无效的 fee payer: {0}")]
    InvalidFeePayer(String),
    #[error("中继上下文缺失或不一致")]
    InvalidContext,
    #[error("未找到可用的兑换池")]
    SwapPoolsNotFound,
    #[error("未找到中转代币 mint")]
    TransitTokenMintNotFound,
    #[error("兑换池计算失败: {0}")]
    Pool(#[from] PoolError),
}

pub type RelayResult<T> = Result<T, RelayError>;
