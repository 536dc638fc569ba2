//! 统一的 Token 工具函数
//!
//! 代币 symbol 与 mint 之间的对照表，供中转账户和兑换路径查找使用

use crate::constants::{BTC_MINT, ETH_MINT, RAY_MINT, SOL_MINT, USDC_MINT, USDT_MINT};
use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

/// 已知代币（symbol -> mint）
static KNOWN_TOKENS: Lazy<HashMap<&'static str, Pubkey>> = Lazy::new(|| {
    HashMap::from([
        ("SOL", SOL_MINT),
        ("USDC", USDC_MINT),
        ("USDT", USDT_MINT),
        ("BTC", BTC_MINT),
        ("ETH", ETH_MINT),
        ("RAY", RAY_MINT),
    ])
});

/// Symbol ↔ mint lookup
pub trait TokenRegistry: Send + Sync {
    fn mint_address(&self, symbol: &str) -> Option<Pubkey>;

    fn symbol(&self, mint: &Pubkey) -> Option<String>;
}

/// 内存中的代币表，默认包含已知代币
#[derive(Debug, Clone)]
pub struct StaticTokenRegistry {
    tokens: HashMap<String, Pubkey>,
}

impl Default for StaticTokenRegistry {
    fn default() -> Self {
        let tokens = KNOWN_TOKENS.iter().map(|(symbol, mint)| (symbol.to_string(), *mint)).collect();
        Self { tokens }
    }
}

impl StaticTokenRegistry {
    /// 空表，不包含任何已知代币
    pub fn empty() -> Self {
        Self { tokens: HashMap::new() }
    }

    pub fn with_token(mut self, symbol: impl Into<String>, mint: Pubkey) -> Self {
        self.tokens.insert(symbol.into(), mint);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenRegistry for StaticTokenRegistry {
    fn mint_address(&self, symbol: &str) -> Option<Pubkey> {
        self.tokens.get(symbol).copied()
    }

    fn symbol(&self, mint: &Pubkey) -> Option<String> {
        self.tokens.iter().find(|(_, m)| *m == mint).map(|(symbol, _)| symbol.clone())
    }
}

impl<T: TokenRegistry + ?Sized> TokenRegistry for std::sync::Arc<T> {
    fn mint_address(&self, symbol: &str) -> Option<Pubkey> {
        (**self).mint_address(symbol)
    }

    fn symbol(&self, mint: &Pubkey) -> Option<String> {
        (**self).symbol(mint)
    }
}

/// 获取已知代币的 Symbol（硬编码兜底方案）
///
/// 未知代币返回空字符串，适用于日志记录、调试显示等场景
pub fn get_known_token_symbol(mint: &Pubkey) -> String {
    KNOWN_TOKENS
        .iter()
        .find(|(_, m)| *m == mint)
        .map(|(symbol, _)| symbol.to_string())
        .unwrap_or_default()
}
