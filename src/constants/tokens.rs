//! 常用代币常量定义
//!
//! 用于硬编码已知代币的 mint 地址和 symbol

use solana_sdk::pubkey;

pub use solana_sdk::pubkey::Pubkey;

/// SOL Mint (Wrapped SOL)
pub const SOL_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

/// Wrapped SOL mint. Same address as [`SOL_MINT`], named for the relay flows that
/// distinguish native SOL from SPL fee tokens.
pub const WRAPPED_SOL_MINT: Pubkey = SOL_MINT;

/// USDC Mint (mainnet)
pub const USDC_MINT: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

/// USDT Mint (mainnet)
pub const USDT_MINT: Pubkey = pubkey!("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB");

/// Wrapped BTC (Sollet) Mint
pub const BTC_MINT: Pubkey = pubkey!("9n4nbM75f5Ui33ZbPYXn59EwSgE8CGsHtAeTH5YFeJ9E");

/// Wrapped ETH (Sollet) Mint
pub const ETH_MINT: Pubkey = pubkey!("2FPyTwcZLUg1MDrwsyoP4D6s1tM7hAkHYRjkNb5w6Pxk");

/// RAY (Raydium) Mint
pub const RAY_MINT: Pubkey = pubkey!("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R");
