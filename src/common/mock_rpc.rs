//! Mock 链上查询，借鉴 httpmock 设计
//!
//! 支持两种模式：
//! - Memory: 只使用内存中注册的账户
//! - Replay: 内存未命中时从录制的 JSON 文件读取
//!
//! ## 使用方法
//!
//! ```bash
//! # 重放模式：从本地文件读取账户数据
//! MOCK_MODE=replay MOCK_DIR=tests/mock_data cargo test --test destination_tests
//! ```

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_rpc_client_api::client_error::{Error as ClientError, ErrorKind};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::error::{RelayError, RelayResult};
use super::rpc::{AccountLookup, ChainStateLookup};
use crate::constants::DEFAULT_LAMPORTS_PER_SIGNATURE;

/// Mock 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// 内存模式：未注册的账户视为不存在
    Memory,
    /// 重放模式：从本地文件读取账户
    Replay,
}

impl MockMode {
    /// 从环境变量读取模式
    pub fn from_env() -> Self {
        match std::env::var("MOCK_MODE").as_deref() {
            Ok("replay") => MockMode::Replay,
            _ => MockMode::Memory,
        }
    }
}

/// 录制文件中的账户格式（data 使用 base64）
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountFixture {
    lamports: u64,
    owner: String,
    data: String,
    executable: bool,
    rent_epoch: u64,
}

impl AccountFixture {
    fn from_account(account: &Account) -> Self {
        Self {
            lamports: account.lamports,
            owner: account.owner.to_string(),
            data: BASE64.encode(&account.data),
            executable: account.executable,
            rent_epoch: account.rent_epoch,
        }
    }

    fn into_account(self) -> Result<Account, String> {
        let owner = Pubkey::from_str(&self.owner).map_err(|e| format!("owner 格式错误: {e}"))?;
        let data = BASE64.decode(&self.data).map_err(|e| format!("data 解码失败: {e}"))?;
        Ok(Account {
            lamports: self.lamports,
            data,
            owner,
            executable: self.executable,
            rent_epoch: self.rent_epoch,
        })
    }
}

/// 内存版链上查询
///
/// 账户、租金和签名费用都可配置，并统计 `fetch_account` 调用次数，
/// 方便测试验证并发查询和确定性。
pub struct MockAccountLookup {
    accounts: RwLock<HashMap<Pubkey, Account>>,
    rent_by_len: RwLock<HashMap<usize, u64>>,
    lamports_per_signature: AtomicUsize,
    fetch_calls: AtomicUsize,
    failing: AtomicBool,
    pub mode: MockMode,
    pub mock_dir: String,
}

impl Default for MockAccountLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccountLookup {
    /// 创建新的 Mock 查询
    ///
    /// 从环境变量 `MOCK_MODE` 读取模式（默认: Memory）
    /// 从环境变量 `MOCK_DIR` 读取录制目录（默认: tests/mock_data）
    pub fn new() -> Self {
        let mock_dir = std::env::var("MOCK_DIR").unwrap_or_else(|_| "tests/mock_data".to_string());
        Self::new_with_mode(MockMode::from_env(), mock_dir)
    }

    pub fn new_with_mode(mode: MockMode, mock_dir: String) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            rent_by_len: RwLock::new(HashMap::new()),
            lamports_per_signature: AtomicUsize::new(DEFAULT_LAMPORTS_PER_SIGNATURE as usize),
            fetch_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            mode,
            mock_dir,
        }
    }

    pub fn with_account(self, address: Pubkey, account: Account) -> Self {
        self.insert_account(address, account);
        self
    }

    pub fn with_rent(self, data_len: usize, lamports: u64) -> Self {
        self.rent_by_len.write().insert(data_len, lamports);
        self
    }

    pub fn with_lamports_per_signature(self, lamports: u64) -> Self {
        self.lamports_per_signature.store(lamports as usize, Ordering::Relaxed);
        self
    }

    pub fn insert_account(&self, address: Pubkey, account: Account) {
        self.accounts.write().insert(address, account);
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.write().remove(address);
    }

    /// 之后的所有查询都返回 RPC 错误
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    fn check_failing(&self) -> RelayResult<()> {
        if self.failing.load(Ordering::Relaxed) {
            let err = ClientError::from(ErrorKind::Custom("mock rpc unavailable".to_string()));
            return Err(RelayError::Rpc(err));
        }
        Ok(())
    }

    // ===== 录制 / 重放 =====

    /// 保存账户到录制文件，`None` 表示账户不存在
    pub fn save_recording(&self, address: &Pubkey, account: Option<&Account>) {
        if let Err(e) = fs::create_dir_all(&self.mock_dir) {
            tracing::warn!("无法创建 Mock 数据目录: {}", e);
            return;
        }

        let params = serde_json::json!([address.to_string()]);
        let file_path = Path::new(&self.mock_dir).join(self.generate_file_name("getAccountInfo", &params));

        let mock_data = serde_json::json!({
            "method": "getAccountInfo",
            "params": params,
            "response": account.map(AccountFixture::from_account),
        });

        match serde_json::to_string_pretty(&mock_data) {
            Ok(json) => {
                if let Err(e) = fs::write(&file_path, json) {
                    tracing::warn!("保存 Mock 数据失败: {} (path: {:?})", e, file_path);
                }
            }
            Err(e) => tracing::warn!("序列化失败: {}", e),
        }
    }

    /// 从录制文件加载账户
    pub fn load_recording(&self, address: &Pubkey) -> Result<Option<Account>, String> {
        let params = serde_json::json!([address.to_string()]);
        let file_path = Path::new(&self.mock_dir).join(self.generate_file_name("getAccountInfo", &params));

        let content = fs::read_to_string(&file_path)
            .map_err(|e| format!("Mock 数据文件不存在: {:?} ({})", file_path, e))?;
        let mock_data: Value = serde_json::from_str(&content)
            .map_err(|e| format!("解析 Mock 数据失败: {} (path: {:?})", e, file_path))?;

        let response = mock_data
            .get("response")
            .cloned()
            .ok_or_else(|| "Mock 数据格式错误: 缺少 response 字段".to_string())?;
        if response.is_null() {
            return Ok(None);
        }

        let fixture: AccountFixture =
            serde_json::from_value(response).map_err(|e| format!("账户格式错误: {e}"))?;
        fixture.into_account().map(Some)
    }

    /// 生成文件名
    ///
    /// 格式: {method}_{params_hash}.json
    pub fn generate_file_name(&self, method: &str, params: &Value) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        params.to_string().hash(&mut hasher);
        format!("{}_{:016x}.json", method, hasher.finish())
    }

    pub fn has_mock_data(&self, address: &Pubkey) -> bool {
        let params = serde_json::json!([address.to_string()]);
        Path::new(&self.mock_dir).join(self.generate_file_name("getAccountInfo", &params)).exists()
    }
}

#[async_trait]
impl AccountLookup for MockAccountLookup {
    async fn fetch_account(&self, address: &Pubkey) -> RelayResult<Option<Account>> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failing()?;

        if let Some(account) = self.accounts.read().get(address) {
            return Ok(Some(account.clone()));
        }

        match self.mode {
            MockMode::Memory => Ok(None),
            MockMode::Replay => self.load_recording(address).or_else(|e| {
                tracing::warn!("{}", e);
                Ok(None)
            }),
        }
    }
}

#[async_trait]
impl ChainStateLookup for MockAccountLookup {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> RelayResult<u64> {
        self.check_failing()?;
        Ok(self.rent_by_len.read().get(&data_len).copied().unwrap_or_default())
    }

    async fn lamports_per_signature(&self) -> RelayResult<u64> {
        self.check_failing()?;
        Ok(self.lamports_per_signature.load(Ordering::Relaxed) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token_owned_account(data_len: usize) -> Account {
        Account {
            lamports: 2_039_280,
            data: vec![7u8; data_len],
            owner: spl_token::ID,
            executable: false,
            rent_epoch: 0,
        }
    }

    #[test]
    fn test_generate_file_name() {
        let mock = MockAccountLookup::new_with_mode(MockMode::Memory, "unused".to_string());
        let params = serde_json::json!(["program123"]);

        let name = mock.generate_file_name("getAccountInfo", &params);
        assert!(name.starts_with("getAccountInfo_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name, mock.generate_file_name("getAccountInfo", &params));
        assert_ne!(name, mock.generate_file_name("getAccountInfo", &serde_json::json!(["other"])));
    }

    #[test]
    fn test_save_and_load_recording() {
        let temp_dir = TempDir::new().unwrap();
        let mock = MockAccountLookup::new_with_mode(
            MockMode::Replay,
            temp_dir.path().to_str().unwrap().to_string(),
        );

        let existing = Pubkey::new_unique();
        let missing = Pubkey::new_unique();
        let account = token_owned_account(165);

        mock.save_recording(&existing, Some(&account));
        mock.save_recording(&missing, None);

        assert!(mock.has_mock_data(&existing));
        assert_eq!(mock.load_recording(&existing).unwrap(), Some(account));
        assert_eq!(mock.load_recording(&missing).unwrap(), None);
    }

    #[tokio::test]
    async fn test_replay_falls_back_to_recording() {
        let temp_dir = TempDir::new().unwrap();
        let mock = MockAccountLookup::new_with_mode(
            MockMode::Replay,
            temp_dir.path().to_str().unwrap().to_string(),
        );
        let address = Pubkey::new_unique();
        mock.save_recording(&address, Some(&token_owned_account(10)));

        let loaded = mock.fetch_account(&address).await.unwrap().unwrap();
        assert_eq!(loaded.owner, spl_token::ID);
        // 没有录制的账户视为不存在
        assert!(mock.fetch_account(&Pubkey::new_unique()).await.unwrap().is_none());
        assert_eq!(mock.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_lookup_returns_rpc_error() {
        let mock = MockAccountLookup::new_with_mode(MockMode::Memory, "unused".to_string());
        mock.set_failing(true);
        let err = mock.fetch_account(&Pubkey::new_unique()).await.unwrap_err();
        assert!(matches!(err, RelayError::Rpc(_)));
        assert!(mock.lamports_per_signature().await.is_err());
    }
}
