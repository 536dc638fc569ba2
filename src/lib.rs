pub mod api;
pub mod common;
pub mod constants;
pub mod relay;
pub mod swap;
pub mod utils;

use crate::api::{
    ApiClient, FeeRelayerApi, RelayTransactionParam, RequestType, TopUpWithSwapParams,
    TransferSolParams,
};
use crate::common::{AnyResult, ChainStateLookup, FeeRelayerConfig, RelayResult, SolanaRpcClient};
use crate::relay::{
    DefaultDestinationAnalyser, DefaultRelayFeeCalculator, DefaultTransitTokenAccountManager,
    DestinationAnalyser, DestinationInfo, FeeAmount, RelayContext, RelayContextManager,
    RelayFeeCalculator, RelayProgram, TokenAccount, TransitTokenAccountManager,
};
use crate::swap::{Pool, TradablePoolsProvider};
use crate::utils::{StaticTokenRegistry, TokenRegistry};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

pub use crate::common::RelayError;

type SharedChain = Arc<dyn ChainStateLookup>;
type SharedApi = Arc<dyn FeeRelayerApi>;
type SharedRegistry = Arc<dyn TokenRegistry>;

/// Fee relayer client for one user
///
/// Wires the relay components together: the context manager loads fee facts from the
/// chain and the relay server, the calculator turns them into a top-up amount, and the
/// destination analyser and transit manager tell transaction assembly which accounts
/// must be created first. Assembled transactions go out through the API client.
pub struct FeeRelayer {
    config: FeeRelayerConfig,
    owner: Pubkey,
    program: RelayProgram,
    api: SharedApi,
    context_manager: RelayContextManager<SharedChain, SharedApi>,
    calculator: DefaultRelayFeeCalculator,
    destination_analyser: DefaultDestinationAnalyser<SharedChain>,
    transit_manager: DefaultTransitTokenAccountManager<SharedChain, SharedRegistry>,
}

impl FeeRelayer {
    /// 使用配置创建客户端（RPC + reqwest HTTP 客户端）
    pub fn new(config: FeeRelayerConfig, owner: Pubkey) -> AnyResult<Self> {
        let rpc: SharedChain =
            Arc::new(SolanaRpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment));
        let api: SharedApi = Arc::new(ApiClient::new(&config)?);
        Ok(Self::with_components(config, owner, rpc, api, Arc::new(StaticTokenRegistry::default())))
    }

    /// 使用自定义组件创建客户端（测试或自定义传输层）
    pub fn with_components(
        config: FeeRelayerConfig,
        owner: Pubkey,
        chain: SharedChain,
        api: SharedApi,
        registry: SharedRegistry,
    ) -> Self {
        let program = RelayProgram::new(config.network);
        let context_manager = RelayContextManager::new(owner, program, chain.clone(), api.clone())
            .with_free_transactions(config.free_transactions_enabled);

        Self {
            owner,
            program,
            api,
            context_manager,
            calculator: DefaultRelayFeeCalculator::new(),
            destination_analyser: DefaultDestinationAnalyser::new(chain.clone()),
            transit_manager: DefaultTransitTokenAccountManager::new(owner, program, chain, registry),
            config,
        }
    }

    pub fn config(&self) -> &FeeRelayerConfig {
        &self.config
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    pub fn relay_program(&self) -> &RelayProgram {
        &self.program
    }

    pub fn context_manager(&self) -> &RelayContextManager<SharedChain, SharedApi> {
        &self.context_manager
    }

    pub fn api(&self) -> &SharedApi {
        &self.api
    }

    // ===== 手续费计算 =====

    /// Refresh the relay context, then compute the top-up needed for `expected_fee`
    pub async fn calculate_needed_top_up_amount(
        &self,
        expected_fee: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> RelayResult<FeeAmount> {
        let context = self.context_manager.update().await?;
        Ok(self.calculate_with_context(&context, expected_fee, paying_token_mint))
    }

    /// Same computation against a context the caller already holds
    pub fn calculate_with_context(
        &self,
        context: &RelayContext,
        expected_fee: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> FeeAmount {
        self.calculator.calculate_needed_top_up_amount(context, expected_fee, paying_token_mint)
    }

    pub async fn calculate_fee_in_paying_token(
        &self,
        pools: &dyn TradablePoolsProvider,
        fee_in_sol: FeeAmount,
        paying_token_mint: &Pubkey,
    ) -> RelayResult<FeeAmount> {
        self.calculator.calculate_fee_in_paying_token(pools, fee_in_sol, paying_token_mint).await
    }

    // ===== 账户分析 =====

    pub async fn analyse_destination(&self, owner: &Pubkey, mint: &Pubkey) -> RelayResult<DestinationInfo> {
        self.destination_analyser.analyse_destination(owner, mint).await
    }

    pub async fn analyse_destinations(&self, targets: &[(Pubkey, Pubkey)]) -> RelayResult<Vec<DestinationInfo>> {
        self.destination_analyser.analyse_destinations(targets).await
    }

    pub fn get_transit_token(&self, pools: &[Pool]) -> Option<TokenAccount> {
        self.transit_manager.get_transit_token(pools)
    }

    pub async fn check_if_needs_create_transit_token_account(&self, transit_token: &TokenAccount) -> RelayResult<bool> {
        self.transit_manager.check_if_needs_create_transit_token_account(transit_token).await
    }

    /// Instructions creating the transit account of a two-pool route. Empty for a direct
    /// route or when the account already exists.
    pub async fn prepare_transit_token_account(&self, pools: &[Pool]) -> RelayResult<Vec<Instruction>> {
        if pools.len() != 2 {
            return Ok(Vec::new());
        }
        let transit = self.transit_manager.get_transit_token(pools).ok_or(RelayError::TransitTokenMintNotFound)?;
        if !self.transit_manager.check_if_needs_create_transit_token_account(&transit).await? {
            return Ok(Vec::new());
        }

        let context = self.context_manager.get_current_context_or_update().await?;
        Ok(vec![self.program.create_transit_token_account_instruction(
            &context.fee_payer_address,
            &self.owner,
            &transit.address,
            &transit.mint,
        )])
    }

    /// Instruction paying `expected_fee` from the user's relay account to the fee payer,
    /// appended after the swap of a top-up transaction
    pub async fn relay_fee_transfer_instruction(&self, expected_fee: FeeAmount) -> RelayResult<Instruction> {
        let context = self.context_manager.get_current_context_or_update().await?;
        Ok(self.program.transfer_sol_instruction(&self.owner, &context.fee_payer_address, expected_fee.total()))
    }

    // ===== 提交 =====

    pub async fn relay_transaction(&self, param: RelayTransactionParam) -> RelayResult<String> {
        self.api.send_transaction(&RequestType::RelayTransaction(param)).await
    }

    /// Server co-signs and relays; returns the fee payer signature
    pub async fn sign_relay_transaction(&self, param: RelayTransactionParam) -> RelayResult<String> {
        self.api.send_transaction(&RequestType::SignRelayTransaction(param)).await
    }

    pub async fn transfer_sol(&self, params: TransferSolParams) -> RelayResult<String> {
        self.api.send_transaction(&RequestType::TransferSol(params)).await
    }

    /// Submit a top-up and record the consumed free quota on success
    pub async fn top_up_with_swap(&self, params: TopUpWithSwapParams) -> RelayResult<String> {
        let signature = self.api.send_transaction(&RequestType::RelayTopUpWithSwap(params)).await?;
        if self.context_manager.current_context().is_some() {
            self.context_manager.record_top_up()?;
        }
        Ok(signature)
    }
}
