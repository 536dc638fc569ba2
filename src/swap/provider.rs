use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use super::pool::{Pool, PoolsPair};
use crate::common::RelayResult;
use crate::utils::token::TokenRegistry;

/// Source of swap routes between two mints
#[async_trait]
pub trait TradablePoolsProvider: Send + Sync {
    /// Direct and one-hop routes, every pool oriented from `from_mint` towards `to_mint`
    async fn get_tradable_pools_pairs(&self, from_mint: &Pubkey, to_mint: &Pubkey) -> RelayResult<Vec<PoolsPair>>;
}

/// Routes computed from a fixed pool list
pub struct StaticPoolsProvider<R> {
    pools: Vec<Pool>,
    registry: R,
}

impl<R: TokenRegistry> StaticPoolsProvider<R> {
    pub fn new(pools: Vec<Pool>, registry: R) -> Self {
        let pools = pools.into_iter().filter(|p| p.deprecated != Some(true)).collect();
        Self { pools, registry }
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// 按 from -> to 的方向返回池子，方向相反时翻转
    fn orient(pool: &Pool, from: &str, to: &str) -> Option<Pool> {
        if pool.token_a_name == from && pool.token_b_name == to {
            Some(pool.clone())
        } else if pool.token_a_name == to && pool.token_b_name == from {
            Some(pool.reversed())
        } else {
            None
        }
    }

    fn other_side<'a>(pool: &'a Pool, symbol: &str) -> Option<&'a str> {
        if pool.token_a_name == symbol {
            Some(&pool.token_b_name)
        } else if pool.token_b_name == symbol {
            Some(&pool.token_a_name)
        } else {
            None
        }
    }

    fn routes(&self, from: &str, to: &str) -> Vec<PoolsPair> {
        let mut routes: Vec<PoolsPair> = self
            .pools
            .iter()
            .filter_map(|pool| Self::orient(pool, from, to))
            .map(|pool| PoolsPair::new(vec![pool]))
            .collect();

        for (i, first) in self.pools.iter().enumerate() {
            let Some(transit) = Self::other_side(first, from) else { continue };
            if transit == to {
                continue;
            }
            let Some(first) = Self::orient(first, from, transit) else { continue };
            for (j, second) in self.pools.iter().enumerate() {
                if i == j {
                    continue;
                }
                if let Some(second) = Self::orient(second, transit, to) {
                    routes.push(PoolsPair::new(vec![first.clone(), second]));
                }
            }
        }
        routes
    }
}

#[async_trait]
impl<R: TokenRegistry> TradablePoolsProvider for StaticPoolsProvider<R> {
    async fn get_tradable_pools_pairs(&self, from_mint: &Pubkey, to_mint: &Pubkey) -> RelayResult<Vec<PoolsPair>> {
        let (Some(from), Some(to)) = (self.registry.symbol(from_mint), self.registry.symbol(to_mint)) else {
            tracing::warn!("no symbol registered for {} or {}", from_mint, to_mint);
            return Ok(Vec::new());
        };
        Ok(self.routes(&from, &to))
    }
}
