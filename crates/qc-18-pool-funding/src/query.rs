//! Read models and pagination for funding queries.

use crate::domain::entities::{Funder, Funding, FundingState};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Coins, PoolId};

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Offset pagination request. A limit of zero means the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    pub fn first(limit: usize) -> Self {
        Self::new(0, limit)
    }

    /// The limit actually applied.
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            0 => DEFAULT_PAGE_LIMIT,
            n => n.min(MAX_PAGE_LIMIT),
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matching items across all pages.
    pub total: usize,
    /// Offset of the next page, `None` on the last page.
    pub next_offset: Option<usize>,
}

impl<T> Page<T> {
    /// Cuts one page out of the full, ordered result set.
    pub fn paginate(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let limit = request.effective_limit();
        let items: Vec<T> = all.into_iter().skip(request.offset).take(limit).collect();
        let end = request.offset.saturating_add(items.len());
        Self {
            next_offset: (end < total).then_some(end),
            items,
            total,
        }
    }
}

/// Funding filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingStatus {
    #[default]
    All,
    Active,
    Inactive,
}

impl FundingStatus {
    pub fn matches(&self, funding: &Funding) -> bool {
        match self {
            Self::All => true,
            Self::Active => funding.is_active(),
            Self::Inactive => !funding.is_active(),
        }
    }
}

/// Aggregates over all fundings of one funder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunderStats {
    /// Σ total_charged.
    pub total_used: Coins,
    /// Σ balances.
    pub total_allocated: Coins,
    /// Σ per-bundle rate of active fundings.
    pub total_per_bundle: Coins,
    /// Pools with an active funding, ascending.
    pub pools_funded: Vec<PoolId>,
}

impl FunderStats {
    pub fn from_fundings(fundings: &[Funding]) -> Self {
        let mut pools_funded: Vec<PoolId> = fundings
            .iter()
            .filter(|f| f.is_active())
            .map(|f| f.pool_id)
            .collect();
        pools_funded.sort_unstable();

        Self {
            total_used: sum_coins(fundings.iter().map(|f| &f.total_charged)),
            total_allocated: sum_coins(fundings.iter().map(|f| &f.balances)),
            total_per_bundle: sum_coins(
                fundings
                    .iter()
                    .filter(|f| f.is_active())
                    .map(|f| &f.per_bundle_rate),
            ),
            pools_funded,
        }
    }
}

fn sum_coins<'a>(amounts: impl Iterator<Item = &'a Coins>) -> Coins {
    amounts
        .flat_map(|coins| coins.iter().map(|(denom, amount)| (denom.clone(), *amount)))
        .collect()
}

/// A funder with its funding statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunderView {
    pub funder: Funder,
    pub stats: FunderStats,
}

/// Active-set summary of one pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingStateView {
    pub pool_id: PoolId,
    pub active_funders: Vec<Address>,
    pub size: usize,
    pub capacity: usize,
}

impl FundingStateView {
    pub fn new(state: &FundingState, capacity: usize) -> Self {
        Self {
            pool_id: state.pool_id,
            active_funders: state.iter().copied().collect(),
            size: state.len(),
            capacity,
        }
    }
}

/// Case-insensitive moniker substring match. `None` or empty matches all.
pub fn moniker_matches(funder: &Funder, search: Option<&str>) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        None => true,
        Some(needle) => funder
            .moniker
            .to_lowercase()
            .contains(&needle.to_lowercase()),
    }
}
