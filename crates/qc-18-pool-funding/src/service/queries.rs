//! # Pool Funding Service - Queries

use super::*;
use crate::domain::entities::Funding;
use crate::domain::ranking::get_lowest_funding;
use crate::ports::inbound::FundingQueryApi;
use crate::query::{
    moniker_matches, FunderStats, FunderView, FundingStateView, FundingStatus, Page, PageRequest,
};
use shared_types::PoolId;

impl<KV, B, P, E> FundingQueryApi for FundingService<KV, B, P, E>
where
    KV: KeyValueStore,
    B: BankKeeper,
    P: PoolRegistry,
    E: FundingEventPublisher,
{
    fn get_funder(&self, address: &Address) -> Result<FunderView, FundingError> {
        let funder = self
            .store
            .get_funder(address)?
            .ok_or(FundingError::FunderNotFound { address: *address })?;
        let fundings = self.store.fundings_by_funder(address)?;
        Ok(FunderView {
            funder,
            stats: FunderStats::from_fundings(&fundings),
        })
    }

    fn list_funders(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<FunderView>, FundingError> {
        let matching: Vec<_> = self
            .store
            .all_funders()?
            .into_iter()
            .filter(|funder| moniker_matches(funder, search))
            .collect();

        let page = Page::paginate(matching, page);
        let mut items = Vec::with_capacity(page.items.len());
        for funder in page.items {
            let fundings = self.store.fundings_by_funder(&funder.address)?;
            items.push(FunderView {
                funder,
                stats: FunderStats::from_fundings(&fundings),
            });
        }
        Ok(Page {
            items,
            total: page.total,
            next_offset: page.next_offset,
        })
    }

    fn get_funding(&self, funder: &Address, pool_id: PoolId) -> Result<Funding, FundingError> {
        self.store
            .get_funding(funder, pool_id)?
            .ok_or(FundingError::FundingNotFound {
                funder: *funder,
                pool_id,
            })
    }

    fn fundings_by_funder(
        &self,
        funder: &Address,
        status: FundingStatus,
        page: PageRequest,
    ) -> Result<Page<Funding>, FundingError> {
        let fundings = self
            .store
            .fundings_by_funder(funder)?
            .into_iter()
            .filter(|f| status.matches(f))
            .collect();
        Ok(Page::paginate(fundings, page))
    }

    fn fundings_by_pool(
        &self,
        pool_id: PoolId,
        status: FundingStatus,
        page: PageRequest,
    ) -> Result<Page<Funding>, FundingError> {
        let fundings = self
            .store
            .fundings_by_pool(pool_id)?
            .into_iter()
            .filter(|f| status.matches(f))
            .collect();
        Ok(Page::paginate(fundings, page))
    }

    fn funding_state(&self, pool_id: PoolId) -> Result<FundingStateView, FundingError> {
        let state = self
            .store
            .get_funding_state(pool_id)?
            .ok_or(FundingError::FundingStateNotFound { pool_id })?;
        Ok(FundingStateView::new(
            &state,
            self.config.params.max_active_funders,
        ))
    }

    fn lowest_funding(&self, pool_id: PoolId) -> Result<Option<Funding>, FundingError> {
        let state = self
            .store
            .get_funding_state(pool_id)?
            .ok_or(FundingError::FundingStateNotFound { pool_id })?;
        if state.is_empty() {
            return Ok(None);
        }
        let active = self.store.active_fundings(&state)?;
        let lowest = get_lowest_funding(&active, &self.config.params)?;
        Ok(Some(lowest.funding.clone()))
    }
}
