//! Funding ranking.
//!
//! Collapses a multi-currency balance into a [`Score`] using the whitelist
//! weights, and picks the lowest-ranked funding of a candidate set.

use crate::config::FundersParams;
use crate::domain::entities::Funding;
use crate::domain::errors::FundingError;
use crate::domain::value_objects::Score;
use shared_types::{Address, Coins};
use std::cmp::Ordering;

/// `Σ weight[c] * balance[c]`. Currencies without a weight count as zero.
pub fn score(balances: &Coins, params: &FundersParams) -> Score {
    balances.iter().fold(Score::zero(), |acc, (denom, amount)| {
        acc.accumulate(params.weight_of(denom).apply(*amount))
    })
}

/// A funding reference ordered by rank.
///
/// Lower score ranks lower; equal scores rank the smaller address lower.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedFunding<'a> {
    pub score: Score,
    pub funding: &'a Funding,
}

impl<'a> RankedFunding<'a> {
    pub fn new(funding: &'a Funding, params: &FundersParams) -> Self {
        Self {
            score: score(&funding.balances, params),
            funding,
        }
    }

    pub fn funder(&self) -> &Address {
        &self.funding.funder
    }
}

impl Ord for RankedFunding<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| self.funding.funder.cmp(&other.funding.funder))
    }
}

impl PartialOrd for RankedFunding<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the minimum-rank funding among `fundings`.
pub fn get_lowest_funding<'a>(
    fundings: &'a [Funding],
    params: &FundersParams,
) -> Result<RankedFunding<'a>, FundingError> {
    fundings
        .iter()
        .map(|funding| RankedFunding::new(funding, params))
        .min()
        .ok_or(FundingError::NoCandidates)
}
