use crate::ports::outbound::{PoolRegistry, PoolStatus};
use shared_types::PoolId;
use std::collections::BTreeMap;

/// Pool registry backed by a map, for tests and single-process hosts.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPoolRegistry {
    pools: BTreeMap<PoolId, PoolStatus>,
}

impl InMemoryPoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pools(pool_ids: impl IntoIterator<Item = PoolId>) -> Self {
        Self {
            pools: pool_ids
                .into_iter()
                .map(|id| (id, PoolStatus::Active))
                .collect(),
        }
    }

    pub fn set_status(&mut self, pool_id: PoolId, status: PoolStatus) {
        self.pools.insert(pool_id, status);
    }
}

impl PoolRegistry for InMemoryPoolRegistry {
    fn pool_status(&self, pool_id: PoolId) -> Option<PoolStatus> {
        self.pools.get(&pool_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_registry() {
        let mut registry = InMemoryPoolRegistry::with_pools([0, 1]);
        assert!(registry.pool_exists(1));
        assert!(!registry.pool_exists(2));

        registry.set_status(1, PoolStatus::Disabled);
        assert_eq!(registry.pool_status(1), Some(PoolStatus::Disabled));
    }
}
