use async_trait::async_trait;
use bytes::Bytes;

use crate::keyspace::{Family, KeyTtl, KeyType, StoreResult};

/// Family for data types without a backing table yet (lists and sorted sets). It never holds a
/// key, so it takes its slot in the priority order without affecting any result.
#[derive(Clone, Copy, Debug)]
pub struct PlaceholderStore {
    key_type: KeyType,
}

impl PlaceholderStore {
    pub fn new(key_type: KeyType) -> Self {
        Self { key_type }
    }
}

#[async_trait]
impl Family for PlaceholderStore {
    fn key_type(&self) -> KeyType {
        self.key_type
    }

    async fn exists(&self, _key: &Bytes) -> StoreResult<u64> {
        Ok(0)
    }

    async fn delete(&self, _key: &Bytes) -> StoreResult<u64> {
        Ok(0)
    }

    async fn expire_at(&self, _key: &Bytes, _at: i64) -> StoreResult<u64> {
        Ok(0)
    }

    async fn persist(&self, _key: &Bytes) -> StoreResult<u64> {
        Ok(0)
    }

    async fn ttl(&self, _key: &Bytes) -> StoreResult<KeyTtl> {
        Ok(KeyTtl::Missing)
    }
}
