//! The keyspace adapter. Redis sees one namespace of dynamically typed keys, the backend stores
//! every type in its own table. Each table is wrapped by a store implementing [`Family`], and
//! [`Database`] fans the type-agnostic operations out over the families in priority order.

mod hash;
mod placeholder;
mod set;
mod string;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use strum_macros::Display;
use thiserror::Error as ThisError;

use crate::backend::{Backend, BackendError};

pub use hash::HashStore;
pub use placeholder::PlaceholderStore;
pub use set::SetStore;
pub use string::{SetCondition, SetTtl, StringStore};

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum KeyType {
    String,
    Hash,
    List,
    Zset,
    Set,
    None,
}

/// Remaining time to live of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTtl {
    Missing,
    Persistent,
    /// Milliseconds left.
    ExpiresIn(i64),
}

impl KeyTtl {
    /// Reply of `TTL`: -2 when missing, -1 without expiration, otherwise rounded seconds.
    pub fn as_secs(&self) -> i64 {
        match self {
            KeyTtl::Missing => -2,
            KeyTtl::Persistent => -1,
            KeyTtl::ExpiresIn(millis) => (millis + 500) / 1000,
        }
    }

    /// Reply of `PTTL`.
    pub fn as_millis(&self) -> i64 {
        match self {
            KeyTtl::Missing => -2,
            KeyTtl::Persistent => -1,
            KeyTtl::ExpiresIn(millis) => *millis,
        }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum StoreError {
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR value is not a valid float")]
    NotAFloat,
    #[error("ERR increment or decrement would overflow")]
    Overflow,
    #[error("ERR increment would produce NaN or Infinity")]
    NanOrInfinity,
    #[error("ERR hash value is not an integer")]
    HashNotAnInteger,
    #[error("ERR hash value is not a float")]
    HashNotAFloat,
    #[error("ERR string exceeds maximum allowed size (proto-max-bulk-len)")]
    StringTooLong,
    #[error("ERR offset is out of range")]
    OffsetOutOfRange,
    #[error("ERR {0}")]
    Backend(#[from] BackendError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Operations every per-type store implements so the keyspace can be treated as unified. Counts
/// are 0 or 1 for a single key.
#[async_trait]
pub trait Family: Send + Sync {
    fn key_type(&self) -> KeyType;

    async fn exists(&self, key: &Bytes) -> StoreResult<u64>;

    /// Removes every row of the key.
    async fn delete(&self, key: &Bytes) -> StoreResult<u64>;

    /// Stamps every row of the key with `at`, unix time in milliseconds.
    async fn expire_at(&self, key: &Bytes, at: i64) -> StoreResult<u64>;

    /// Clears the expiration of every row. Returns 1 only if a timestamp was cleared.
    async fn persist(&self, key: &Bytes) -> StoreResult<u64>;

    async fn ttl(&self, key: &Bytes) -> StoreResult<KeyTtl>;
}

/// A logical database. It is only a selector, every row carries the database id.
#[derive(Clone)]
pub struct Database {
    pub namespace: Arc<str>,
    pub id: u32,
    pub strings: StringStore,
    pub hashes: HashStore,
    pub lists: PlaceholderStore,
    pub zsets: PlaceholderStore,
    pub sets: SetStore,
}

impl Database {
    pub fn new(backend: Arc<dyn Backend>, namespace: Arc<str>, id: u32) -> Self {
        Self {
            namespace,
            id,
            strings: StringStore::new(backend.clone(), id),
            hashes: HashStore::new(backend.clone(), id),
            lists: PlaceholderStore::new(KeyType::List),
            zsets: PlaceholderStore::new(KeyType::Zset),
            sets: SetStore::new(backend, id),
        }
    }

    /// Families in priority order, the first one holding a key defines its type.
    fn families(&self) -> [&dyn Family; 5] {
        [
            &self.strings,
            &self.hashes,
            &self.lists,
            &self.zsets,
            &self.sets,
        ]
    }

    pub async fn key_type(&self, key: &Bytes) -> StoreResult<KeyType> {
        for family in self.families() {
            if family.exists(key).await? > 0 {
                return Ok(family.key_type());
            }
        }
        Ok(KeyType::None)
    }

    /// Counts every family holding each key, a key present in two families counts twice.
    pub async fn exists(&self, keys: &[Bytes]) -> StoreResult<u64> {
        let mut count = 0;
        for key in keys {
            for family in self.families() {
                count += family.exists(key).await?;
            }
        }
        Ok(count)
    }

    /// Deletes the keys from every family. Returns the number of (key, family) pairs removed.
    pub async fn delete(&self, keys: &[Bytes]) -> StoreResult<u64> {
        let mut count = 0;
        for key in keys {
            for family in self.families() {
                count += family.delete(key).await?;
            }
        }
        Ok(count)
    }

    /// Only the first family holding the key receives the timestamp.
    pub async fn expire_at(&self, key: &Bytes, at: i64) -> StoreResult<u64> {
        for family in self.families() {
            let affected = family.expire_at(key, at).await?;
            if affected > 0 {
                return Ok(affected);
            }
        }
        Ok(0)
    }

    pub async fn persist(&self, key: &Bytes) -> StoreResult<u64> {
        for family in self.families() {
            let affected = family.persist(key).await?;
            if affected > 0 {
                return Ok(affected);
            }
        }
        Ok(0)
    }

    pub async fn ttl(&self, key: &Bytes) -> StoreResult<KeyTtl> {
        for family in self.families() {
            match family.ttl(key).await? {
                KeyTtl::Missing => continue,
                ttl => return Ok(ttl),
            }
        }
        Ok(KeyTtl::Missing)
    }

    /// Number of distinct keys per family, summed. Keys held by two families count twice.
    pub async fn key_count(&self) -> StoreResult<u64> {
        Ok(self.strings.key_count().await?
            + self.hashes.key_count().await?
            + self.sets.key_count().await?)
    }
}

/// Every logical database of the server, created at start up.
pub struct Keyspace {
    databases: Vec<Database>,
}

impl Keyspace {
    pub fn new(backend: Arc<dyn Backend>, namespace: &str, databases: usize) -> Self {
        let namespace: Arc<str> = Arc::from(namespace);
        let databases = (0..databases.max(1))
            .map(|id| Database::new(backend.clone(), namespace.clone(), id as u32))
            .collect();

        Self { databases }
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Database> {
        self.databases.get(index)
    }

    /// Panics if `index` is out of range, sessions only hold validated indexes.
    pub fn database(&self, index: usize) -> &Database {
        &self.databases[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Database> {
        self.databases.iter()
    }
}
