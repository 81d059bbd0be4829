use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::backend::{Backend, BackendError, Delta, Mutation, Row, RowKey, Table};
use crate::keyspace::{Family, KeyTtl, KeyType, StoreError, StoreResult};
use crate::utils::time::now_millis;
use crate::utils::{bits, number, range};

/// When a `SET` applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SetCondition {
    Always,
    /// `NX`
    IfAbsent,
    /// `XX`
    IfPresent,
}

/// What a `SET` does with the key's expiration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SetTtl {
    Clear,
    /// Unix time in milliseconds.
    At(i64),
    /// `KEEPTTL`
    Keep,
}

/// String values, one row per key in `modis_string_table`.
#[derive(Clone)]
pub struct StringStore {
    backend: Arc<dyn Backend>,
    db: u32,
}

impl StringStore {
    pub fn new(backend: Arc<dyn Backend>, db: u32) -> Self {
        Self { backend, db }
    }

    fn row_key(&self, key: &Bytes) -> RowKey {
        RowKey::new(self.db, key.clone())
    }

    async fn row(&self, key: &Bytes) -> StoreResult<Option<Row>> {
        Ok(self.backend.get(Table::String, &self.row_key(key)).await?)
    }

    pub async fn get(&self, key: &Bytes) -> StoreResult<Option<Bytes>> {
        Ok(self.row(key).await?.map(|row| row.value))
    }

    /// Creates or replaces the value, replacing its expiration as well.
    pub async fn set(&self, key: &Bytes, value: Bytes, expire_at: Option<i64>) -> StoreResult<()> {
        let row = Row::new(self.row_key(key), value, expire_at);
        Ok(self.backend.put(Table::String, row).await?)
    }

    /// Conditional `SET`. Returns whether the value was written.
    pub async fn set_with(
        &self,
        key: &Bytes,
        value: Bytes,
        condition: SetCondition,
        ttl: SetTtl,
    ) -> StoreResult<bool> {
        if condition == SetCondition::IfAbsent {
            // Nothing to keep on a key that does not exist.
            let expire_at = match ttl {
                SetTtl::At(at) => Some(at),
                SetTtl::Clear | SetTtl::Keep => None,
            };
            return self.set_if_absent(key, value, expire_at).await;
        }

        let current = match (condition, ttl) {
            (SetCondition::IfPresent, _) | (_, SetTtl::Keep) => self.row(key).await?,
            _ => None,
        };

        if condition == SetCondition::IfPresent && current.is_none() {
            return Ok(false);
        }

        let expire_at = match ttl {
            SetTtl::Clear => None,
            SetTtl::At(at) => Some(at),
            SetTtl::Keep => current.and_then(|row| row.expire_at),
        };

        self.set(key, value, expire_at).await?;
        Ok(true)
    }

    /// Inserts the value only if the key has no live row. A conflict from the backend means the
    /// key already exists.
    pub async fn set_if_absent(
        &self,
        key: &Bytes,
        value: Bytes,
        expire_at: Option<i64>,
    ) -> StoreResult<bool> {
        let row = Row::new(self.row_key(key), value, expire_at);

        match self.backend.insert(Table::String, row).await {
            Ok(()) => Ok(true),
            Err(BackendError::Conflict) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces the value and returns the previous one. Not atomic, a concurrent writer may
    /// slip in between the read and the write.
    pub async fn get_set(&self, key: &Bytes, value: Bytes) -> StoreResult<Option<Bytes>> {
        let previous = self.get(key).await?;
        self.set(key, value, None).await?;
        Ok(previous)
    }

    pub async fn mget(&self, keys: &[Bytes]) -> StoreResult<Vec<Option<Bytes>>> {
        let row_keys: Vec<RowKey> = keys.iter().map(|key| self.row_key(key)).collect();
        let rows = self.backend.get_many(Table::String, &row_keys).await?;

        Ok(rows.into_iter().map(|row| row.map(|row| row.value)).collect())
    }

    pub async fn mset(&self, pairs: Vec<(Bytes, Bytes)>) -> StoreResult<()> {
        let mutations = pairs
            .into_iter()
            .map(|(key, value)| Mutation::Put(Row::new(self.row_key(&key), value, None)))
            .collect();

        self.backend.batch(Table::String, mutations).await?;
        Ok(())
    }

    pub async fn strlen(&self, key: &Bytes) -> StoreResult<usize> {
        Ok(self.get(key).await?.map_or(0, |value| value.len()))
    }

    /// Returns the length of the value after appending.
    pub async fn append(&self, key: &Bytes, suffix: Bytes) -> StoreResult<usize> {
        let len = self.strlen(key).await?;
        if len + suffix.len() > range::MAX_STRING_LEN {
            return Err(StoreError::StringTooLong);
        }

        Ok(self
            .backend
            .append(Table::String, &self.row_key(key), suffix)
            .await?)
    }

    pub async fn incr_by(&self, key: &Bytes, delta: i64) -> StoreResult<i64> {
        let text = self
            .backend
            .increment(Table::String, &self.row_key(key), Delta::Integer(delta))
            .await
            .map_err(|err| match err {
                BackendError::NotANumber => StoreError::NotAnInteger,
                BackendError::Overflow => StoreError::Overflow,
                err => err.into(),
            })?;

        number::normalize_decimal(&text)
            .parse::<i64>()
            .map_err(|_| StoreError::NotAnInteger)
    }

    /// Returns the new value as decimal text.
    pub async fn incr_by_float(&self, key: &Bytes, delta: f64) -> StoreResult<String> {
        let text = self
            .backend
            .increment(Table::String, &self.row_key(key), Delta::Float(delta))
            .await
            .map_err(|err| match err {
                BackendError::NotANumber => StoreError::NotAFloat,
                BackendError::Overflow => StoreError::NanOrInfinity,
                err => err.into(),
            })?;

        Ok(number::normalize_decimal(&text))
    }

    pub async fn get_range(&self, key: &Bytes, start: i64, end: i64) -> StoreResult<Bytes> {
        Ok(self
            .get(key)
            .await?
            .map(|value| range::get(&value, start, end))
            .unwrap_or_default())
    }

    /// Overwrites part of the value starting at `offset`, keeping the key's expiration. Returns
    /// the new length. A negative `offset` counts from the end of the current value.
    pub async fn set_range(&self, key: &Bytes, offset: i64, value: Bytes) -> StoreResult<usize> {
        let current = self.row(key).await?;
        let current_len = current.as_ref().map_or(0, |row| row.value.len());
        let offset =
            range::resolve_offset(current_len, offset).ok_or(StoreError::OffsetOutOfRange)?;

        // An empty write never creates the key.
        if value.is_empty() {
            return Ok(current_len);
        }
        if offset.saturating_add(value.len()) > range::MAX_STRING_LEN {
            return Err(StoreError::StringTooLong);
        }

        let (current, expire_at) = match current {
            Some(row) => (row.value, row.expire_at),
            None => (Bytes::new(), None),
        };

        let new_value = range::set(&current, offset, &value);
        let len = new_value.len();
        self.set(key, Bytes::from(new_value), expire_at).await?;

        Ok(len)
    }

    /// Returns the previous bit.
    pub async fn set_bit(&self, key: &Bytes, offset: u64, bit: bool) -> StoreResult<u8> {
        let (mut value, expire_at) = match self.row(key).await? {
            Some(row) => (row.value.to_vec(), row.expire_at),
            None => (Vec::new(), None),
        };

        let previous = bits::set_bit(&mut value, offset, bit);
        self.set(key, Bytes::from(value), expire_at).await?;

        Ok(previous)
    }

    pub async fn get_bit(&self, key: &Bytes, offset: u64) -> StoreResult<u8> {
        Ok(self
            .get(key)
            .await?
            .map_or(0, |value| bits::get_bit(&value, offset)))
    }

    pub async fn bit_count(&self, key: &Bytes, bytes: Option<(i64, i64)>) -> StoreResult<u64> {
        Ok(self
            .get(key)
            .await?
            .map_or(0, |value| bits::count(&value, bytes)))
    }

    pub async fn key_count(&self) -> StoreResult<u64> {
        Ok(self.backend.count_keys(Table::String, self.db).await?)
    }
}

#[async_trait]
impl Family for StringStore {
    fn key_type(&self) -> KeyType {
        KeyType::String
    }

    async fn exists(&self, key: &Bytes) -> StoreResult<u64> {
        Ok(self.row(key).await?.is_some() as u64)
    }

    async fn delete(&self, key: &Bytes) -> StoreResult<u64> {
        Ok(self.backend.delete(Table::String, &self.row_key(key)).await? as u64)
    }

    async fn expire_at(&self, key: &Bytes, at: i64) -> StoreResult<u64> {
        Ok(self
            .backend
            .set_expire(Table::String, &self.row_key(key), Some(at))
            .await? as u64)
    }

    async fn persist(&self, key: &Bytes) -> StoreResult<u64> {
        match self.row(key).await? {
            Some(row) if row.expire_at.is_some() => Ok(self
                .backend
                .set_expire(Table::String, &row.key, None)
                .await? as u64),
            _ => Ok(0),
        }
    }

    async fn ttl(&self, key: &Bytes) -> StoreResult<KeyTtl> {
        Ok(match self.row(key).await? {
            None => KeyTtl::Missing,
            Some(Row {
                expire_at: None, ..
            }) => KeyTtl::Persistent,
            Some(Row {
                expire_at: Some(at),
                ..
            }) => KeyTtl::ExpiresIn((at - now_millis()).max(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn store() -> StringStore {
        StringStore::new(Arc::new(MemoryBackend::new()), 0)
    }

    #[tokio::test]
    async fn set_if_absent_reports_existing_keys() {
        let store = store();
        let key = Bytes::from("key1");

        assert!(store
            .set_if_absent(&key, Bytes::from("1"), None)
            .await
            .unwrap());
        assert!(!store
            .set_if_absent(&key, Bytes::from("2"), None)
            .await
            .unwrap());
        assert_eq!(store.get(&key).await.unwrap(), Some(Bytes::from("1")));
    }

    #[tokio::test]
    async fn set_with_conditions_and_ttl() {
        let store = store();
        let key = Bytes::from("key1");
        let later = now_millis() + 60_000;

        assert!(!store
            .set_with(&key, Bytes::from("1"), SetCondition::IfPresent, SetTtl::Clear)
            .await
            .unwrap());
        assert!(store
            .set_with(&key, Bytes::from("1"), SetCondition::Always, SetTtl::At(later))
            .await
            .unwrap());
        assert!(store
            .set_with(&key, Bytes::from("2"), SetCondition::IfPresent, SetTtl::Keep)
            .await
            .unwrap());

        assert!(matches!(store.ttl(&key).await.unwrap(), KeyTtl::ExpiresIn(_)));
        assert_eq!(store.get(&key).await.unwrap(), Some(Bytes::from("2")));

        store
            .set_with(&key, Bytes::from("3"), SetCondition::Always, SetTtl::Clear)
            .await
            .unwrap();
        assert_eq!(store.ttl(&key).await.unwrap(), KeyTtl::Persistent);
    }

    #[tokio::test]
    async fn increments() {
        let store = store();
        let key = Bytes::from("counter");

        assert_eq!(store.incr_by(&key, 10).await.unwrap(), 10);
        assert_eq!(store.incr_by(&key, -15).await.unwrap(), -5);
        assert_eq!(store.incr_by_float(&key, 5.5).await.unwrap(), "0.5");

        assert_eq!(
            store.incr_by(&key, 1).await.unwrap_err(),
            StoreError::NotAnInteger
        );

        store.set(&key, Bytes::from(i64::MAX.to_string()), None).await.unwrap();
        assert_eq!(store.incr_by(&key, 1).await.unwrap_err(), StoreError::Overflow);

        store.set(&key, Bytes::from("abc"), None).await.unwrap();
        assert_eq!(
            store.incr_by_float(&key, 1.0).await.unwrap_err(),
            StoreError::NotAFloat
        );
    }

    #[tokio::test]
    async fn set_range_pads_and_keeps_ttl() {
        let store = store();
        let key = Bytes::from("key1");
        let later = now_millis() + 60_000;

        store.set(&key, Bytes::from("Hello"), Some(later)).await.unwrap();

        assert_eq!(
            store.set_range(&key, 7, Bytes::from("World")).await.unwrap(),
            12
        );
        assert_eq!(
            store.get(&key).await.unwrap(),
            Some(Bytes::from_static(b"Hello\0\0World"))
        );
        assert!(matches!(store.ttl(&key).await.unwrap(), KeyTtl::ExpiresIn(_)));

        // Empty writes leave missing keys missing.
        let missing = Bytes::from("missing");
        assert_eq!(store.set_range(&missing, 3, Bytes::new()).await.unwrap(), 0);
        assert_eq!(store.exists(&missing).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_range_negative_offsets() {
        let store = store();
        let key = Bytes::from("key1");

        store.set(&key, Bytes::from("Hello World"), None).await.unwrap();

        assert_eq!(
            store.set_range(&key, -5, Bytes::from("Redis")).await.unwrap(),
            11
        );
        assert_eq!(store.get(&key).await.unwrap(), Some(Bytes::from("Hello Redis")));
        assert!(matches!(
            store.set_range(&key, -12, Bytes::from("x")).await,
            Err(StoreError::OffsetOutOfRange)
        ));
        assert!(matches!(
            store.set_range(&Bytes::from("missing"), -1, Bytes::from("x")).await,
            Err(StoreError::OffsetOutOfRange)
        ));
    }

    #[tokio::test]
    async fn bits() {
        let store = store();
        let key = Bytes::from("bits");

        assert_eq!(store.set_bit(&key, 7, true).await.unwrap(), 0);
        assert_eq!(store.set_bit(&key, 7, true).await.unwrap(), 1);
        assert_eq!(store.get_bit(&key, 7).await.unwrap(), 1);
        assert_eq!(store.get_bit(&key, 100).await.unwrap(), 0);
        assert_eq!(store.bit_count(&key, None).await.unwrap(), 1);
        assert_eq!(store.get(&key).await.unwrap(), Some(Bytes::from_static(&[1])));
    }

    #[tokio::test]
    async fn persist_only_counts_cleared_timestamps() {
        let store = store();
        let key = Bytes::from("key1");

        store.set(&key, Bytes::from("v"), None).await.unwrap();
        assert_eq!(store.persist(&key).await.unwrap(), 0);

        store.expire_at(&key, now_millis() + 10_000).await.unwrap();
        assert_eq!(store.persist(&key).await.unwrap(), 1);
        assert_eq!(store.ttl(&key).await.unwrap(), KeyTtl::Persistent);
    }
}
