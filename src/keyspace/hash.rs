use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::{Backend, BackendError, Delta, Mutation, Row, RowKey, Table};
use crate::keyspace::{Family, KeyTtl, KeyType, StoreError, StoreResult};
use crate::utils::number;
use crate::utils::time::now_millis;

/// Hashes, one row per field in `modis_hash_table`. There is no row for the hash itself: its
/// length, fields and expiration all come from scanning the rows sharing `(db, key)`.
#[derive(Clone)]
pub struct HashStore {
    backend: Arc<dyn Backend>,
    db: u32,
}

impl HashStore {
    pub fn new(backend: Arc<dyn Backend>, db: u32) -> Self {
        Self { backend, db }
    }

    fn row_key(&self, key: &Bytes, field: &Bytes) -> RowKey {
        RowKey::with_field(self.db, key.clone(), field.clone())
    }

    async fn rows(&self, key: &Bytes, limit: Option<usize>) -> StoreResult<Vec<Row>> {
        Ok(self.backend.scan(Table::Hash, self.db, key, limit).await?)
    }

    /// Expiration shared by the rows of the key, new fields are stamped with it.
    async fn key_expire_at(&self, key: &Bytes) -> StoreResult<Option<i64>> {
        Ok(self
            .rows(key, Some(1))
            .await?
            .into_iter()
            .next()
            .and_then(|row| row.expire_at))
    }

    /// Sets the fields and returns how many of them did not exist.
    pub async fn set(&self, key: &Bytes, pairs: Vec<(Bytes, Bytes)>) -> StoreResult<u64> {
        let row_keys: Vec<RowKey> = pairs
            .iter()
            .map(|(field, _)| self.row_key(key, field))
            .collect();
        let existing = self.backend.get_many(Table::Hash, &row_keys).await?;

        let created = row_keys
            .iter()
            .zip(existing.iter())
            .filter(|(_, row)| row.is_none())
            .map(|(row_key, _)| row_key)
            .collect::<HashSet<_>>()
            .len() as u64;

        let expire_at = self.key_expire_at(key).await?;
        let mutations = row_keys
            .into_iter()
            .zip(pairs)
            .map(|(row_key, (_, value))| Mutation::Put(Row::new(row_key, value, expire_at)))
            .collect();

        self.backend.batch(Table::Hash, mutations).await?;
        Ok(created)
    }

    pub async fn set_if_absent(&self, key: &Bytes, field: &Bytes, value: Bytes) -> StoreResult<bool> {
        let expire_at = self.key_expire_at(key).await?;
        let row = Row::new(self.row_key(key, field), value, expire_at);

        match self.backend.insert(Table::Hash, row).await {
            Ok(()) => Ok(true),
            Err(BackendError::Conflict) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get(&self, key: &Bytes, field: &Bytes) -> StoreResult<Option<Bytes>> {
        Ok(self
            .backend
            .get(Table::Hash, &self.row_key(key, field))
            .await?
            .map(|row| row.value))
    }

    pub async fn mget(&self, key: &Bytes, fields: &[Bytes]) -> StoreResult<Vec<Option<Bytes>>> {
        let row_keys: Vec<RowKey> = fields.iter().map(|field| self.row_key(key, field)).collect();
        let rows = self.backend.get_many(Table::Hash, &row_keys).await?;

        Ok(rows.into_iter().map(|row| row.map(|row| row.value)).collect())
    }

    /// Returns the number of fields removed.
    pub async fn delete_fields(&self, key: &Bytes, fields: &[Bytes]) -> StoreResult<u64> {
        let mutations = fields
            .iter()
            .map(|field| Mutation::Delete(self.row_key(key, field)))
            .collect();
        let results = self.backend.batch(Table::Hash, mutations).await?;

        Ok(results.into_iter().filter(|deleted| *deleted).count() as u64)
    }

    /// Field and value pairs ordered by field.
    pub async fn get_all(&self, key: &Bytes) -> StoreResult<Vec<(Bytes, Bytes)>> {
        Ok(self
            .rows(key, None)
            .await?
            .into_iter()
            .map(|row| (row.field(), row.value))
            .collect())
    }

    pub async fn keys(&self, key: &Bytes) -> StoreResult<Vec<Bytes>> {
        Ok(self.rows(key, None).await?.iter().map(Row::field).collect())
    }

    pub async fn values(&self, key: &Bytes) -> StoreResult<Vec<Bytes>> {
        Ok(self
            .rows(key, None)
            .await?
            .into_iter()
            .map(|row| row.value)
            .collect())
    }

    pub async fn len(&self, key: &Bytes) -> StoreResult<u64> {
        Ok(self.backend.count(Table::Hash, self.db, key).await?)
    }

    pub async fn exists_field(&self, key: &Bytes, field: &Bytes) -> StoreResult<bool> {
        Ok(self.get(key, field).await?.is_some())
    }

    /// Increments through the backend, a new field row inherits the key's expiration.
    async fn increment(&self, key: &Bytes, field: &Bytes, delta: Delta) -> StoreResult<String> {
        let row_key = self.row_key(key, field);
        let created = self.backend.get(Table::Hash, &row_key).await?.is_none();
        let expire_at = if created {
            self.key_expire_at(key).await?
        } else {
            None
        };

        let text = self
            .backend
            .increment(Table::Hash, &row_key, delta)
            .await
            .map_err(|err| match (err, delta) {
                (BackendError::NotANumber, Delta::Integer(_)) => StoreError::HashNotAnInteger,
                (BackendError::NotANumber, Delta::Float(_)) => StoreError::HashNotAFloat,
                (BackendError::Overflow, Delta::Integer(_)) => StoreError::Overflow,
                (BackendError::Overflow, Delta::Float(_)) => StoreError::NanOrInfinity,
                (err, _) => err.into(),
            })?;

        if let Some(at) = expire_at {
            self.backend
                .set_expire(Table::Hash, &row_key, Some(at))
                .await?;
        }

        Ok(number::normalize_decimal(&text))
    }

    pub async fn incr_by(&self, key: &Bytes, field: &Bytes, delta: i64) -> StoreResult<i64> {
        self.increment(key, field, Delta::Integer(delta))
            .await?
            .parse::<i64>()
            .map_err(|_| StoreError::HashNotAnInteger)
    }

    pub async fn incr_by_float(&self, key: &Bytes, field: &Bytes, delta: f64) -> StoreResult<String> {
        self.increment(key, field, Delta::Float(delta)).await
    }

    pub async fn key_count(&self) -> StoreResult<u64> {
        Ok(self.backend.count_keys(Table::Hash, self.db).await?)
    }

    /// Applies the same mutation to every row of the key, one independent write per row.
    async fn for_each_row<F>(&self, key: &Bytes, mutation: F) -> StoreResult<u64>
    where
        F: Fn(Row) -> Option<Mutation> + Send,
    {
        let mutations: Vec<Mutation> = self
            .rows(key, None)
            .await?
            .into_iter()
            .filter_map(mutation)
            .collect();

        if mutations.is_empty() {
            return Ok(0);
        }

        let results = self.backend.batch(Table::Hash, mutations).await?;
        Ok(results.into_iter().any(|affected| affected) as u64)
    }
}

#[async_trait]
impl Family for HashStore {
    fn key_type(&self) -> KeyType {
        KeyType::Hash
    }

    async fn exists(&self, key: &Bytes) -> StoreResult<u64> {
        Ok(!self.rows(key, Some(1)).await?.is_empty() as u64)
    }

    async fn delete(&self, key: &Bytes) -> StoreResult<u64> {
        self.for_each_row(key, |row| Some(Mutation::Delete(row.key)))
            .await
    }

    async fn expire_at(&self, key: &Bytes, at: i64) -> StoreResult<u64> {
        self.for_each_row(key, |row| Some(Mutation::SetExpire(row.key, Some(at))))
            .await
    }

    async fn persist(&self, key: &Bytes) -> StoreResult<u64> {
        self.for_each_row(key, |row| {
            row.expire_at
                .map(|_| Mutation::SetExpire(row.key, None))
        })
        .await
    }

    async fn ttl(&self, key: &Bytes) -> StoreResult<KeyTtl> {
        Ok(match self.rows(key, Some(1)).await?.into_iter().next() {
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
