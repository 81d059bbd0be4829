use async_trait::async_trait;
use bytes::Bytes;
use itertools::Itertools;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::sync::Arc;

use crate::backend::{Backend, Mutation, Row, RowKey, Table};
use crate::keyspace::{Family, KeyTtl, KeyType, StoreResult};
use crate::utils::time::now_millis;

/// Upper bound on the members drawn for a negative count.
pub const MAX_RANDOM_MEMBERS: usize = 1024 * 1024;

/// Sets, one row per member in `modis_set_table`. Member rows carry no value.
#[derive(Clone)]
pub struct SetStore {
    backend: Arc<dyn Backend>,
    db: u32,
}

impl SetStore {
    pub fn new(backend: Arc<dyn Backend>, db: u32) -> Self {
        Self { backend, db }
    }

    fn row_key(&self, key: &Bytes, member: &Bytes) -> RowKey {
        RowKey::with_field(self.db, key.clone(), member.clone())
    }

    async fn rows(&self, key: &Bytes, limit: Option<usize>) -> StoreResult<Vec<Row>> {
        Ok(self.backend.scan(Table::Set, self.db, key, limit).await?)
    }

    /// Adds the members and returns how many were not already in the set. New member rows take
    /// the key's current expiration.
    pub async fn add(&self, key: &Bytes, members: Vec<Bytes>) -> StoreResult<u64> {
        let members: Vec<Bytes> = members.into_iter().unique().collect();
        let row_keys: Vec<RowKey> = members
            .iter()
            .map(|member| self.row_key(key, member))
            .collect();
        let existing = self.backend.get_many(Table::Set, &row_keys).await?;

        let expire_at = self
            .rows(key, Some(1))
            .await?
            .into_iter()
            .next()
            .and_then(|row| row.expire_at);

        let mutations: Vec<Mutation> = row_keys
            .into_iter()
            .zip(existing)
            .filter(|(_, row)| row.is_none())
            .map(|(row_key, _)| Mutation::Put(Row::new(row_key, Bytes::new(), expire_at)))
            .collect();

        let added = mutations.len() as u64;
        if added > 0 {
            self.backend.batch(Table::Set, mutations).await?;
        }

        Ok(added)
    }

    /// Returns the number of members removed.
    pub async fn remove(&self, key: &Bytes, members: &[Bytes]) -> StoreResult<u64> {
        let mutations = members
            .iter()
            .map(|member| Mutation::Delete(self.row_key(key, member)))
            .collect();
        let results = self.backend.batch(Table::Set, mutations).await?;

        Ok(results.into_iter().filter(|removed| *removed).count() as u64)
    }

    pub async fn card(&self, key: &Bytes) -> StoreResult<u64> {
        Ok(self.backend.count(Table::Set, self.db, key).await?)
    }

    pub async fn is_member(&self, key: &Bytes, member: &Bytes) -> StoreResult<bool> {
        Ok(self
            .backend
            .get(Table::Set, &self.row_key(key, member))
            .await?
            .is_some())
    }

    pub async fn members(&self, key: &Bytes) -> StoreResult<Vec<Bytes>> {
        Ok(self.rows(key, None).await?.iter().map(Row::field).collect())
    }

    /// Member lists of several keys, one scan each, for the set algebra commands.
    pub async fn members_of(&self, keys: &[Bytes]) -> StoreResult<Vec<Vec<Bytes>>> {
        let mut sets = Vec::with_capacity(keys.len());
        for key in keys {
            sets.push(self.members(key).await?);
        }
        Ok(sets)
    }

    /// Moves `member` from `source` to `destination`. Returns false if it was not in `source`.
    pub async fn move_member(
        &self,
        source: &Bytes,
        destination: &Bytes,
        member: &Bytes,
    ) -> StoreResult<bool> {
        if source == destination {
            return self.is_member(source, member).await;
        }

        let removed = self
            .backend
            .delete(Table::Set, &self.row_key(source, member))
            .await?;
        if !removed {
            return Ok(false);
        }

        self.add(destination, vec![member.clone()]).await?;
        Ok(true)
    }

    /// Draws members at random. A positive `count` returns distinct members, every member once
    /// when it reaches the cardinality. A negative `count` returns `|count|` members that may
    /// repeat, at most [`MAX_RANDOM_MEMBERS`] of them.
    pub async fn random_members(&self, key: &Bytes, count: i64) -> StoreResult<Vec<Bytes>> {
        if count == 0 {
            return Ok(vec![]);
        }

        let card = self.card(key).await? as usize;
        if card == 0 {
            return Ok(vec![]);
        }

        let wanted = usize::try_from(count.unsigned_abs())
            .unwrap_or(usize::MAX)
            .min(MAX_RANDOM_MEMBERS);
        if count > 0 && wanted >= card {
            return self.members(key).await;
        }

        let mut indexes: Vec<usize> = {
            let mut rng = rand::thread_rng();
            if count > 0 {
                index::sample(&mut rng, card, wanted).into_vec()
            } else {
                (0..wanted).map(|_| rng.gen_range(0..card)).collect()
            }
        };
        indexes.sort_unstable();

        let mut members = self.pick(key, &indexes).await?;
        if count < 0 {
            members.shuffle(&mut rand::thread_rng());
        }

        Ok(members)
    }

    /// One forward scan over the member rows, keeping the rows at the given sorted positions.
    /// A repeated position yields its member once per occurrence.
    async fn pick(&self, key: &Bytes, indexes: &[usize]) -> StoreResult<Vec<Bytes>> {
        let Some(last) = indexes.last() else {
            return Ok(vec![]);
        };

        let rows = self.rows(key, Some(last + 1)).await?;
        let mut picked = Vec::with_capacity(indexes.len());
        let mut wanted = indexes.iter().peekable();

        for (position, row) in rows.iter().enumerate() {
            while wanted.next_if(|index| **index == position).is_some() {
                picked.push(row.field());
            }
            if wanted.peek().is_none() {
                break;
            }
        }

        Ok(picked)
    }

    /// Removes and returns up to `count` random members.
    pub async fn pop(&self, key: &Bytes, count: usize) -> StoreResult<Vec<Bytes>> {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        let members = self.random_members(key, count).await?;

        if !members.is_empty() {
            self.remove(key, &members).await?;
        }

        Ok(members)
    }

    pub async fn key_count(&self) -> StoreResult<u64> {
        Ok(self.backend.count_keys(Table::Set, self.db).await?)
    }

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

        let results = self.backend.batch(Table::Set, mutations).await?;
        Ok(results.into_iter().any(|affected| affected) as u64)
    }
}

#[async_trait]
impl Family for SetStore {
    fn key_type(&self) -> KeyType {
        KeyType::Set
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
