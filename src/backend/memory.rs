use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use strum::IntoEnumIterator;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::backend::{
    Backend, BackendError, BackendResult, Delta, Mutation, Row, RowKey, Table,
};
use crate::utils::number;
use crate::utils::time::now_millis;

/// An in-process backend holding every table in ordered maps. It honours the same contract as a
/// remote table store: single-row atomicity, typed insert conflicts and push-down TTL, where a
/// background task physically removes rows once their `expire_ts` elapses. The backend is
/// designed to be shared and cloned cheaply using reference counting.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl MemoryBackend {
    /// Creates the backend and spawns its purge task, must be called inside a Tokio runtime.
    pub fn new() -> MemoryBackend {
        let state = State {
            tables: Table::iter().map(|table| (table, BTreeMap::new())).collect(),
            expirations: BTreeSet::new(),
        };

        let waker = Arc::new(Notify::new());
        let inner = Arc::new(Inner {
            state: Mutex::new(state),
            waker: waker.clone(),
        });

        tokio::spawn(purge_expired_rows(Arc::downgrade(&inner), waker));

        Self { inner }
    }

    fn lock(&self) -> InnerLocked<'_> {
        self.inner.lock()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner {
    state: Mutex<State>,
    waker: Arc<Notify>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Lets the purge task observe that the backend is gone.
        self.waker.notify_one();
    }
}

impl Inner {
    fn lock(&self) -> InnerLocked<'_> {
        // A panic while holding the lock cannot leave a row half written, keep serving.
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        InnerLocked {
            state,
            waker: &self.waker,
            now: now_millis(),
        }
    }
}

struct State {
    tables: HashMap<Table, BTreeMap<RowKey, Stored>>,
    expirations: BTreeSet<(i64, Table, RowKey)>,
}

#[derive(Clone)]
struct Stored {
    value: Bytes,
    expire_at: Option<i64>,
}

struct InnerLocked<'a> {
    state: MutexGuard<'a, State>,
    waker: &'a Notify,
    now: i64,
}

impl<'a> InnerLocked<'a> {
    fn is_live(&self, stored: &Stored) -> bool {
        stored.expire_at.map_or(true, |at| at > self.now)
    }

    fn table(&self, table: Table) -> &BTreeMap<RowKey, Stored> {
        &self.state.tables[&table]
    }

    fn table_mut(&mut self, table: Table) -> &mut BTreeMap<RowKey, Stored> {
        self.state.tables.entry(table).or_default()
    }

    fn get(&self, table: Table, key: &RowKey) -> Option<Row> {
        self.table(table)
            .get(key)
            .filter(|stored| self.is_live(stored))
            .map(|stored| Row::new(key.clone(), stored.value.clone(), stored.expire_at))
    }

    fn put(&mut self, table: Table, row: Row) {
        let Row {
            key,
            value,
            expire_at,
        } = row;

        let previous = self
            .table_mut(table)
            .insert(key.clone(), Stored { value, expire_at });

        let previous_at = previous.and_then(|stored| stored.expire_at);
        if previous_at == expire_at {
            return;
        }
        if let Some(previous_at) = previous_at {
            self.untrack_expiration(table, key.clone(), previous_at);
        }
        if let Some(expire_at) = expire_at {
            self.track_expiration(table, key, expire_at);
        }
    }

    fn insert(&mut self, table: Table, row: Row) -> BackendResult<()> {
        if self.get(table, &row.key).is_some() {
            return Err(BackendError::Conflict);
        }
        self.put(table, row);
        Ok(())
    }

    fn delete(&mut self, table: Table, key: &RowKey) -> bool {
        let now = self.now;
        let Some(stored) = self.table_mut(table).remove(key) else {
            return false;
        };

        match stored.expire_at {
            Some(at) => {
                self.untrack_expiration(table, key.clone(), at);
                at > now
            }
            None => true,
        }
    }

    fn set_expire(&mut self, table: Table, key: &RowKey, expire_at: Option<i64>) -> bool {
        let Some(mut row) = self.get(table, key) else {
            return false;
        };
        row.expire_at = expire_at;
        self.put(table, row);
        true
    }

    fn increment(&mut self, table: Table, key: &RowKey, delta: Delta) -> BackendResult<String> {
        let current = self.get(table, key);
        let text = current
            .as_ref()
            .map(|row| String::from_utf8_lossy(&row.value).into_owned());

        let next = match delta {
            Delta::Integer(delta) => {
                let value = match text.as_deref() {
                    Some(text) => text.parse::<i64>().map_err(|_| BackendError::NotANumber)?,
                    None => 0,
                };
                value
                    .checked_add(delta)
                    .ok_or(BackendError::Overflow)?
                    .to_string()
            }
            Delta::Float(delta) => {
                let value = match text.as_deref() {
                    Some(text) => text
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|value| value.is_finite())
                        .ok_or(BackendError::NotANumber)?,
                    None => 0.0,
                };
                let value = value + delta;
                if !value.is_finite() {
                    return Err(BackendError::Overflow);
                }
                number::format_float(value)
            }
        };

        let expire_at = current.and_then(|row| row.expire_at);
        self.put(
            table,
            Row::new(key.clone(), Bytes::from(next.clone()), expire_at),
        );

        Ok(next)
    }

    fn append(&mut self, table: Table, key: &RowKey, suffix: &[u8]) -> usize {
        let (value, expire_at) = match self.get(table, key) {
            Some(row) => {
                let mut value = BytesMut::from(&row.value[..]);
                value.extend_from_slice(suffix);
                (value.freeze(), row.expire_at)
            }
            None => (Bytes::copy_from_slice(suffix), None),
        };

        let len = value.len();
        self.put(table, Row::new(key.clone(), value, expire_at));
        len
    }

    fn scan(&self, table: Table, db: u32, key: &Bytes, limit: Option<usize>) -> Vec<Row> {
        let from = RowKey::new(db, key.clone());

        self.table(table)
            .range((Bound::Included(&from), Bound::Unbounded))
            .take_while(|(row_key, _)| row_key.db == db && row_key.key == *key)
            .filter(|(_, stored)| self.is_live(stored))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(row_key, stored)| {
                Row::new(row_key.clone(), stored.value.clone(), stored.expire_at)
            })
            .collect()
    }

    fn count_keys(&self, table: Table, db: u32) -> u64 {
        let from = RowKey::new(db, Bytes::new());

        self.table(table)
            .range((Bound::Included(&from), Bound::Unbounded))
            .take_while(|(row_key, _)| row_key.db == db)
            .filter(|(_, stored)| self.is_live(stored))
            .map(|(row_key, _)| &row_key.key)
            .dedup()
            .count() as u64
    }

    fn track_expiration(&mut self, table: Table, key: RowKey, expire_at: i64) {
        self.state.expirations.insert((expire_at, table, key));

        let expires_next = self
            .state
            .expirations
            .iter()
            .next()
            .map_or(false, |(at, _, _)| *at == expire_at);
        if expires_next {
            self.waker.notify_one();
        }
    }

    fn untrack_expiration(&mut self, table: Table, key: RowKey, expire_at: i64) {
        self.state.expirations.remove(&(expire_at, table, key));
    }

    /// Removes rows whose expiration elapsed and returns when the next one is due.
    fn purge_expired_rows(&mut self) -> Option<i64> {
        let now = self.now;

        let expired: Vec<(i64, Table, RowKey)> = self
            .state
            .expirations
            .iter()
            .take_while(|(expire_at, _, _)| *expire_at <= now)
            .cloned()
            .collect();

        for (expire_at, table, key) in expired {
            self.state.expirations.remove(&(expire_at, table, key.clone()));

            // The row may have been rewritten with another expiration since it was tracked.
            let table = self.table_mut(table);
            if table.get(&key).and_then(|stored| stored.expire_at) == Some(expire_at) {
                table.remove(&key);
                debug!(?key, "purged expired row");
            }
        }

        self.state
            .expirations
            .iter()
            .next()
            .map(|(expire_at, _, _)| *expire_at)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, table: Table, key: &RowKey) -> BackendResult<Option<Row>> {
        Ok(self.lock().get(table, key))
    }

    async fn get_many(&self, table: Table, keys: &[RowKey]) -> BackendResult<Vec<Option<Row>>> {
        let state = self.lock();
        Ok(keys.iter().map(|key| state.get(table, key)).collect())
    }

    async fn insert(&self, table: Table, row: Row) -> BackendResult<()> {
        self.lock().insert(table, row)
    }

    async fn put(&self, table: Table, row: Row) -> BackendResult<()> {
        self.lock().put(table, row);
        Ok(())
    }

    async fn set_expire(
        &self,
        table: Table,
        key: &RowKey,
        expire_at: Option<i64>,
    ) -> BackendResult<bool> {
        Ok(self.lock().set_expire(table, key, expire_at))
    }

    async fn delete(&self, table: Table, key: &RowKey) -> BackendResult<bool> {
        Ok(self.lock().delete(table, key))
    }

    async fn increment(&self, table: Table, key: &RowKey, delta: Delta) -> BackendResult<String> {
        self.lock().increment(table, key, delta)
    }

    async fn append(&self, table: Table, key: &RowKey, suffix: Bytes) -> BackendResult<usize> {
        Ok(self.lock().append(table, key, &suffix))
    }

    async fn batch(&self, table: Table, mutations: Vec<Mutation>) -> BackendResult<Vec<bool>> {
        let mut results = Vec::with_capacity(mutations.len());

        // Each mutation takes the lock on its own, a batch is not a transaction.
        for mutation in mutations {
            let mut state = self.lock();
            let affected = match mutation {
                Mutation::Put(row) => {
                    state.put(table, row);
                    true
                }
                Mutation::Delete(key) => state.delete(table, &key),
                Mutation::SetExpire(key, expire_at) => state.set_expire(table, &key, expire_at),
            };
            results.push(affected);
        }

        Ok(results)
    }

    async fn scan(
        &self,
        table: Table,
        db: u32,
        key: &Bytes,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Row>> {
        Ok(self.lock().scan(table, db, key, limit))
    }

    async fn count(&self, table: Table, db: u32, key: &Bytes) -> BackendResult<u64> {
        Ok(self.lock().scan(table, db, key, None).len() as u64)
    }

    async fn count_keys(&self, table: Table, db: u32) -> BackendResult<u64> {
        Ok(self.lock().count_keys(table, db))
    }
}

/// Runs until the backend is dropped.
async fn purge_expired_rows(inner: Weak<Inner>, waker: Arc<Notify>) {
    loop {
        let Some(backend) = inner.upgrade() else {
            break;
        };
        let next_expiration = backend.lock().purge_expired_rows();
        drop(backend);

        if let Some(next_expiration) = next_expiration {
            let wait = (next_expiration - now_millis()).max(0) as u64;
            tokio::select! {
                _ = sleep(Duration::from_millis(wait)) => {}
                _ = waker.notified() => {}
            }
        } else {
            waker.notified().await;
        }
    }

    debug!("purge task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_key(key: &'static str) -> RowKey {
        RowKey::new(0, Bytes::from(key))
    }

    fn hash_key(key: &'static str, field: &'static str) -> RowKey {
        RowKey::with_field(0, Bytes::from(key), Bytes::from(field))
    }

    #[tokio::test]
    async fn insert_conflicts_with_live_row() {
        let backend = MemoryBackend::new();
        let row = Row::new(string_key("key1"), Bytes::from("1"), None);

        backend.insert(Table::String, row.clone()).await.unwrap();
        let err = backend.insert(Table::String, row).await.unwrap_err();

        assert_eq!(err, BackendError::Conflict);
    }

    #[tokio::test]
    async fn expired_rows_are_invisible() {
        let backend = MemoryBackend::new();
        let past = now_millis() - 1_000;
        let row = Row::new(string_key("key1"), Bytes::from("1"), Some(past));

        backend.put(Table::String, row.clone()).await.unwrap();

        assert_eq!(backend.get(Table::String, &row.key).await.unwrap(), None);
        // An expired row does not block an insert.
        backend.insert(Table::String, row).await.unwrap();
    }

    #[tokio::test]
    async fn rows_are_purged_once_expired() {
        let backend = MemoryBackend::new();
        let soon = now_millis() + 20;
        let row = Row::new(string_key("key1"), Bytes::from("1"), Some(soon));

        backend.put(Table::String, row).await.unwrap();
        assert_eq!(backend.lock().table(Table::String).len(), 1);

        sleep(Duration::from_millis(100)).await;

        assert_eq!(backend.lock().table(Table::String).len(), 0);
    }

    #[tokio::test]
    async fn expiration_index_tracks_only_the_current_timestamp() {
        let backend = MemoryBackend::new();
        let key = string_key("key1");
        let later = now_millis() + 60_000;

        backend
            .put(Table::String, Row::new(key.clone(), Bytes::from("1"), None))
            .await
            .unwrap();
        for offset in 0..100 {
            backend
                .set_expire(Table::String, &key, Some(later + offset))
                .await
                .unwrap();
        }
        assert_eq!(backend.lock().state.expirations.len(), 1);

        backend.set_expire(Table::String, &key, None).await.unwrap();
        assert!(backend.lock().state.expirations.is_empty());

        backend
            .set_expire(Table::String, &key, Some(later))
            .await
            .unwrap();
        assert!(backend.delete(Table::String, &key).await.unwrap());
        assert!(backend.lock().state.expirations.is_empty());
    }

    #[tokio::test]
    async fn purge_task_stops_with_the_backend() {
        let backend = MemoryBackend::new();
        let waker = backend.inner.waker.clone();

        backend
            .put(
                Table::String,
                Row::new(string_key("key1"), Bytes::from("1"), Some(now_millis() + 60_000)),
            )
            .await
            .unwrap();
        drop(backend);

        sleep(Duration::from_millis(50)).await;

        assert_eq!(Arc::strong_count(&waker), 1);
    }

    #[tokio::test]
    async fn increment_integers_and_floats() {
        let backend = MemoryBackend::new();
        let key = string_key("counter");

        assert_eq!(
            backend
                .increment(Table::String, &key, Delta::Integer(5))
                .await
                .unwrap(),
            "5"
        );
        assert_eq!(
            backend
                .increment(Table::String, &key, Delta::Integer(-7))
                .await
                .unwrap(),
            "-2"
        );
        assert_eq!(
            backend
                .increment(Table::String, &key, Delta::Float(0.5))
                .await
                .unwrap(),
            "-1.5"
        );
        assert_eq!(
            backend
                .increment(Table::String, &key, Delta::Integer(1))
                .await
                .unwrap_err(),
            BackendError::NotANumber
        );
    }

    #[tokio::test]
    async fn increment_keeps_expiration() {
        let backend = MemoryBackend::new();
        let key = string_key("counter");
        let later = now_millis() + 60_000;

        backend
            .put(Table::String, Row::new(key.clone(), Bytes::from("1"), Some(later)))
            .await
            .unwrap();
        backend
            .increment(Table::String, &key, Delta::Integer(1))
            .await
            .unwrap();

        let row = backend.get(Table::String, &key).await.unwrap().unwrap();
        assert_eq!(row.value, Bytes::from("2"));
        assert_eq!(row.expire_at, Some(later));
    }

    #[tokio::test]
    async fn scan_is_ordered_and_bounded_to_one_key() {
        let backend = MemoryBackend::new();

        for (key, field) in [("h1", "b"), ("h1", "a"), ("h2", "a"), ("h1", "c")] {
            backend
                .put(
                    Table::Hash,
                    Row::new(hash_key(key, field), Bytes::from("v"), None),
                )
                .await
                .unwrap();
        }

        let rows = backend
            .scan(Table::Hash, 0, &Bytes::from("h1"), None)
            .await
            .unwrap();
        let fields: Vec<Bytes> = rows.iter().map(Row::field).collect();

        assert_eq!(fields, vec!["a", "b", "c"]);
        assert_eq!(
            backend
                .scan(Table::Hash, 0, &Bytes::from("h1"), Some(2))
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            backend.count(Table::Hash, 0, &Bytes::from("h2")).await.unwrap(),
            1
        );
        assert_eq!(
            backend.count(Table::Hash, 1, &Bytes::from("h1")).await.unwrap(),
            0
        );
        assert_eq!(backend.count_keys(Table::Hash, 0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn batch_reports_each_mutation() {
        let backend = MemoryBackend::new();
        let key = hash_key("h", "f");

        let results = backend
            .batch(
                Table::Hash,
                vec![
                    Mutation::Put(Row::new(key.clone(), Bytes::from("v"), None)),
                    Mutation::SetExpire(key.clone(), Some(now_millis() + 1_000)),
                    Mutation::Delete(key.clone()),
                    Mutation::Delete(key),
                ],
            )
            .await
            .unwrap();

        assert_eq!(results, vec![true, true, true, false]);
    }
}
