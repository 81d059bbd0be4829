//! The table-oriented storage the keyspace is persisted in.
//!
//! Each Redis data type lives in its own table with a fixed schema:
//!
//! ```text
//! modis_string_table(db, rkey, value,         expire_ts?)  PK(db, rkey)
//! modis_hash_table  (db, rkey, field, value,  expire_ts?)  PK(db, rkey, field)
//! modis_set_table   (db, rkey, member,        expire_ts?)  PK(db, rkey, member)
//! ```
//!
//! A backend only promises single-row atomicity. Expiration is pushed down: a row whose
//! `expire_ts` has elapsed is invisible to every operation and is eventually removed by the
//! backend itself.

pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use strum_macros::{Display, EnumIter};
use thiserror::Error as ThisError;

pub use memory::MemoryBackend;

#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    #[strum(serialize = "modis_string_table")]
    String,
    #[strum(serialize = "modis_hash_table")]
    Hash,
    #[strum(serialize = "modis_set_table")]
    Set,
}

/// Primary key of a row. String rows have no field, hash rows use it for the field name and set
/// rows for the member.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub db: u32,
    pub key: Bytes,
    pub field: Option<Bytes>,
}

impl RowKey {
    pub fn new(db: u32, key: Bytes) -> Self {
        Self {
            db,
            key,
            field: None,
        }
    }

    pub fn with_field(db: u32, key: Bytes, field: Bytes) -> Self {
        Self {
            db,
            key,
            field: Some(field),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub key: RowKey,
    /// Set rows carry an empty value, the member is part of the key.
    pub value: Bytes,
    /// Unix time in milliseconds, `None` means the row never expires.
    pub expire_at: Option<i64>,
}

impl Row {
    pub fn new(key: RowKey, value: Bytes, expire_at: Option<i64>) -> Self {
        Self {
            key,
            value,
            expire_at,
        }
    }

    pub fn field(&self) -> Bytes {
        self.key.field.clone().unwrap_or_default()
    }
}

/// Amount added by `Backend::increment`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Delta {
    Integer(i64),
    Float(f64),
}

/// A single write inside a `Backend::batch` call. Mutations of a batch are applied one by one,
/// a failure leaves the previous ones in place.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Put(Row),
    Delete(RowKey),
    SetExpire(RowKey, Option<i64>),
}

#[derive(Debug, ThisError, PartialEq)]
pub enum BackendError {
    /// An insert found a live row with the same primary key.
    #[error("row already exists")]
    Conflict,
    #[error("value is not a number")]
    NotANumber,
    #[error("numeric value out of range")]
    Overflow,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn get(&self, table: Table, key: &RowKey) -> BackendResult<Option<Row>>;

    /// Batch variant of `get` that preserves input ordering.
    async fn get_many(&self, table: Table, keys: &[RowKey]) -> BackendResult<Vec<Option<Row>>>;

    /// Creates a row, fails with `BackendError::Conflict` when a live one already exists.
    async fn insert(&self, table: Table, row: Row) -> BackendResult<()>;

    /// Creates or replaces a row.
    async fn put(&self, table: Table, row: Row) -> BackendResult<()>;

    /// Updates the expiration column of a live row. Returns whether a row was affected.
    async fn set_expire(
        &self,
        table: Table,
        key: &RowKey,
        expire_at: Option<i64>,
    ) -> BackendResult<bool>;

    async fn delete(&self, table: Table, key: &RowKey) -> BackendResult<bool>;

    /// Adds `delta` to the decimal text stored in the row, creating it from zero when missing.
    /// The new value is returned in the backend's own decimal formatting.
    async fn increment(&self, table: Table, key: &RowKey, delta: Delta) -> BackendResult<String>;

    /// Appends to the row value, creating it when missing. Returns the new value length.
    async fn append(&self, table: Table, key: &RowKey, suffix: Bytes) -> BackendResult<usize>;

    /// Applies independent mutations in order. Returns, for each one, whether a row was affected.
    async fn batch(&self, table: Table, mutations: Vec<Mutation>) -> BackendResult<Vec<bool>>;

    /// Live rows sharing `(db, key)`, ordered by field, at most `limit` of them.
    async fn scan(
        &self,
        table: Table,
        db: u32,
        key: &Bytes,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Row>>;

    /// Number of live rows sharing `(db, key)`.
    async fn count(&self, table: Table, db: u32, key: &Bytes) -> BackendResult<u64>;

    /// Number of distinct keys with at least one live row in `db`.
    async fn count_keys(&self, table: Table, db: u32) -> BackendResult<u64>;
}
