// storefront/src/remote/mod.rs

//! The remote store contract and its implementations.
//!
//! [`RemoteStore`] is deliberately row-level (`serde_json::Value` in and out) so that the
//! HTTP and in-memory implementations stay small; [`RemoteStoreExt`] layers typed
//! decoding on top.

pub mod memory;
pub mod query;
pub mod rest;

pub use memory::{MemoryStore, Operation};
pub use query::{Filter, OrderBy, Query, SelectItem, Table};
pub use rest::RestStore;

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Table-scoped CRUD against the hosted backend.
#[async_trait]
pub trait RemoteStore: Send + Sync {
  async fn select(&self, query: &Query) -> StoreResult<Vec<Value>>;

  /// Inserts `rows` into `query.table`; returns them projected through `query.columns`
  /// (empty when no columns were requested).
  async fn insert(&self, query: &Query, rows: Vec<Value>) -> StoreResult<Vec<Value>>;

  /// Applies `patch` to every row matching `query.filters`.
  async fn update(&self, query: &Query, patch: Value) -> StoreResult<Vec<Value>>;

  async fn delete(&self, query: &Query) -> StoreResult<()>;
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> StoreResult<Vec<T>> {
  rows
    .into_iter()
    .map(|row| serde_json::from_value(row).map_err(StoreError::from))
    .collect()
}

/// Decodes exactly one row, as a single-object request would.
pub fn decode_single<T: DeserializeOwned>(table: Table, mut rows: Vec<Value>) -> StoreResult<T> {
  if rows.len() != 1 {
    return Err(StoreError::RowCount {
      table: table.name(),
      expected: 1,
      actual: rows.len(),
    });
  }
  Ok(serde_json::from_value(rows.remove(0))?)
}

pub fn to_row<T: Serialize>(value: &T) -> StoreResult<Value> {
  Ok(serde_json::to_value(value)?)
}

/// Typed helpers over any [`RemoteStore`].
#[async_trait]
pub trait RemoteStoreExt: RemoteStore {
  async fn fetch<T>(&self, query: &Query) -> StoreResult<Vec<T>>
  where
    T: DeserializeOwned + Send,
  {
    decode_rows(self.select(query).await?)
  }

  async fn fetch_optional<T>(&self, query: &Query) -> StoreResult<Option<T>>
  where
    T: DeserializeOwned + Send,
  {
    let mut rows = self.select(query).await?;
    match rows.len() {
      0 => Ok(None),
      1 => Ok(Some(serde_json::from_value(rows.remove(0))?)),
      n => Err(StoreError::RowCount {
        table: query.table.name(),
        expected: 1,
        actual: n,
      }),
    }
  }

  async fn insert_one<P, R>(&self, query: &Query, row: &P) -> StoreResult<R>
  where
    P: Serialize + Sync,
    R: DeserializeOwned + Send,
  {
    let payload = to_row(row)?;
    decode_single(query.table, self.insert(query, vec![payload]).await?)
  }

  async fn insert_many<P, R>(&self, query: &Query, rows: &[P]) -> StoreResult<Vec<R>>
  where
    P: Serialize + Sync,
    R: DeserializeOwned + Send,
  {
    let payload = rows.iter().map(to_row).collect::<StoreResult<Vec<_>>>()?;
    decode_rows(self.insert(query, payload).await?)
  }

  async fn update_one<R>(&self, query: &Query, patch: Value) -> StoreResult<R>
  where
    R: DeserializeOwned + Send,
  {
    decode_single(query.table, self.update(query, patch).await?)
  }
}

impl<S: RemoteStore + ?Sized> RemoteStoreExt for S {}
