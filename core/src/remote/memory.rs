// storefront/src/remote/memory.rs

//! An in-process [`RemoteStore`] with the same query semantics as the REST endpoint:
//! equality filters, ordering, limits and embedded relations in the select list.
//!
//! Embeds resolve by naming convention. `alias:table(...)` is a to-one join when the row
//! has an `<alias>_id` column, and otherwise a to-many join through the child table's
//! `<parent>_id` column.

use super::query::{parse_select, Filter, Query, SelectItem, Table};
use super::RemoteStore;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
  Select,
  Insert,
  Update,
  Delete,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
  table: Table,
  operation: Operation,
  status: u16,
  message: String,
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<HashMap<Table, Vec<Value>>>,
  failures: Mutex<Vec<InjectedFailure>>,
  calls: Mutex<Vec<(Table, Operation)>>,
  latency: Option<Duration>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every call sleeps for `latency` before touching the tables, which lets overlapping
  /// requests interleave the way real network calls do.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  pub fn seed<T: Serialize>(&self, table: Table, rows: &[T]) -> StoreResult<()> {
    let mut values = rows
      .iter()
      .map(|r| serde_json::to_value(r).map_err(StoreError::from))
      .collect::<StoreResult<Vec<_>>>()?;
    for row in values.iter_mut() {
      Self::fill_defaults(table, row);
    }
    self.tables.write().entry(table).or_default().extend(values);
    Ok(())
  }

  /// Raw rows currently stored in `table`.
  pub fn rows(&self, table: Table) -> Vec<Value> {
    self.tables.read().get(&table).cloned().unwrap_or_default()
  }

  pub fn decoded<T: DeserializeOwned>(&self, table: Table) -> StoreResult<Vec<T>> {
    super::decode_rows(self.rows(table))
  }

  /// Makes the next `operation` on `table` fail with a remote rejection.
  pub fn fail_next(&self, table: Table, operation: Operation, status: u16, message: &str) {
    self.failures.lock().push(InjectedFailure {
      table,
      operation,
      status,
      message: message.to_string(),
    });
  }

  /// Every call made so far, in order.
  pub fn calls(&self) -> Vec<(Table, Operation)> {
    self.calls.lock().clone()
  }

  pub fn call_count(&self, table: Table, operation: Operation) -> usize {
    self.calls.lock().iter().filter(|c| **c == (table, operation)).count()
  }

  async fn enter(&self, table: Table, operation: Operation) -> StoreResult<()> {
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    self.calls.lock().push((table, operation));
    let mut failures = self.failures.lock();
    if let Some(idx) = failures.iter().position(|f| f.table == table && f.operation == operation) {
      let failure = failures.remove(idx);
      return Err(StoreError::Remote {
        status: failure.status,
        code: None,
        message: failure.message,
      });
    }
    Ok(())
  }

  fn fill_defaults(table: Table, row: &mut Value) {
    if let Value::Object(obj) = row {
      obj
        .entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
      if matches!(table, Table::Products | Table::Orders) {
        obj
          .entry("created_at")
          .or_insert_with(|| Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)));
      }
    }
  }

  fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters
      .iter()
      .all(|f| row.get(&f.column).map(text_of).as_deref() == Some(f.value.as_str()))
  }

  fn project(tables: &HashMap<Table, Vec<Value>>, table: Table, row: &Value, items: &[SelectItem]) -> Value {
    let source = match row.as_object() {
      Some(obj) => obj,
      None => return row.clone(),
    };
    let mut out = Map::new();
    for item in items {
      match item {
        SelectItem::All => out.extend(source.clone()),
        SelectItem::Column(col) => {
          if let Some(v) = source.get(col) {
            out.insert(col.clone(), v.clone());
          }
        }
        SelectItem::Embed {
          alias,
          table: target,
          items,
        } => {
          let Some(target_table) = Table::from_name(target) else {
            continue;
          };
          let target_rows = tables.get(&target_table).map(Vec::as_slice).unwrap_or(&[]);
          let embedded = match source.get(&format!("{alias}_id")) {
            Some(fk) => {
              let fk = text_of(fk);
              target_rows
                .iter()
                .find(|r| r.get("id").map(text_of).as_deref() == Some(fk.as_str()))
                .map(|r| Self::project(tables, target_table, r, items))
                .unwrap_or(Value::Null)
            }
            None => {
              let parent_key = table.foreign_key();
              let children = match source.get("id").map(text_of) {
                Some(parent_id) => target_rows
                  .iter()
                  .filter(|r| r.get(&parent_key).map(text_of).as_deref() == Some(parent_id.as_str()))
                  .map(|r| Self::project(tables, target_table, r, items))
                  .collect(),
                None => Vec::new(),
              };
              Value::Array(children)
            }
          };
          out.insert(alias.clone(), embedded);
        }
      }
    }
    Value::Object(out)
  }

  fn shape(tables: &HashMap<Table, Vec<Value>>, query: &Query, rows: Vec<Value>) -> Vec<Value> {
    match &query.columns {
      None => Vec::new(),
      Some(columns) => {
        let items = parse_select(columns);
        rows
          .iter()
          .map(|r| Self::project(tables, query.table, r, &items))
          .collect()
      }
    }
  }
}

/// Textual form of a scalar, as it appears in a filter.
fn text_of(v: &Value) -> String {
  match v {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
  match (a, b) {
    (Some(Value::Number(x)), Some(Value::Number(y))) => {
      let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
      x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    }
    (Some(x), Some(y)) => text_of(x).cmp(&text_of(y)),
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

#[async_trait]
impl RemoteStore for MemoryStore {
  async fn select(&self, query: &Query) -> StoreResult<Vec<Value>> {
    self.enter(query.table, Operation::Select).await?;
    let tables = self.tables.read();
    let mut rows: Vec<Value> = tables
      .get(&query.table)
      .map(|rows| rows.iter().filter(|r| Self::matches(r, &query.filters)).cloned().collect())
      .unwrap_or_default();
    if let Some(order) = &query.order {
      rows.sort_by(|a, b| {
        let ord = compare(a.get(&order.column), b.get(&order.column));
        if order.ascending {
          ord
        } else {
          ord.reverse()
        }
      });
    }
    if let Some(limit) = query.limit {
      rows.truncate(limit);
    }
    let query = match query.columns {
      Some(_) => query.clone(),
      None => query.clone().select("*"),
    };
    Ok(Self::shape(&tables, &query, rows))
  }

  async fn insert(&self, query: &Query, rows: Vec<Value>) -> StoreResult<Vec<Value>> {
    self.enter(query.table, Operation::Insert).await?;
    let mut inserted = Vec::with_capacity(rows.len());
    for mut row in rows {
      if !row.is_object() {
        return Err(StoreError::Remote {
          status: 400,
          code: Some("PGRST102".to_string()),
          message: "Row must be a JSON object".to_string(),
        });
      }
      Self::fill_defaults(query.table, &mut row);
      inserted.push(row);
    }
    let mut tables = self.tables.write();
    tables.entry(query.table).or_default().extend(inserted.iter().cloned());
    Ok(Self::shape(&tables, query, inserted))
  }

  async fn update(&self, query: &Query, patch: Value) -> StoreResult<Vec<Value>> {
    self.enter(query.table, Operation::Update).await?;
    let Value::Object(patch) = patch else {
      return Err(StoreError::Remote {
        status: 400,
        code: Some("PGRST102".to_string()),
        message: "Patch must be a JSON object".to_string(),
      });
    };
    let mut tables = self.tables.write();
    let mut updated = Vec::new();
    if let Some(rows) = tables.get_mut(&query.table) {
      for row in rows.iter_mut().filter(|r| Self::matches(r, &query.filters)) {
        if let Value::Object(obj) = row {
          obj.extend(patch.clone());
        }
        updated.push(row.clone());
      }
    }
    Ok(Self::shape(&tables, query, updated))
  }

  async fn delete(&self, query: &Query) -> StoreResult<()> {
    self.enter(query.table, Operation::Delete).await?;
    if let Some(rows) = self.tables.write().get_mut(&query.table) {
      rows.retain(|r| !Self::matches(r, &query.filters));
    }
    Ok(())
  }
}
