// storefront/src/catalog.rs

use crate::error::StoreResult;
use crate::models::Product;
use crate::remote::{Query, RemoteStore, RemoteStoreExt, Table};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
  /// Restrict to one category. Blank means every category.
  #[serde(default)]
  pub category: Option<String>,
}

impl ProductFilter {
  pub fn category(category: impl Into<String>) -> Self {
    Self {
      category: Some(category.into()),
    }
  }

  fn active_category(&self) -> Option<&str> {
    self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
  }
}

#[derive(Deserialize)]
struct CategoryRow {
  category: String,
}

/// Read-only access to `products`.
#[derive(Clone)]
pub struct Catalog {
  store: Arc<dyn RemoteStore>,
}

impl Catalog {
  pub fn new(store: Arc<dyn RemoteStore>) -> Self {
    Self { store }
  }

  /// Products, newest first.
  #[instrument(name = "Catalog::list", skip(self), err(Display))]
  pub async fn list(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
    let mut query = Query::table(Table::Products).select("*").order_by("created_at", false);
    if let Some(category) = filter.active_category() {
      query = query.eq("category", category);
    }
    let products: Vec<Product> = self.store.fetch(&query).await?;
    debug!(count = products.len(), "Products listed.");
    Ok(products)
  }

  #[instrument(name = "Catalog::get", skip(self), err(Display))]
  pub async fn get(&self, id: Uuid) -> StoreResult<Option<Product>> {
    let query = Query::table(Table::Products).select("*").eq("id", id).limit(1);
    self.store.fetch_optional(&query).await
  }

  /// Distinct category labels, sorted.
  #[instrument(name = "Catalog::categories", skip(self), err(Display))]
  pub async fn categories(&self) -> StoreResult<Vec<String>> {
    let rows: Vec<CategoryRow> = self.store.fetch(&Query::table(Table::Products).select("category")).await?;
    let distinct: BTreeSet<String> = rows
      .into_iter()
      .map(|r| r.category)
      .filter(|c| !c.is_empty())
      .collect();
    Ok(distinct.into_iter().collect())
  }
}
