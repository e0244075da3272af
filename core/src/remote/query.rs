// storefront/src/remote/query.rs

//! Table-scoped query description and its PostgREST query-string encoding.

use std::fmt;

/// The four tables this client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
  Products,
  CartItems,
  Orders,
  OrderItems,
}

impl Table {
  pub const ALL: [Table; 4] = [Table::Products, Table::CartItems, Table::Orders, Table::OrderItems];

  pub fn name(self) -> &'static str {
    match self {
      Table::Products => "products",
      Table::CartItems => "cart_items",
      Table::Orders => "orders",
      Table::OrderItems => "order_items",
    }
  }

  pub fn from_name(name: &str) -> Option<Table> {
    Table::ALL.into_iter().find(|t| t.name() == name)
  }

  /// Column a child table uses to point at a row of this table (`orders` -> `order_id`).
  pub fn foreign_key(self) -> String {
    let name = self.name();
    format!("{}_id", name.strip_suffix('s').unwrap_or(name))
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// `column = value`. The value is kept in its textual form, which is how it travels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
  pub column: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
  pub column: String,
  pub ascending: bool,
}

/// What to read (or which rows to touch, and what to return) in one table.
///
/// For inserts and updates `columns` doubles as the returning list; `None` means
/// nothing is sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
  pub table: Table,
  pub columns: Option<String>,
  pub filters: Vec<Filter>,
  pub order: Option<OrderBy>,
  pub limit: Option<usize>,
}

impl Query {
  pub fn table(table: Table) -> Self {
    Self {
      table,
      columns: None,
      filters: Vec::new(),
      order: None,
      limit: None,
    }
  }

  /// Select list, e.g. `*, product:products(*)`. Whitespace is insignificant.
  pub fn select(mut self, columns: &str) -> Self {
    let compact: String = columns.chars().filter(|c| !c.is_whitespace()).collect();
    self.columns = Some(compact);
    self
  }

  pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
    self.filters.push(Filter {
      column: column.to_string(),
      value: value.to_string(),
    });
    self
  }

  pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
    self.order = Some(OrderBy {
      column: column.to_string(),
      ascending,
    });
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn wants_rows(&self) -> bool {
    self.columns.is_some()
  }

  /// Query-string pairs as the REST endpoint expects them.
  pub fn to_params(&self) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(self.filters.len() + 3);
    if let Some(columns) = &self.columns {
      params.push(("select".to_string(), columns.clone()));
    }
    for f in &self.filters {
      params.push((f.column.clone(), format!("eq.{}", f.value)));
    }
    if let Some(order) = &self.order {
      let dir = if order.ascending { "asc" } else { "desc" };
      params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
    }
    if let Some(limit) = self.limit {
      params.push(("limit".to_string(), limit.to_string()));
    }
    params
  }
}

/// One entry of a parsed select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
  All,
  Column(String),
  /// `alias:table(items)`; without an alias the alias is the table name.
  Embed {
    alias: String,
    table: String,
    items: Vec<SelectItem>,
  },
}

/// Parses a select list such as `*,order_items(*,product:products(*))`.
pub fn parse_select(columns: &str) -> Vec<SelectItem> {
  split_top_level(columns)
    .into_iter()
    .filter(|part| !part.is_empty())
    .map(|part| match part.find('(') {
      Some(open) => {
        let head = &part[..open];
        let inner = part[open + 1..].strip_suffix(')').unwrap_or(&part[open + 1..]);
        let (alias, table) = match head.split_once(':') {
          Some((alias, table)) => (alias, table),
          None => (head, head),
        };
        SelectItem::Embed {
          alias: alias.to_string(),
          table: table.to_string(),
          items: parse_select(inner),
        }
      }
      None if part == "*" => SelectItem::All,
      // `alias:column` renames are not used by this client; keep the source column.
      None => SelectItem::Column(part.rsplit(':').next().unwrap_or(part).to_string()),
    })
    .collect()
}

fn split_top_level(s: &str) -> Vec<&str> {
  let mut parts = Vec::new();
  let mut depth = 0usize;
  let mut start = 0;
  for (i, c) in s.char_indices() {
    match c {
      '(' => depth += 1,
      ')' => depth = depth.saturating_sub(1),
      ',' if depth == 0 => {
        parts.push(s[start..i].trim());
        start = i + 1;
      }
      _ => {}
    }
  }
  parts.push(s[start..].trim());
  parts
}
