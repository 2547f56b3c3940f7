//! Paged listing queries.
//!
//! A [`Listing`] pairs a row query with a `COUNT(*)` over the same WHERE
//! clause so every page reports the total number of matching rows.

use rusqlite::{Connection, Row, types::Value};
use stitch_core::query::{Direction, PageRequest};

pub struct Listing {
  /// Column list, e.g. `"c.comment_id, c.content"`.
  columns: String,
  /// FROM clause (tables and inner joins); shared by both queries.
  from:    String,
  /// Joins that only the row query needs, with their parameters.
  extra:   Option<(String, Vec<Value>)>,
  conds:   Vec<String>,
  params:  Vec<Value>,
  order:   String,
  page:    PageRequest,
}

impl Listing {
  pub fn new(
    columns: impl Into<String>,
    from: impl Into<String>,
    order: String,
    page: PageRequest,
  ) -> Self {
    Self {
      columns: columns.into(),
      from: from.into(),
      extra: None,
      conds: Vec::new(),
      params: Vec::new(),
      order,
      page,
    }
  }

  /// Add a join used only when selecting rows (not when counting).
  pub fn join(mut self, clause: &str, params: Vec<Value>) -> Self {
    self.extra = Some((clause.to_owned(), params));
    self
  }

  /// AND a condition onto the WHERE clause. `cond` must contain one `?` per
  /// value, in order.
  pub fn filter(
    &mut self,
    cond: impl Into<String>,
    values: impl IntoIterator<Item = Value>,
  ) -> &mut Self {
    self.conds.push(cond.into());
    self.params.extend(values);
    self
  }

  fn where_clause(&self) -> String {
    if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    }
  }

  /// Run the count and the page query on `conn`.
  pub fn run<T>(
    self,
    conn: &Connection,
    mut map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
  ) -> rusqlite::Result<(i64, Vec<T>)> {
    let where_clause = self.where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM {} {where_clause}", self.from);
    let count: i64 = conn.query_row(
      &count_sql,
      rusqlite::params_from_iter(self.params.iter()),
      |r| r.get(0),
    )?;

    let (join, mut params) = self.extra.unwrap_or_default();
    params.extend(self.params);
    params.push(Value::Integer(to_i64(self.page.limit())));
    params.push(Value::Integer(to_i64(self.page.offset())));

    let select_sql = format!(
      "SELECT {} FROM {} {join} {where_clause} ORDER BY {} LIMIT ? OFFSET ?",
      self.columns, self.from, self.order
    );
    let mut stmt = conn.prepare(&select_sql)?;
    let rows = stmt
      .query_map(rusqlite::params_from_iter(params.iter()), |row| map(row))?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((count, rows))
  }
}

/// `expr DIR, tiebreak DIR`. The tiebreak keeps pages stable when the sort
/// key has duplicates.
pub fn order_clause(expr: &str, direction: Direction, tiebreak: &str) -> String {
  let dir = match direction {
    Direction::Asc => "ASC",
    Direction::Desc => "DESC",
  };
  format!("{expr} {dir}, {tiebreak} {dir}")
}

/// Build a LIKE pattern matching `needle` anywhere, escaping wildcards.
/// Use with `ESCAPE '\'`.
pub fn contains_pattern(needle: &str) -> String {
  let mut pattern = String::with_capacity(needle.len() + 2);
  pattern.push('%');
  for ch in needle.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(ch);
  }
  pattern.push('%');
  pattern
}

fn to_i64(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }
