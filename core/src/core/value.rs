// memochain/src/core/value.rs

//! The payload type crossing the engine boundary.
//!
//! Step arguments and step results are both `Value`s. The engine never looks
//! inside a result; it only needs to serialize it into the cache store and
//! read it back. Domain code (the step catalog) decides what the variants mean.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tagged union of everything a step may take or return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
  List(Vec<Value>),
  Record(BTreeMap<String, Value>),
  Table(Table),
}

/// Ordered list of step arguments.
pub type Arguments = Vec<Value>;

impl Value {
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  /// Numeric view; integers widen to `f64`.
  pub fn as_float(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s.as_str()),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[Value]> {
    match self {
      Value::List(items) => Some(items.as_slice()),
      _ => None,
    }
  }

  pub fn as_record(&self) -> Option<&BTreeMap<String, Value>> {
    match self {
      Value::Record(map) => Some(map),
      _ => None,
    }
  }

  pub fn as_table(&self) -> Option<&Table> {
    match self {
      Value::Table(t) => Some(t),
      _ => None,
    }
  }

  /// Returns the path of the first float that is NaN or infinite, if any.
  ///
  /// Such floats have no stable textual form, so they cannot take part in a
  /// content-derived key.
  pub fn find_non_finite(&self) -> Option<String> {
    match self {
      Value::Float(f) if !f.is_finite() => Some(String::new()),
      Value::List(items) => items
        .iter()
        .enumerate()
        .find_map(|(i, v)| v.find_non_finite().map(|p| format!("[{}]{}", i, p))),
      Value::Record(map) => map
        .iter()
        .find_map(|(k, v)| v.find_non_finite().map(|p| format!(".{}{}", k, p))),
      Value::Table(t) => t.rows.iter().enumerate().find_map(|(r, row)| {
        row
          .iter()
          .enumerate()
          .find_map(|(c, v)| v.find_non_finite().map(|p| format!("[row {}, col {}]{}", r, c, p)))
      }),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<u32> for Value {
  fn from(i: u32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self {
    Value::Float(f)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Text(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Text(s)
  }
}

impl From<Table> for Value {
  fn from(t: Table) -> Self {
    Value::Table(t)
  }
}

impl From<BTreeMap<String, Value>> for Value {
  fn from(map: BTreeMap<String, Value>) -> Self {
    Value::Record(map)
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(items: Vec<T>) -> Self {
    Value::List(items.into_iter().map(Into::into).collect())
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(opt: Option<T>) -> Self {
    opt.map_or(Value::Null, Into::into)
  }
}

/// A column-named set of rows, the shape most dashboard steps pass around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
  pub columns: Vec<String>,
  pub rows: Vec<Vec<Value>>,
}

impl Table {
  pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
    Self {
      columns: columns.into_iter().map(Into::into).collect(),
      rows: Vec::new(),
    }
  }

  /// Appends a row; its width must match the column count.
  pub fn push_row(&mut self, row: Vec<Value>) -> anyhow::Result<()> {
    if row.len() != self.columns.len() {
      anyhow::bail!(
        "row has {} cells but table has {} columns",
        row.len(),
        self.columns.len()
      );
    }
    self.rows.push(row);
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| c == name)
  }

  /// All cells of one column, top to bottom.
  pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
    let idx = self.column_index(name)?;
    Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
  }

  /// New table with only the rows for which `keep` returns true.
  pub fn filter_rows<F>(&self, mut keep: F) -> Table
  where
    F: FnMut(&[Value]) -> bool,
  {
    Table {
      columns: self.columns.clone(),
      rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
    }
  }
}
