// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-process tabular store with change notification.
//!
//! Tables map row ids to rows of scalar cells; rows keep insertion order.
//! Alongside the tables is a flat map of named scalar values. A table or
//! value may carry a schema, in which case every write is coerced through
//! it (see [`crate::schema::coerce_row`]).
//!
//! The store is synchronous and single-owner. Writers take `&mut self`;
//! listeners run inline after each committed change.

use crate::error::{Result, StateError};
use crate::schema::{self, CellType, FieldSpec};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Boolean(bool),
    Number(f64),
    String(String),
}

/// Largest integer an f64 holds exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Boolean(b) => serializer.serialize_bool(*b),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT => {
                serializer.serialize_i64(*n as i64)
            }
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Cell {
    #[must_use]
    pub fn cell_type(&self) -> CellType {
        match self {
            Cell::Boolean(_) => CellType::Boolean,
            Cell::Number(_) => CellType::Number,
            Cell::String(_) => CellType::String,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert a JSON scalar. Null, arrays and objects are not cells.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Cell> {
        match value {
            serde_json::Value::Bool(b) => Some(Cell::Boolean(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number),
            serde_json::Value::String(s) => Some(Cell::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Boolean(b) => write!(f, "{b}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Boolean(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

pub type Row = BTreeMap<String, Cell>;

/// What changed. Delivered to listeners after the change is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Row { table: String, id: String },
    Table { table: String },
    Value { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default, Clone)]
struct TableData {
    order: Vec<String>,
    rows: BTreeMap<String, Row>,
}

impl TableData {
    fn insert(&mut self, id: &str, row: Row) {
        if self.rows.insert(id.to_string(), row).is_none() {
            self.order.push(id.to_string());
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        if self.rows.remove(id).is_none() {
            return false;
        }
        self.order.retain(|k| k != id);
        true
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).map(|row| (id.as_str(), row)))
    }
}

#[derive(Debug, Clone)]
struct ValueSchema {
    ty: CellType,
    default: Cell,
}

type Listener = Box<dyn FnMut(&StoreChange) + Send>;

#[derive(Default)]
pub struct Store {
    tables: BTreeMap<String, TableData>,
    values: BTreeMap<String, Cell>,
    table_schemas: BTreeMap<String, &'static [FieldSpec]>,
    value_schemas: BTreeMap<String, ValueSchema>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .field("values", &self.values)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema for `table` and coerce any rows already present.
    pub fn set_table_schema(&mut self, table: &str, fields: &'static [FieldSpec]) {
        self.register_table_schema(table, fields);
        let Some(data) = self.tables.get_mut(table) else {
            return;
        };
        let mut rejected = Vec::new();
        for (id, row) in &mut data.rows {
            if schema::has_valid_cell(fields, row) {
                *row = schema::coerce_row(fields, row);
            } else {
                rejected.push(id.clone());
            }
        }
        for id in rejected {
            let _ = data.remove(&id);
        }
        if data.rows.is_empty() {
            let _ = self.tables.remove(table);
        }
    }

    /// Register a schema for `table` leaving existing rows untouched.
    /// Rows are coerced only when they are next written.
    pub fn register_table_schema(&mut self, table: &str, fields: &'static [FieldSpec]) {
        let _ = self.table_schemas.insert(table.to_string(), fields);
    }

    #[must_use]
    pub fn table_schema(&self, table: &str) -> Option<&'static [FieldSpec]> {
        self.table_schemas.get(table).copied()
    }

    /// Register a typed value with a default. A missing or mistyped
    /// current value is replaced by the default.
    pub fn set_value_schema(&mut self, id: &str, ty: CellType, default: Cell) {
        let keep = self.values.get(id).is_some_and(|c| c.cell_type() == ty);
        if !keep {
            let _ = self.values.insert(id.to_string(), default.clone());
        }
        let _ = self
            .value_schemas
            .insert(id.to_string(), ValueSchema { ty, default });
    }

    #[must_use]
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    #[must_use]
    pub fn has_row(&self, table: &str, id: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|t| t.rows.contains_key(id))
    }

    #[must_use]
    pub fn get_row(&self, table: &str, id: &str) -> Option<&Row> {
        self.tables.get(table).and_then(|t| t.rows.get(id))
    }

    #[must_use]
    pub fn get_cell(&self, table: &str, id: &str, cell: &str) -> Option<&Cell> {
        self.get_row(table, id).and_then(|row| row.get(cell))
    }

    /// Rows of `table` in insertion order.
    pub fn rows<'a>(&'a self, table: &str) -> impl Iterator<Item = (&'a str, &'a Row)> + use<'a> {
        self.tables.get(table).into_iter().flat_map(|t| t.iter())
    }

    /// Owned copy of `table`, in insertion order.
    #[must_use]
    pub fn get_table(&self, table: &str) -> Vec<(String, Row)> {
        self.rows(table)
            .map(|(id, row)| (id.to_string(), row.clone()))
            .collect()
    }

    #[must_use]
    pub fn row_ids(&self, table: &str) -> Vec<String> {
        self.rows(table).map(|(id, _)| id.to_string()).collect()
    }

    #[must_use]
    pub fn table_ids(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Replace a whole row.
    pub fn set_row(&mut self, table: &str, id: &str, row: Row) -> Result<()> {
        if table.is_empty() || id.is_empty() {
            return Err(StateError::invalid_input("table and row id must not be empty"));
        }
        let row = match self.table_schema(table) {
            Some(fields) => {
                if !schema::has_valid_cell(fields, &row) {
                    return Err(StateError::RejectedRow {
                        table: table.to_string(),
                        id: id.to_string(),
                    });
                }
                schema::coerce_row(fields, &row)
            }
            None if row.is_empty() => {
                return Err(StateError::RejectedRow {
                    table: table.to_string(),
                    id: id.to_string(),
                });
            }
            None => row,
        };
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(id, row);
        self.notify(&StoreChange::Row {
            table: table.to_string(),
            id: id.to_string(),
        });
        Ok(())
    }

    /// Set one cell, creating the row if needed.
    pub fn set_cell<C: Into<Cell>>(
        &mut self,
        table: &str,
        id: &str,
        cell: &str,
        value: C,
    ) -> Result<()> {
        let mut row = self.get_row(table, id).cloned().unwrap_or_default();
        let _ = row.insert(cell.to_string(), value.into());
        self.set_row(table, id, row)
    }

    /// Returns whether a row was removed. Empty tables disappear.
    pub fn del_row(&mut self, table: &str, id: &str) -> bool {
        let Some(data) = self.tables.get_mut(table) else {
            return false;
        };
        if !data.remove(id) {
            return false;
        }
        if data.rows.is_empty() {
            let _ = self.tables.remove(table);
        }
        self.notify(&StoreChange::Row {
            table: table.to_string(),
            id: id.to_string(),
        });
        true
    }

    pub fn del_table(&mut self, table: &str) -> bool {
        if self.tables.remove(table).is_none() {
            return false;
        }
        self.notify(&StoreChange::Table {
            table: table.to_string(),
        });
        true
    }

    #[must_use]
    pub fn get_value(&self, id: &str) -> Option<&Cell> {
        self.values.get(id)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set_value<C: Into<Cell>>(&mut self, id: &str, value: C) -> Result<()> {
        let value = value.into();
        if let Some(schema) = self.value_schemas.get(id) {
            if value.cell_type() != schema.ty {
                return Err(StateError::invalid_input(format!(
                    "value {id} expects {}, got {}",
                    schema.ty,
                    value.cell_type()
                )));
            }
        }
        let _ = self.values.insert(id.to_string(), value);
        self.notify(&StoreChange::Value { id: id.to_string() });
        Ok(())
    }

    /// Remove a value, or reset it to its schema default.
    pub fn del_value(&mut self, id: &str) {
        let changed = match self.value_schemas.get(id) {
            Some(schema) => {
                let default = schema.default.clone();
                self.values.insert(id.to_string(), default.clone()) != Some(default)
            }
            None => self.values.remove(id).is_some(),
        };
        if changed {
            self.notify(&StoreChange::Value { id: id.to_string() });
        }
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StoreChange) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: &StoreChange) {
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }

    /// Serializable copy of all tables and values.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tables: self
                .tables
                .iter()
                .map(|(name, data)| {
                    let rows = data
                        .iter()
                        .map(|(id, row)| SnapshotRow {
                            id: id.to_string(),
                            row: row.clone(),
                        })
                        .collect();
                    (name.clone(), rows)
                })
                .collect(),
            values: self.values.clone(),
        }
    }

    /// A schema-less store holding exactly the snapshot's data.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self::new();
        for (name, rows) in snapshot.tables {
            let data = store.tables.entry(name).or_default();
            for SnapshotRow { id, row } in rows {
                if !id.is_empty() && !row.is_empty() {
                    data.insert(&id, row);
                }
            }
        }
        store.tables.retain(|_, data| !data.rows.is_empty());
        store.values = snapshot.values;
        store
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<SnapshotRow>>,
    #[serde(default)]
    pub values: BTreeMap<String, Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub id: String,
    pub row: Row,
}
