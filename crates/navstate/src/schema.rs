// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Field-level table schemas and the pure validators over them.
//!
//! A schema is a static slice of [`FieldSpec`]. Two checks use it:
//!
//! * [`coerce_row`] is what the store applies on every write. It keeps the
//!   cells whose type matches, fills declared defaults and drops the rest.
//!   It never fails; an empty result means the write is rejected.
//! * [`validate_row`] is what accessors apply. It is strict: every missing
//!   required field and every mistyped or out-of-range cell is reported.

use crate::store::{Cell, Row};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Boolean,
    Number,
    String,
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellType::Boolean => "boolean",
            CellType::Number => "number",
            CellType::String => "string",
        })
    }
}

/// A default that can live in a `const` schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellDefault {
    Boolean(bool),
    Number(f64),
    String(&'static str),
}

impl CellDefault {
    #[must_use]
    pub fn to_cell(self) -> Cell {
        match self {
            CellDefault::Boolean(b) => Cell::Boolean(b),
            CellDefault::Number(n) => Cell::Number(n),
            CellDefault::String(s) => Cell::String(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
    /// Must be present; any value of the right type.
    Required,
    /// Must be present and, for strings, non-empty.
    NonEmpty,
    /// Filled in when absent.
    Default(CellDefault),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: CellType,
    pub presence: Presence,
    /// Permitted string values; empty means unrestricted.
    pub allowed: &'static [&'static str],
}

impl FieldSpec {
    #[must_use]
    pub const fn required(name: &'static str, ty: CellType) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Required,
            allowed: &[],
        }
    }

    /// A string that must be present and non-empty.
    #[must_use]
    pub const fn non_empty(name: &'static str) -> Self {
        Self {
            name,
            ty: CellType::String,
            presence: Presence::NonEmpty,
            allowed: &[],
        }
    }

    /// An optional string, defaulting to `""`.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            ty: CellType::String,
            presence: Presence::Default(CellDefault::String("")),
            allowed: &[],
        }
    }

    #[must_use]
    pub const fn boolean(name: &'static str, default: bool) -> Self {
        Self {
            name,
            ty: CellType::Boolean,
            presence: Presence::Default(CellDefault::Boolean(default)),
            allowed: &[],
        }
    }

    #[must_use]
    pub const fn number(name: &'static str, default: f64) -> Self {
        Self {
            name,
            ty: CellType::Number,
            presence: Presence::Default(CellDefault::Number(default)),
            allowed: &[],
        }
    }

    #[must_use]
    pub const fn one_of(self, allowed: &'static [&'static str]) -> Self {
        Self { allowed, ..self }
    }

    fn default_cell(&self) -> Option<Cell> {
        match self.presence {
            Presence::Default(d) => Some(d.to_cell()),
            Presence::Required | Presence::NonEmpty => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field name, or empty for the row as a whole.
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn root<M: Into<String>>(message: M) -> Self {
        Self::new("", message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = if self.field.is_empty() {
            "<root>"
        } else {
            &self.field
        };
        write!(f, "{field}: {}", self.message)
    }
}

/// Strict check of `row` against `schema`.
///
/// On success returns the normalized row: schema fields only, defaults
/// filled. Unknown cells are dropped, not reported.
pub fn validate_row(schema: &[FieldSpec], row: &Row) -> Result<Row, Vec<ValidationIssue>> {
    let mut out = Row::new();
    let mut issues = Vec::new();

    for field in schema {
        let Some(cell) = row.get(field.name) else {
            match field.default_cell() {
                Some(default) => {
                    let _ = out.insert(field.name.to_string(), default);
                }
                None => issues.push(ValidationIssue::new(field.name, "required")),
            }
            continue;
        };

        if cell.cell_type() != field.ty {
            issues.push(ValidationIssue::new(
                field.name,
                format!("expected {}, found {}", field.ty, cell.cell_type()),
            ));
            continue;
        }

        if let Cell::String(s) = cell {
            if field.presence == Presence::NonEmpty && s.is_empty() {
                issues.push(ValidationIssue::new(field.name, "must not be empty"));
                continue;
            }
            if !field.allowed.is_empty() && !field.allowed.contains(&s.as_str()) {
                issues.push(ValidationIssue::new(
                    field.name,
                    format!("expected one of {}", field.allowed.join(", ")),
                ));
                continue;
            }
        }

        let _ = out.insert(field.name.to_string(), cell.clone());
    }

    if issues.is_empty() {
        Ok(out)
    } else {
        Err(issues)
    }
}

/// Lenient store-level coercion. Never fails.
#[must_use]
pub fn coerce_row(schema: &[FieldSpec], row: &Row) -> Row {
    let mut out = Row::new();
    for field in schema {
        match row.get(field.name) {
            Some(cell) if cell.cell_type() == field.ty => {
                let _ = out.insert(field.name.to_string(), cell.clone());
            }
            _ => {
                if let Some(default) = field.default_cell() {
                    let _ = out.insert(field.name.to_string(), default);
                }
            }
        }
    }
    out
}

/// Whether at least one cell of `row` survives coercion on its own merit.
pub(crate) fn has_valid_cell(schema: &[FieldSpec], row: &Row) -> bool {
    schema
        .iter()
        .any(|field| row.get(field.name).is_some_and(|c| c.cell_type() == field.ty))
}
