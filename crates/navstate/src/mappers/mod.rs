// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Conversion between store rows and JSON-LD objects.
//!
//! Export writes compact keys and omits empty fields. Import reads either
//! key spelling and defaults whatever is missing; it never invents values.
//! Multi-valued email and phone fields are stored as a single string, or
//! as a JSON array in one cell when there is more than one.

pub mod contact;
pub mod group;
pub mod membership;
pub mod persona;

pub use contact::{contact_to_json_ld, json_ld_to_contact_row};
pub use group::{extract_memberships_from_group_json_ld, group_to_json_ld, json_ld_to_group_row};
pub use membership::{extract_role_from_membership_json_ld, membership_to_json_ld};
pub use persona::{json_ld_to_persona_row, persona_to_json_ld};

use crate::error::{Result, StateError};
use crate::vocab::Term;
use serde_json::{Map, Value};

pub type JsonLdObject = Map<String, Value>;

pub(crate) const ID: &str = "@id";
pub(crate) const TYPE: &str = "@type";
pub(crate) const CONTEXT: &str = "@context";

pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a JsonLdObject> {
    value
        .as_object()
        .ok_or_else(|| StateError::invalid_input(format!("{what} JSON-LD must be an object")))
}

fn non_empty(s: &str) -> bool {
    !s.trim().is_empty()
}

/// `obj[term]`, trying the compact key first.
pub(crate) fn get<'a>(obj: &'a JsonLdObject, term: Term) -> Option<&'a Value> {
    obj.get(term.compact)
        .filter(|v| !v.is_null())
        .or_else(|| obj.get(term.iri))
}

pub(crate) fn as_string(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// A plain string or the `@id` of a node reference.
pub(crate) fn as_node_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(o)) => as_string(o.get(ID)),
        _ => String::new(),
    }
}

pub(crate) fn as_array(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    }
}

pub(crate) fn put_text(obj: &mut JsonLdObject, term: Term, value: &str) {
    if non_empty(value) {
        let _ = obj.insert(term.compact.to_string(), Value::String(value.to_string()));
    }
}

pub(crate) fn put_ref(obj: &mut JsonLdObject, term: Term, value: &str) {
    if non_empty(value) {
        let _ = obj.insert(term.compact.to_string(), node_ref(value));
    }
}

pub(crate) fn node_ref(id: &str) -> Value {
    let mut o = JsonLdObject::new();
    let _ = o.insert(ID.to_string(), Value::String(id.to_string()));
    Value::Object(o)
}

/// Emit a multi-valued cell as one string or an array.
pub(crate) fn put_multi(obj: &mut JsonLdObject, term: Term, cell: &str) {
    let values = parse_multi_cell(cell);
    let value = match values.len() {
        0 => return,
        1 => Value::String(values[0].clone()),
        _ => Value::Array(values.into_iter().map(Value::String).collect()),
    };
    let _ = obj.insert(term.compact.to_string(), value);
}

/// Read a multi-valued field back into a cell.
pub(crate) fn take_multi(obj: &JsonLdObject, term: Term) -> String {
    to_multi_cell(&multi_field(get(obj, term)))
}

fn parse_multi_cell(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    let single = || {
        if non_empty(trimmed) {
            vec![trimmed.to_string()]
        } else {
            Vec::new()
        }
    };
    if !trimmed.starts_with('[') {
        return single();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| non_empty(s))
            .map(str::to_string)
            .collect(),
        _ => single(),
    }
}

fn multi_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().flat_map(|v| multi_field(Some(v))).collect(),
        other => {
            let scalar = as_node_id(other).trim().to_string();
            if scalar.is_empty() {
                Vec::new()
            } else {
                vec![scalar]
            }
        }
    }
}

fn to_multi_cell(values: &[String]) -> String {
    match values {
        [] => String::new(),
        [one] => one.clone(),
        many => Value::from(many.to_vec()).to_string(),
    }
}
