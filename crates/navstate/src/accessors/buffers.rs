// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Open editor buffers, keyed by file path.

use super::{Entity, list, read, write};
use crate::error::Result;
use crate::schema::FieldSpec;
use crate::store::Store;
use crate::tables::BUFFERS_TABLE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorBufferRow {
    pub path: String,
    pub content: String,
    pub is_dirty: bool,
    pub cursor_line: u32,
    pub cursor_col: u32,
}

pub const BUFFER_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("path"),
    FieldSpec::text("content"),
    FieldSpec::boolean("isDirty", false),
    FieldSpec::number("cursorLine", 0.0),
    FieldSpec::number("cursorCol", 0.0),
];

impl Entity for EditorBufferRow {
    const TABLE: &'static str = BUFFERS_TABLE;
    const FIELDS: &'static [FieldSpec] = BUFFER_FIELDS;
}

#[must_use]
pub fn get_buffer(store: &Store, id: &str) -> Option<EditorBufferRow> {
    read(store, id)
}

pub fn set_buffer(store: &mut Store, id: &str, buffer: &EditorBufferRow) -> Result<()> {
    write(store, id, buffer)
}

#[must_use]
pub fn list_buffers(store: &Store) -> Vec<(String, EditorBufferRow)> {
    list(store)
}

pub fn delete_buffer(store: &mut Store, id: &str) {
    let _ = store.del_row(BUFFERS_TABLE, id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Cell;
    use crate::tables::create_store;

    #[test]
    fn test_buffer_lifecycle() {
        let mut store = create_store();
        let buffer = EditorBufferRow {
            path: "/notes.txt".into(),
            content: "hello".into(),
            is_dirty: true,
            cursor_line: 3,
            cursor_col: 7,
        };
        set_buffer(&mut store, "/notes.txt", &buffer).unwrap();
        assert_eq!(get_buffer(&store, "/notes.txt"), Some(buffer));
        assert_eq!(
            store.get_cell(BUFFERS_TABLE, "/notes.txt", "cursorLine"),
            Some(&Cell::Number(3.0))
        );
        assert_eq!(list_buffers(&store).len(), 1);
        delete_buffer(&mut store, "/notes.txt");
        assert_eq!(get_buffer(&store, "/notes.txt"), None);
    }

    #[test]
    fn test_fractional_cursor_is_invalid() {
        let mut store = create_store();
        store.set_cell(BUFFERS_TABLE, "/a", "path", "/a").unwrap();
        store.set_cell(BUFFERS_TABLE, "/a", "cursorLine", 1.5).unwrap();
        assert_eq!(get_buffer(&store, "/a"), None);
    }
}
