// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{Entity, list, read, write};
use crate::error::Result;
use crate::ids::now_timestamp;
use crate::schema::{CellType, FieldSpec};
use crate::store::Store;
use crate::tables::{GROUPS_TABLE, MEMBERSHIPS_TABLE};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Organization,
    Team,
    #[default]
    Group,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroupType::Organization => "organization",
            GroupType::Team => "team",
            GroupType::Group => "group",
        })
    }
}

impl std::str::FromStr for GroupType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "organization" | "org" => Ok(GroupType::Organization),
            "team" => Ok(GroupType::Team),
            "group" => Ok(GroupType::Group),
            other => Err(format!("unknown group type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRow {
    pub name: String,
    pub group_type: GroupType,
    pub description: String,
    pub url: String,
    pub logo: String,
    /// Id of the enclosing group, if any.
    pub parent_group: String,
    pub updated_at: String,
}

impl GroupRow {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            updated_at: now_timestamp(),
            ..Self::default()
        }
    }
}

pub const GROUP_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("name"),
    FieldSpec::non_empty("groupType").one_of(&["organization", "team", "group"]),
    FieldSpec::text("description"),
    FieldSpec::text("url"),
    FieldSpec::text("logo"),
    FieldSpec::text("parentGroup"),
    FieldSpec::required("updatedAt", CellType::String),
];

impl Entity for GroupRow {
    const TABLE: &'static str = GROUPS_TABLE;
    const FIELDS: &'static [FieldSpec] = GROUP_FIELDS;
}

#[must_use]
pub fn get_group(store: &Store, id: &str) -> Option<GroupRow> {
    read(store, id)
}

pub fn set_group(store: &mut Store, id: &str, group: &GroupRow) -> Result<()> {
    write(store, id, group)
}

#[must_use]
pub fn list_groups(store: &Store) -> Vec<(String, GroupRow)> {
    list(store)
}

/// Remove every membership of the group, then the group.
pub fn delete_group(store: &mut Store, id: &str) {
    let stale: Vec<String> = store
        .rows(MEMBERSHIPS_TABLE)
        .filter(|(_, row)| row.get("groupId").and_then(|c| c.as_str()) == Some(id))
        .map(|(rid, _)| rid.to_string())
        .collect();
    for rid in stale {
        let _ = store.del_row(MEMBERSHIPS_TABLE, &rid);
    }
    let _ = store.del_row(GROUPS_TABLE, id);
}
