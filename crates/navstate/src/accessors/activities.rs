// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Append-only activity log. Rows are never updated individually; the
//! only removal is clearing the whole table.

use super::{Entity, list, write};
use crate::error::Result;
use crate::ids::now_timestamp;
use crate::schema::FieldSpec;
use crate::store::Store;
use crate::tables::ACTIVITIES_TABLE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub actor_persona_id: String,
    /// `persona`, `contact`, `group`, `file`, ...
    pub subject_type: String,
    pub subject_id: String,
    pub activity_type: String,
    /// JSON text.
    pub payload: String,
    pub timestamp: String,
}

impl ActivityRow {
    pub fn new<A, T, S, K>(actor_persona_id: A, subject_type: T, subject_id: S, activity_type: K) -> Self
    where
        A: Into<String>,
        T: Into<String>,
        S: Into<String>,
        K: Into<String>,
    {
        Self {
            actor_persona_id: actor_persona_id.into(),
            subject_type: subject_type.into(),
            subject_id: subject_id.into(),
            activity_type: activity_type.into(),
            payload: "{}".to_string(),
            timestamp: now_timestamp(),
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: &serde_json::Value) -> Self {
        self.payload = payload.to_string();
        self
    }
}

pub const ACTIVITY_FIELDS: &[FieldSpec] = &[
    FieldSpec::non_empty("actorPersonaId"),
    FieldSpec::non_empty("subjectType"),
    FieldSpec::non_empty("subjectId"),
    FieldSpec::non_empty("activityType"),
    FieldSpec::text("payload"),
    FieldSpec::non_empty("timestamp"),
];

impl Entity for ActivityRow {
    const TABLE: &'static str = ACTIVITIES_TABLE;
    const FIELDS: &'static [FieldSpec] = ACTIVITY_FIELDS;
}

pub fn log_activity(store: &mut Store, id: &str, activity: &ActivityRow) -> Result<()> {
    write(store, id, activity)
}

#[must_use]
pub fn list_activities(store: &Store) -> Vec<(String, ActivityRow)> {
    list(store)
}

#[must_use]
pub fn list_activities_for_subject(
    store: &Store,
    subject_type: &str,
    subject_id: &str,
) -> Vec<(String, ActivityRow)> {
    list_activities(store)
        .into_iter()
        .filter(|(_, row)| row.subject_type == subject_type && row.subject_id == subject_id)
        .collect()
}

pub fn clear_activities(store: &mut Store) {
    let _ = store.del_table(ACTIVITIES_TABLE);
}
