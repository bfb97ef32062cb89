// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Social bundle export and import.
//!
//! A bundle is one JSON document with the personas, contacts and groups in
//! JSON-LD form. Memberships travel nested inside their groups.

use crate::accessors::contacts::{list_contacts, set_contact};
use crate::accessors::groups::{list_groups, set_group};
use crate::accessors::memberships::{add_member, membership_row_id};
use crate::accessors::personas::{list_personas, set_persona};
use crate::error::{Result, StateError};
use crate::mappers::{
    contact_to_json_ld, extract_memberships_from_group_json_ld, group_to_json_ld,
    json_ld_to_contact_row, json_ld_to_group_row, json_ld_to_persona_row, persona_to_json_ld,
};
use crate::store::Store;
use diagnostics::{log_info, log_warn};
use navfs::{FilePath, FilesystemDriver};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default file name for `social-export`.
pub const DEFAULT_BUNDLE_FILE: &str = "solid-export.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialBundle {
    #[serde(default)]
    pub personas: Vec<Value>,
    #[serde(default)]
    pub contacts: Vec<Value>,
    #[serde(default)]
    pub groups: Vec<Value>,
}

/// Rows written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BundleCounts {
    pub personas: usize,
    pub contacts: usize,
    pub groups: usize,
    pub memberships: usize,
}

impl std::fmt::Display for BundleCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} personas, {} contacts, {} groups, {} memberships",
            self.personas, self.contacts, self.groups, self.memberships
        )
    }
}

#[must_use]
pub fn export_social_bundle(store: &Store) -> SocialBundle {
    SocialBundle {
        personas: list_personas(store)
            .iter()
            .map(|(id, row)| persona_to_json_ld(row, id))
            .collect(),
        contacts: list_contacts(store)
            .iter()
            .map(|(id, row)| contact_to_json_ld(row, id))
            .collect(),
        groups: list_groups(store)
            .iter()
            .map(|(id, row)| group_to_json_ld(store, row, id))
            .collect(),
    }
}

/// Merge a bundle into `store`.
///
/// Personas, contacts and groups are written first so that memberships
/// can refer to them. Records that fail validation, and memberships whose
/// group or contact is missing, are skipped with a warning and not
/// counted. Only a malformed record shape is an error.
pub fn import_social_bundle(store: &mut Store, bundle: &SocialBundle) -> Result<BundleCounts> {
    let mut counts = BundleCounts::default();

    for json in &bundle.personas {
        let (id, row) = json_ld_to_persona_row(json)?;
        match set_persona(store, &id, &row) {
            Ok(()) => counts.personas += 1,
            Err(e) => skip("persona", &id, &e),
        }
    }
    for json in &bundle.contacts {
        let (id, row) = json_ld_to_contact_row(json)?;
        match set_contact(store, &id, &row) {
            Ok(()) => counts.contacts += 1,
            Err(e) => skip("contact", &id, &e),
        }
    }
    for json in &bundle.groups {
        let (id, row) = json_ld_to_group_row(json)?;
        match set_group(store, &id, &row) {
            Ok(()) => counts.groups += 1,
            Err(e) => skip("group", &id, &e),
        }
    }
    for json in &bundle.groups {
        for membership in extract_memberships_from_group_json_ld(json)? {
            match add_member(store, &membership) {
                Ok(_) => counts.memberships += 1,
                Err(e) => {
                    let id = membership_row_id(&membership.group_id, &membership.contact_id);
                    skip("membership", &id, &e);
                }
            }
        }
    }

    let summary = counts.to_string();
    log_info!("imported social bundle: {summary}", summary: summary);
    Ok(counts)
}

fn skip(what: &str, id: &str, err: &StateError) {
    let err = err.to_string();
    log_warn!("skipping {what} {id} from bundle: {error}", what: what, id: id, error: err);
}

/// Export `store` and write the bundle as pretty JSON, creating the parent
/// directory.
pub async fn write_social_bundle(
    driver: &dyn FilesystemDriver,
    path: &FilePath,
    store: &Store,
) -> Result<SocialBundle> {
    let bundle = export_social_bundle(store);
    let json = serde_json::to_vec_pretty(&bundle)?;
    if let Some(parent) = path.parent() {
        driver.mkdir(&parent).await?;
    }
    driver.write_file(path, &json).await?;
    Ok(bundle)
}

/// Read a bundle file. Missing top-level arrays are treated as empty.
pub async fn read_social_bundle(driver: &dyn FilesystemDriver, path: &FilePath) -> Result<SocialBundle> {
    let data = driver.read_file(path).await?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::contacts::ContactRow;
    use crate::accessors::groups::GroupRow;
    use crate::accessors::memberships::{MembershipRow, list_memberships};
    use crate::accessors::personas::PersonaRow;
    use crate::tables::create_social_store;
    use serde_json::json;

    #[test]
    fn test_empty_bundle_shape() {
        let bundle = export_social_bundle(&create_social_store());
        assert_eq!(
            serde_json::to_value(&bundle).unwrap(),
            json!({"personas": [], "contacts": [], "groups": []})
        );
        let parsed: SocialBundle = serde_json::from_str(r#"{"contacts": []}"#).unwrap();
        assert!(parsed.personas.is_empty() && parsed.groups.is_empty());
    }

    #[test]
    fn test_dangling_membership_is_skipped() {
        let mut source = create_social_store();
        set_group(&mut source, "group_1", &GroupRow::new("Team")).unwrap();
        set_contact(&mut source, "contact_1", &ContactRow::new("Bob")).unwrap();
        let _ = add_member(&mut source, &MembershipRow::new("group_1", "contact_1")).unwrap();

        let mut bundle = export_social_bundle(&source);
        bundle.contacts.clear();

        let mut target = create_social_store();
        let counts = import_social_bundle(&mut target, &bundle).unwrap();
        assert_eq!(
            counts,
            BundleCounts {
                personas: 0,
                contacts: 0,
                groups: 1,
                memberships: 0
            }
        );
        assert!(list_memberships(&target).is_empty());
    }

    #[test]
    fn test_invalid_record_is_skipped() {
        let mut source = create_social_store();
        set_persona(&mut source, "persona_1", &PersonaRow::new("Ada")).unwrap();
        let mut bundle = export_social_bundle(&source);
        bundle.contacts.push(json!({"@id": "contact_x", "vcard:fn": "No uid"}));

        let mut target = create_social_store();
        let counts = import_social_bundle(&mut target, &bundle).unwrap();
        assert_eq!(counts.personas, 1);
        assert_eq!(counts.contacts, 0);
    }

    #[test]
    fn test_non_object_record_is_an_error() {
        let bundle = SocialBundle {
            groups: vec![json!("group_1")],
            ..SocialBundle::default()
        };
        assert!(import_social_bundle(&mut create_social_store(), &bundle).is_err());
    }
}
