// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use navfs::{FilePath, FilesystemDriver, NativeDriver};
use navstate::accessors::contacts::{ContactRow, list_contacts, set_contact};
use navstate::accessors::groups::{GroupRow, GroupType, list_groups, set_group};
use navstate::accessors::memberships::{MembershipRow, add_member, list_memberships};
use navstate::accessors::personas::{PersonaRow, list_personas, set_persona};
use navstate::{
    BundleCounts, create_social_store, import_social_bundle, load_store, read_social_bundle,
    save_store, write_social_bundle,
};
use tempfile::TempDir;

fn host_file(tmp: &TempDir, rel: &str) -> FilePath {
    FilePath::new(format!("{}{rel}", tmp.path().to_string_lossy())).unwrap()
}

fn populated() -> navstate::Store {
    let mut store = create_social_store();
    set_persona(
        &mut store,
        "persona_1",
        &PersonaRow {
            email: "ada@example.org".into(),
            ..PersonaRow::new("Ada")
        },
    )
    .unwrap();
    set_contact(
        &mut store,
        "contact_1",
        &ContactRow {
            email: r#"["bob@example.org","bob@work.example"]"#.into(),
            organization: "Acme".into(),
            ..ContactRow::new("Bob")
        },
    )
    .unwrap();
    set_group(
        &mut store,
        "group_1",
        &GroupRow {
            group_type: GroupType::Organization,
            ..GroupRow::new("Acme")
        },
    )
    .unwrap();
    let _ = add_member(
        &mut store,
        &MembershipRow::new("group_1", "contact_1").with_role("Engineer"),
    )
    .unwrap();
    store
}

#[tokio::test]
async fn test_bundle_round_trip_through_disk() {
    let tmp = TempDir::new().unwrap();
    let driver = NativeDriver::new();
    let path = host_file(&tmp, "/exports/solid-export.json");

    let source = populated();
    let _ = write_social_bundle(&driver, &path, &source).await.unwrap();
    assert!(tmp.path().join("exports/solid-export.json").exists());

    let bundle = read_social_bundle(&driver, &path).await.unwrap();
    let mut target = create_social_store();
    let counts = import_social_bundle(&mut target, &bundle).unwrap();
    assert_eq!(
        counts,
        BundleCounts {
            personas: 1,
            contacts: 1,
            groups: 1,
            memberships: 1
        }
    );

    assert_eq!(list_personas(&target), list_personas(&source));
    assert_eq!(list_contacts(&target), list_contacts(&source));
    assert_eq!(list_groups(&target), list_groups(&source));
    let memberships = list_memberships(&target);
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].1.role, "Engineer");
}

#[tokio::test]
async fn test_import_is_idempotent() {
    let source = populated();
    let bundle = navstate::export_social_bundle(&source);
    let mut target = create_social_store();
    let _ = import_social_bundle(&mut target, &bundle).unwrap();
    let _ = import_social_bundle(&mut target, &bundle).unwrap();
    assert_eq!(list_contacts(&target).len(), 1);
    assert_eq!(list_memberships(&target).len(), 1);
}

#[tokio::test]
async fn test_store_survives_save_and_load() {
    let tmp = TempDir::new().unwrap();
    let driver = NativeDriver::new();
    let path = host_file(&tmp, "/.naveditor/state.json");

    let source = populated();
    save_store(&driver, &path, &source).await.unwrap();
    assert!(driver.exists(&path).await);

    let (loaded, _) = load_store(&driver, &path).await.unwrap();
    assert_eq!(list_contacts(&loaded), list_contacts(&source));
    assert_eq!(list_memberships(&loaded), list_memberships(&source));
}
