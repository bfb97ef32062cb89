// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Groups, with their memberships nested under `org:hasMembership` and
//! the bare member list under `vcard:hasMember`.

use super::membership::{extract_role_from_membership_json_ld, membership_to_json_ld};
use super::{
    CONTEXT, ID, JsonLdObject, TYPE, as_array, as_node_id, as_object, as_string, get, node_ref,
    put_ref, put_text,
};
use crate::accessors::groups::{GroupRow, GroupType};
use crate::accessors::memberships::{MembershipRow, list_members};
use crate::error::Result;
use crate::store::Store;
use crate::vocab::{self, pod_context};
use serde_json::Value;

fn group_type_term(group_type: GroupType) -> &'static str {
    match group_type {
        GroupType::Organization => vocab::ORG_ORGANIZATION.compact,
        GroupType::Team => vocab::ORG_ORGANIZATIONAL_UNIT.compact,
        GroupType::Group => vocab::VCARD_GROUP.compact,
    }
}

fn group_type_from(types: Option<&Value>) -> GroupType {
    let types: Vec<&str> = as_array(types).into_iter().filter_map(Value::as_str).collect();
    if types.iter().any(|t| vocab::ORG_ORGANIZATION.matches(t)) {
        GroupType::Organization
    } else if types.iter().any(|t| vocab::ORG_ORGANIZATIONAL_UNIT.matches(t)) {
        GroupType::Team
    } else {
        GroupType::Group
    }
}

/// A group and its current memberships, read from `store`.
#[must_use]
pub fn group_to_json_ld(store: &Store, row: &GroupRow, id: &str) -> Value {
    let memberships: Vec<MembershipRow> = list_members(store, id)
        .into_iter()
        .map(|(_, membership)| membership)
        .collect();

    let mut obj = JsonLdObject::new();
    let _ = obj.insert(CONTEXT.into(), pod_context());
    let _ = obj.insert(TYPE.into(), group_type_term(row.group_type).into());
    let _ = obj.insert(ID.into(), id.into());
    let _ = obj.insert(vocab::VCARD_FN.compact.into(), row.name.as_str().into());
    put_text(&mut obj, vocab::DC_DESCRIPTION, &row.description);
    put_text(&mut obj, vocab::VCARD_HAS_URL, &row.url);
    put_text(&mut obj, vocab::VCARD_HAS_LOGO, &row.logo);
    put_ref(&mut obj, vocab::ORG_UNIT_OF, &row.parent_group);
    put_text(&mut obj, vocab::DC_MODIFIED, &row.updated_at);

    if !memberships.is_empty() {
        let members = memberships.iter().map(|m| node_ref(&m.contact_id)).collect();
        let expanded = memberships.iter().map(membership_to_json_ld).collect();
        let _ = obj.insert(vocab::VCARD_HAS_MEMBER.compact.into(), Value::Array(members));
        let _ = obj.insert(vocab::ORG_HAS_MEMBERSHIP.compact.into(), Value::Array(expanded));
    }
    Value::Object(obj)
}

pub fn json_ld_to_group_row(json_ld: &Value) -> Result<(String, GroupRow)> {
    let obj = as_object(json_ld, "group")?;
    let text = |term| as_string(get(obj, term));
    let row = GroupRow {
        name: text(vocab::VCARD_FN),
        group_type: group_type_from(obj.get(TYPE)),
        description: text(vocab::DC_DESCRIPTION),
        url: text(vocab::VCARD_HAS_URL),
        logo: text(vocab::VCARD_HAS_LOGO),
        parent_group: as_node_id(get(obj, vocab::ORG_UNIT_OF)),
        updated_at: text(vocab::DC_MODIFIED),
    };
    Ok((as_string(obj.get(ID)), row))
}

/// Memberships nested in a group object.
///
/// Reads `org:hasMembership` entries; when there are none, falls back to
/// the bare `vcard:hasMember` list with no role or dates. Entries without
/// a member id are skipped.
pub fn extract_memberships_from_group_json_ld(json_ld: &Value) -> Result<Vec<MembershipRow>> {
    let obj = as_object(json_ld, "group")?;
    let group_id = as_string(obj.get(ID));

    let expanded: Vec<MembershipRow> = as_array(get(obj, vocab::ORG_HAS_MEMBERSHIP))
        .into_iter()
        .filter_map(Value::as_object)
        .filter_map(|membership| {
            let contact_id = as_node_id(get(membership, vocab::ORG_MEMBER));
            if contact_id.trim().is_empty() {
                return None;
            }
            let during = get(membership, vocab::ORG_MEMBER_DURING).and_then(Value::as_object);
            let date = |term| during.map(|d| as_string(get(d, term))).unwrap_or_default();
            Some(MembershipRow {
                group_id: group_id.clone(),
                contact_id,
                role: extract_role_from_membership_json_ld(membership),
                start_date: date(vocab::TIME_HAS_BEGINNING),
                end_date: date(vocab::TIME_HAS_END),
            })
        })
        .collect();
    if !expanded.is_empty() {
        return Ok(expanded);
    }

    Ok(as_array(get(obj, vocab::VCARD_HAS_MEMBER))
        .into_iter()
        .map(|member| as_node_id(Some(member)))
        .filter(|contact_id| !contact_id.trim().is_empty())
        .map(|contact_id| MembershipRow::new(group_id.as_str(), contact_id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::contacts::{ContactRow, set_contact};
    use crate::accessors::groups::set_group;
    use crate::accessors::memberships::add_member;
    use crate::tables::create_social_store;
    use serde_json::json;

    fn team() -> GroupRow {
        GroupRow {
            name: "Platform".into(),
            group_type: GroupType::Team,
            description: "Infra folks".into(),
            url: "https://acme.example/platform".into(),
            logo: "https://acme.example/logo.png".into(),
            parent_group: "group_acme".into(),
            updated_at: "2026-02-18T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn test_round_trip_with_memberships() {
        let mut store = create_social_store();
        set_group(&mut store, "group_1", &team()).unwrap();
        set_contact(&mut store, "contact_1", &ContactRow::new("Bob")).unwrap();
        set_contact(&mut store, "contact_2", &ContactRow::new("Carol")).unwrap();
        let lead = MembershipRow {
            start_date: "2025-01-01".into(),
            end_date: "2025-12-31".into(),
            ..MembershipRow::new("group_1", "contact_1").with_role("Lead")
        };
        let _ = add_member(&mut store, &lead).unwrap();
        let _ = add_member(&mut store, &MembershipRow::new("group_1", "contact_2")).unwrap();

        let json = group_to_json_ld(&store, &team(), "group_1");
        assert_eq!(json["@type"], "org:OrganizationalUnit");
        assert_eq!(
            json["vcard:hasMember"],
            json!([{"@id": "contact_1"}, {"@id": "contact_2"}])
        );

        let (id, row) = json_ld_to_group_row(&json).unwrap();
        assert_eq!(id, "group_1");
        assert_eq!(row, team());

        let memberships = extract_memberships_from_group_json_ld(&json).unwrap();
        assert_eq!(memberships, vec![lead, MembershipRow::new("group_1", "contact_2")]);
    }

    #[test]
    fn test_group_types() {
        for group_type in [GroupType::Organization, GroupType::Team, GroupType::Group] {
            let row = GroupRow {
                group_type,
                ..GroupRow::new("g")
            };
            let json = group_to_json_ld(&create_social_store(), &row, "g");
            assert!(json.get("vcard:hasMember").is_none());
            assert_eq!(json_ld_to_group_row(&json).unwrap().1.group_type, group_type);
        }
        let full_iri = json!({"@type": ["http://www.w3.org/ns/org#Organization"]});
        assert_eq!(
            json_ld_to_group_row(&full_iri).unwrap().1.group_type,
            GroupType::Organization
        );
    }

    #[test]
    fn test_direct_member_fallback() {
        let json = json!({
            "@id": "group_x",
            "vcard:hasMember": [{"@id": "contact_a"}, "contact_b", {"name": "no id"}],
        });
        let memberships = extract_memberships_from_group_json_ld(&json).unwrap();
        assert_eq!(
            memberships,
            vec![
                MembershipRow::new("group_x", "contact_a"),
                MembershipRow::new("group_x", "contact_b"),
            ]
        );
    }

    #[test]
    fn test_full_iri_memberships() {
        let json = json!({
            "@id": "group_x",
            "http://www.w3.org/ns/org#hasMembership": {
                "http://www.w3.org/ns/org#member": {"@id": "contact_a"},
                "http://www.w3.org/ns/org#role": "Chair",
                "http://www.w3.org/ns/org#memberDuring": {
                    "http://www.w3.org/2006/time#hasEnd": "2026-01-01"
                }
            },
        });
        let memberships = extract_memberships_from_group_json_ld(&json).unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].role, "Chair");
        assert_eq!(memberships[0].start_date, "");
        assert_eq!(memberships[0].end_date, "2026-01-01");
    }
}
