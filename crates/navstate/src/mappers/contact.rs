// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{
    CONTEXT, ID, JsonLdObject, TYPE, as_array, as_node_id, as_object, as_string, get, put_multi,
    put_ref, put_text, take_multi,
};
use crate::accessors::contacts::{ContactKind, ContactRow};
use crate::error::Result;
use crate::vocab::{self, Term, pod_context};
use serde_json::Value;

#[must_use]
pub fn contact_to_json_ld(row: &ContactRow, id: &str) -> Value {
    let kind = match row.kind {
        ContactKind::Organization => vocab::VCARD_ORGANIZATION,
        ContactKind::Person | ContactKind::Agent => vocab::VCARD_INDIVIDUAL,
    };
    let mut obj = JsonLdObject::new();
    let _ = obj.insert(CONTEXT.into(), pod_context());
    let _ = obj.insert(TYPE.into(), kind.compact.into());
    let _ = obj.insert(ID.into(), id.into());
    let _ = obj.insert(vocab::VCARD_FN.compact.into(), row.name.as_str().into());
    let _ = obj.insert(vocab::VCARD_HAS_UID.compact.into(), row.uid.as_str().into());
    put_text(&mut obj, vocab::VCARD_NICKNAME, &row.nickname);
    put_multi(&mut obj, vocab::VCARD_HAS_EMAIL, &row.email);
    put_multi(&mut obj, vocab::VCARD_HAS_TELEPHONE, &row.phone);
    put_text(&mut obj, vocab::VCARD_HAS_URL, &row.url);
    put_text(&mut obj, vocab::VCARD_HAS_PHOTO, &row.photo);
    put_text(&mut obj, vocab::VCARD_HAS_NOTE, &row.notes);
    put_text(&mut obj, vocab::VCARD_HAS_ORGANIZATION_NAME, &row.organization);
    put_text(&mut obj, vocab::VCARD_HAS_ROLE, &row.role);
    put_ref(&mut obj, vocab::SOLID_WEBID, &row.web_id);
    put_text(&mut obj, vocab::SCHEMA_APPLICATION_CATEGORY, &row.agent_category);
    put_ref(&mut obj, vocab::VCARD_HAS_RELATED, &row.linked_persona);
    put_text(&mut obj, vocab::DC_MODIFIED, &row.updated_at);
    Value::Object(obj)
}

/// Read a contact back.
///
/// Also accepts a persona card (`foaf:Person`), falling back to its FOAF
/// fields and treating a URL-shaped `@id` as the WebID.
pub fn json_ld_to_contact_row(json_ld: &Value) -> Result<(String, ContactRow)> {
    let obj = as_object(json_ld, "contact")?;
    let text = |term| as_string(get(obj, term));
    let either = |first: Term, fallback: Term| {
        let value = text(first);
        if value.is_empty() { text(fallback) } else { value }
    };

    let raw_id = as_string(obj.get(ID));
    let agent_category = text(vocab::SCHEMA_APPLICATION_CATEGORY);

    let url = match text(vocab::VCARD_HAS_URL) {
        url if url.is_empty() => as_node_id(get(obj, vocab::FOAF_HOMEPAGE)),
        url => url,
    };
    let web_id = match as_node_id(get(obj, vocab::SOLID_WEBID)) {
        web_id if web_id.is_empty() && url::Url::parse(&raw_id).is_ok() => raw_id.clone(),
        web_id => web_id,
    };

    let row = ContactRow {
        name: either(vocab::VCARD_FN, vocab::FOAF_NAME),
        uid: text(vocab::VCARD_HAS_UID),
        nickname: either(vocab::VCARD_NICKNAME, vocab::FOAF_NICK),
        kind: infer_kind(obj, &agent_category),
        email: take_multi(obj, vocab::VCARD_HAS_EMAIL),
        phone: take_multi(obj, vocab::VCARD_HAS_TELEPHONE),
        url,
        photo: either(vocab::VCARD_HAS_PHOTO, vocab::FOAF_IMG),
        notes: either(vocab::VCARD_HAS_NOTE, vocab::VCARD_NOTE),
        organization: text(vocab::VCARD_HAS_ORGANIZATION_NAME),
        role: text(vocab::VCARD_HAS_ROLE),
        web_id,
        agent_category,
        linked_persona: as_node_id(get(obj, vocab::VCARD_HAS_RELATED)),
        updated_at: text(vocab::DC_MODIFIED),
    };
    Ok((raw_id, row))
}

fn infer_kind(obj: &JsonLdObject, agent_category: &str) -> ContactKind {
    let is_org = as_array(obj.get(TYPE))
        .into_iter()
        .filter_map(Value::as_str)
        .any(|t| vocab::VCARD_ORGANIZATION.matches(t));
    if is_org {
        ContactKind::Organization
    } else if !agent_category.trim().is_empty() {
        ContactKind::Agent
    } else {
        ContactKind::Person
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bob() -> ContactRow {
        ContactRow {
            name: "Bob".into(),
            uid: "urn:uuid:bob".into(),
            nickname: "bobby".into(),
            kind: ContactKind::Person,
            email: "bob@example.org".into(),
            phone: r#"["+1 555 0101","+1 555 0102"]"#.into(),
            url: "https://bob.example".into(),
            photo: "https://bob.example/me.jpg".into(),
            notes: "met at the workshop".into(),
            organization: "Acme".into(),
            role: "Engineer".into(),
            web_id: "https://bob.example/profile/card#me".into(),
            agent_category: String::new(),
            linked_persona: "persona_1".into(),
            updated_at: "2026-02-18T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn test_round_trip() {
        let json = contact_to_json_ld(&bob(), "contact_1");
        assert_eq!(json["@type"], "vcard:Individual");
        assert_eq!(json["solid:webid"], json!({"@id": "https://bob.example/profile/card#me"}));
        let (id, row) = json_ld_to_contact_row(&json).unwrap();
        assert_eq!(id, "contact_1");
        assert_eq!(row, bob());
    }

    #[test]
    fn test_kinds_round_trip() {
        let agent = ContactRow {
            kind: ContactKind::Agent,
            agent_category: "Assistant".into(),
            ..bob()
        };
        let (_, row) = json_ld_to_contact_row(&contact_to_json_ld(&agent, "c")).unwrap();
        assert_eq!(row.kind, ContactKind::Agent);

        let org = ContactRow {
            kind: ContactKind::Organization,
            ..bob()
        };
        let json = contact_to_json_ld(&org, "c");
        assert_eq!(json["@type"], "vcard:Organization");
        let (_, row) = json_ld_to_contact_row(&json).unwrap();
        assert_eq!(row.kind, ContactKind::Organization);
    }

    #[test]
    fn test_persona_card_fallbacks() {
        let card = json!({
            "@id": "https://alice.example/profile/card#me",
            "@type": "foaf:Person",
            "foaf:name": "Alice",
            "foaf:nick": "al",
            "foaf:homepage": {"@id": "https://alice.example"},
            "foaf:img": "https://alice.example/a.png",
            "vcard:note": "hello",
        });
        let (id, row) = json_ld_to_contact_row(&card).unwrap();
        assert_eq!(id, "https://alice.example/profile/card#me");
        assert_eq!(row.name, "Alice");
        assert_eq!(row.nickname, "al");
        assert_eq!(row.url, "https://alice.example");
        assert_eq!(row.photo, "https://alice.example/a.png");
        assert_eq!(row.notes, "hello");
        assert_eq!(row.web_id, "https://alice.example/profile/card#me");
        assert_eq!(row.kind, ContactKind::Person);
        assert_eq!(row.uid, "");
    }

    #[test]
    fn test_non_url_id_is_not_a_webid() {
        let (_, row) = json_ld_to_contact_row(&json!({"@id": "contact_9", "vcard:fn": "X"})).unwrap();
        assert_eq!(row.web_id, "");
    }
}
