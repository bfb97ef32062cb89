// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{
    CONTEXT, ID, JsonLdObject, TYPE, as_node_id, as_object, as_string, get, put_multi, put_ref,
    put_text, take_multi,
};
use crate::accessors::personas::PersonaRow;
use crate::error::Result;
use crate::vocab::{self, pod_context};
use serde_json::Value;

/// A persona as a `foaf:Person`.
#[must_use]
pub fn persona_to_json_ld(row: &PersonaRow, id: &str) -> Value {
    let mut obj = JsonLdObject::new();
    let _ = obj.insert(CONTEXT.into(), pod_context());
    let _ = obj.insert(TYPE.into(), vocab::FOAF_PERSON.compact.into());
    let _ = obj.insert(ID.into(), id.into());
    let _ = obj.insert(vocab::FOAF_NAME.compact.into(), row.name.as_str().into());
    put_text(&mut obj, vocab::FOAF_NICK, &row.nickname);
    put_text(&mut obj, vocab::FOAF_GIVEN_NAME, &row.given_name);
    put_text(&mut obj, vocab::FOAF_FAMILY_NAME, &row.family_name);
    put_multi(&mut obj, vocab::VCARD_HAS_EMAIL, &row.email);
    put_multi(&mut obj, vocab::VCARD_HAS_TELEPHONE, &row.phone);
    put_text(&mut obj, vocab::FOAF_IMG, &row.image);
    put_text(&mut obj, vocab::VCARD_NOTE, &row.bio);
    put_text(&mut obj, vocab::FOAF_HOMEPAGE, &row.homepage);
    put_text(&mut obj, vocab::SOLID_OIDC_ISSUER, &row.oidc_issuer);
    put_text(&mut obj, vocab::LDP_INBOX, &row.inbox);
    put_text(&mut obj, vocab::PIM_STORAGE, &row.storage);
    put_text(&mut obj, vocab::SOLID_PUBLIC_TYPE_INDEX, &row.public_type_index);
    put_text(&mut obj, vocab::SOLID_PRIVATE_TYPE_INDEX, &row.private_type_index);
    put_text(&mut obj, vocab::PIM_PREFERENCES_FILE, &row.preferences_file);
    put_ref(&mut obj, vocab::FOAF_IS_PRIMARY_TOPIC_OF, &row.profile_doc);
    put_text(&mut obj, vocab::DC_MODIFIED, &row.updated_at);
    Value::Object(obj)
}

/// Read a persona back. Imported personas are never the default.
pub fn json_ld_to_persona_row(json_ld: &Value) -> Result<(String, PersonaRow)> {
    let obj = as_object(json_ld, "persona")?;
    let text = |term| as_string(get(obj, term));
    let row = PersonaRow {
        name: text(vocab::FOAF_NAME),
        nickname: text(vocab::FOAF_NICK),
        given_name: text(vocab::FOAF_GIVEN_NAME),
        family_name: text(vocab::FOAF_FAMILY_NAME),
        email: take_multi(obj, vocab::VCARD_HAS_EMAIL),
        phone: take_multi(obj, vocab::VCARD_HAS_TELEPHONE),
        image: text(vocab::FOAF_IMG),
        bio: text(vocab::VCARD_NOTE),
        homepage: text(vocab::FOAF_HOMEPAGE),
        oidc_issuer: text(vocab::SOLID_OIDC_ISSUER),
        inbox: text(vocab::LDP_INBOX),
        storage: text(vocab::PIM_STORAGE),
        public_type_index: text(vocab::SOLID_PUBLIC_TYPE_INDEX),
        private_type_index: text(vocab::SOLID_PRIVATE_TYPE_INDEX),
        preferences_file: text(vocab::PIM_PREFERENCES_FILE),
        profile_doc: as_node_id(get(obj, vocab::FOAF_IS_PRIMARY_TOPIC_OF)),
        is_default: false,
        updated_at: text(vocab::DC_MODIFIED),
    };
    Ok((as_string(obj.get(ID)), row))
}
