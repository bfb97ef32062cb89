// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Linked-data vocabulary terms used by the mappers.
//!
//! Output uses compact `prefix:term` keys under [`pod_context`]. Input
//! accepts either the compact key or the full IRI.

use serde_json::{Value, json};

macro_rules! namespace_iri {
    (foaf) => { "http://xmlns.com/foaf/0.1/" };
    (vcard) => { "http://www.w3.org/2006/vcard/ns#" };
    (solid) => { "http://www.w3.org/ns/solid/terms#" };
    (org) => { "http://www.w3.org/ns/org#" };
    (ldp) => { "http://www.w3.org/ns/ldp#" };
    (acl) => { "http://www.w3.org/ns/auth/acl#" };
    (dc) => { "http://purl.org/dc/terms/" };
    (pim) => { "http://www.w3.org/ns/pim/space#" };
    (posix) => { "http://www.w3.org/ns/posix/stat#" };
    (xsd) => { "http://www.w3.org/2001/XMLSchema#" };
    (schema) => { "https://schema.org/" };
    (cert) => { "http://www.w3.org/ns/auth/cert#" };
    (time) => { "http://www.w3.org/2006/time#" };
}

pub mod ns {
    pub const FOAF: &str = namespace_iri!(foaf);
    pub const VCARD: &str = namespace_iri!(vcard);
    pub const SOLID: &str = namespace_iri!(solid);
    pub const ORG: &str = namespace_iri!(org);
    pub const LDP: &str = namespace_iri!(ldp);
    pub const ACL: &str = namespace_iri!(acl);
    pub const DC: &str = namespace_iri!(dc);
    pub const PIM: &str = namespace_iri!(pim);
    pub const POSIX: &str = namespace_iri!(posix);
    pub const XSD: &str = namespace_iri!(xsd);
    pub const SCHEMA: &str = namespace_iri!(schema);
    pub const CERT: &str = namespace_iri!(cert);
    pub const TIME: &str = namespace_iri!(time);
}

/// A term in both spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub compact: &'static str,
    pub iri: &'static str,
}

macro_rules! terms {
    ($($name:ident = $prefix:ident : $local:literal;)*) => {
        $(
            pub const $name: Term = Term {
                compact: concat!(stringify!($prefix), ":", $local),
                iri: concat!(namespace_iri!($prefix), $local),
            };
        )*
    };
}

terms! {
    FOAF_PERSON = foaf:"Person";
    FOAF_NAME = foaf:"name";
    FOAF_NICK = foaf:"nick";
    FOAF_GIVEN_NAME = foaf:"givenName";
    FOAF_FAMILY_NAME = foaf:"familyName";
    FOAF_IMG = foaf:"img";
    FOAF_HOMEPAGE = foaf:"homepage";
    FOAF_IS_PRIMARY_TOPIC_OF = foaf:"isPrimaryTopicOf";

    VCARD_INDIVIDUAL = vcard:"Individual";
    VCARD_GROUP = vcard:"Group";
    VCARD_ORGANIZATION = vcard:"Organization";
    VCARD_FN = vcard:"fn";
    VCARD_HAS_UID = vcard:"hasUID";
    VCARD_NICKNAME = vcard:"nickname";
    VCARD_HAS_EMAIL = vcard:"hasEmail";
    VCARD_HAS_TELEPHONE = vcard:"hasTelephone";
    VCARD_HAS_URL = vcard:"hasURL";
    VCARD_HAS_PHOTO = vcard:"hasPhoto";
    VCARD_HAS_LOGO = vcard:"hasLogo";
    VCARD_HAS_NOTE = vcard:"hasNote";
    VCARD_NOTE = vcard:"note";
    VCARD_HAS_ORGANIZATION_NAME = vcard:"hasOrganizationName";
    VCARD_HAS_ROLE = vcard:"hasRole";
    VCARD_HAS_RELATED = vcard:"hasRelated";
    VCARD_HAS_MEMBER = vcard:"hasMember";

    SOLID_WEBID = solid:"webid";
    SOLID_OIDC_ISSUER = solid:"oidcIssuer";
    SOLID_PUBLIC_TYPE_INDEX = solid:"publicTypeIndex";
    SOLID_PRIVATE_TYPE_INDEX = solid:"privateTypeIndex";

    LDP_INBOX = ldp:"inbox";
    PIM_STORAGE = pim:"storage";
    PIM_PREFERENCES_FILE = pim:"preferencesFile";

    DC_MODIFIED = dc:"modified";
    DC_DESCRIPTION = dc:"description";

    SCHEMA_APPLICATION_CATEGORY = schema:"applicationCategory";

    ORG_ORGANIZATION = org:"Organization";
    ORG_ORGANIZATIONAL_UNIT = org:"OrganizationalUnit";
    ORG_MEMBERSHIP = org:"Membership";
    ORG_MEMBER = org:"member";
    ORG_HAS_MEMBERSHIP = org:"hasMembership";
    ORG_UNIT_OF = org:"unitOf";
    ORG_ROLE = org:"role";
    ORG_MEMBER_DURING = org:"memberDuring";

    TIME_INTERVAL = time:"Interval";
    TIME_HAS_BEGINNING = time:"hasBeginning";
    TIME_HAS_END = time:"hasEnd";
}

impl Term {
    /// Whether `s` names this term in either spelling.
    #[must_use]
    pub fn matches(&self, s: &str) -> bool {
        s == self.compact || s == self.iri
    }
}

/// The `@context` attached to every exported object.
#[must_use]
pub fn pod_context() -> Value {
    json!({
        "@vocab": ns::VCARD,
        "foaf": ns::FOAF,
        "solid": ns::SOLID,
        "vcard": ns::VCARD,
        "org": ns::ORG,
        "ldp": ns::LDP,
        "acl": ns::ACL,
        "dc": ns::DC,
        "pim": ns::PIM,
        "posix": ns::POSIX,
        "xsd": ns::XSD,
        "schema": ns::SCHEMA,
        "cert": ns::CERT,
        "time": ns::TIME,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iris_use_namespaces() {
        for (term, namespace) in [
            (FOAF_NAME, ns::FOAF),
            (VCARD_FN, ns::VCARD),
            (SOLID_WEBID, ns::SOLID),
            (ORG_ROLE, ns::ORG),
            (LDP_INBOX, ns::LDP),
            (DC_MODIFIED, ns::DC),
            (PIM_STORAGE, ns::PIM),
            (SCHEMA_APPLICATION_CATEGORY, ns::SCHEMA),
            (TIME_HAS_END, ns::TIME),
        ] {
            assert!(term.iri.starts_with(namespace), "{}", term.iri);
            let local = term.compact.split(':').nth(1).unwrap();
            assert_eq!(term.iri, format!("{namespace}{local}"));
        }
    }

    #[test]
    fn test_matches_both_spellings() {
        assert!(ORG_ORGANIZATION.matches("org:Organization"));
        assert!(ORG_ORGANIZATION.matches("http://www.w3.org/ns/org#Organization"));
        assert!(!ORG_ORGANIZATION.matches("Organization"));
    }
}
