// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::record_activity;
use crate::common::NavContext;
use anyhow::{Result, bail};
use clap::{Subcommand, ValueEnum};
use navstate::accessors::contacts::{
    ContactKind, ContactRow, delete_contact, get_contact, list_contacts, search_contacts,
    set_contact,
};
use navstate::accessors::memberships::get_groups_for_contact;
use navstate::ids::new_contact_id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[default]
    Person,
    Agent,
    Organization,
}

impl From<KindArg> for ContactKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Person => ContactKind::Person,
            KindArg::Agent => ContactKind::Agent,
            KindArg::Organization => ContactKind::Organization,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum ContactCommand {
    /// List contacts
    List,
    /// Create a contact
    Add {
        name: String,
        #[arg(long, value_enum, default_value_t)]
        kind: KindArg,
        #[arg(long)]
        nickname: Option<String>,
        /// Repeat for several addresses
        #[arg(long)]
        email: Vec<String>,
        /// Repeat for several numbers
        #[arg(long)]
        phone: Vec<String>,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        web_id: Option<String>,
    },
    /// Find contacts by name, email, phone, organization, notes or role
    Search { query: String },
    /// Delete a contact and its group memberships
    Delete { id: String },
}

/// One value as-is, several as a JSON array in one cell.
fn multi_cell(values: &[String]) -> String {
    match values {
        [] => String::new(),
        [one] => one.clone(),
        many => serde_json::Value::from(many.to_vec()).to_string(),
    }
}

fn format_contact(id: &str, row: &ContactRow) -> String {
    let mut line = format!("{id}  {} [{}]", row.name, row.kind);
    if !row.email.is_empty() {
        line.push_str(&format!(" <{}>", row.email));
    }
    if !row.organization.is_empty() {
        line.push_str(&format!(" @ {}", row.organization));
    }
    line
}

pub async fn contact_command<F>(ctx: &NavContext, command: &ContactCommand, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let mut store = ctx.open_store().await?;
    match command {
        ContactCommand::List => {
            for (id, row) in list_contacts(&store) {
                handler(&format_contact(&id, &row));
            }
            return Ok(());
        }
        ContactCommand::Search { query } => {
            for (id, row) in search_contacts(&store, query) {
                handler(&format_contact(&id, &row));
            }
            return Ok(());
        }
        ContactCommand::Add {
            name,
            kind,
            nickname,
            email,
            phone,
            organization,
            role,
            notes,
            web_id,
        } => {
            let id = new_contact_id();
            let row = ContactRow {
                kind: (*kind).into(),
                nickname: nickname.clone().unwrap_or_default(),
                email: multi_cell(email),
                phone: multi_cell(phone),
                organization: organization.clone().unwrap_or_default(),
                role: role.clone().unwrap_or_default(),
                notes: notes.clone().unwrap_or_default(),
                web_id: web_id.clone().unwrap_or_default(),
                ..ContactRow::new(name.as_str())
            };
            set_contact(&mut store, &id, &row)?;
            record_activity(&mut store, "contact", &id, "created");
            handler(&id);
        }
        ContactCommand::Delete { id } => {
            if get_contact(&store, id).is_none() {
                bail!("no contact {id}");
            }
            let groups = get_groups_for_contact(&store, id).len();
            delete_contact(&mut store, id);
            record_activity(&mut store, "contact", id, "deleted");
            handler(&format!("deleted {id} and {groups} memberships"));
        }
    }
    ctx.save_store(&store).await
}
