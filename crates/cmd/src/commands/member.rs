// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::record_activity;
use crate::common::NavContext;
use anyhow::Result;
use clap::Subcommand;
use navstate::accessors::contacts::get_contact;
use navstate::accessors::memberships::{
    MembershipRow, add_member, list_members, list_memberships, remove_member,
};

#[derive(Debug, Clone, Subcommand)]
pub enum MemberCommand {
    /// Add a contact to a group, or update the existing membership
    Add {
        group: String,
        contact: String,
        #[arg(long)]
        role: Option<String>,
        /// Start of the membership, e.g. 2025-01-01
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Remove a contact from a group
    Remove { group: String, contact: String },
    /// List the members of one group, or every membership
    List { group: Option<String> },
}

pub async fn member_command<F>(ctx: &NavContext, command: &MemberCommand, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let mut store = ctx.open_store().await?;
    match command {
        MemberCommand::List { group } => {
            let memberships = match group {
                Some(group) => list_members(&store, group),
                None => list_memberships(&store),
            };
            for (_, m) in memberships {
                let name = get_contact(&store, &m.contact_id)
                    .map(|c| c.name)
                    .unwrap_or_default();
                let mut line = format!("{} {} {name}", m.group_id, m.contact_id);
                if !m.role.is_empty() {
                    line.push_str(&format!(" as {}", m.role));
                }
                if !m.start_date.is_empty() || !m.end_date.is_empty() {
                    line.push_str(&format!(" ({}..{})", m.start_date, m.end_date));
                }
                handler(&line);
            }
            return Ok(());
        }
        MemberCommand::Add {
            group,
            contact,
            role,
            start,
            end,
        } => {
            let membership = MembershipRow {
                role: role.clone().unwrap_or_default(),
                start_date: start.clone().unwrap_or_default(),
                end_date: end.clone().unwrap_or_default(),
                ..MembershipRow::new(group.as_str(), contact.as_str())
            };
            let id = add_member(&mut store, &membership)?;
            record_activity(&mut store, "group", group, "member-added");
            handler(&id);
        }
        MemberCommand::Remove { group, contact } => {
            remove_member(&mut store, group, contact);
            record_activity(&mut store, "group", group, "member-removed");
        }
    }
    ctx.save_store(&store).await
}
