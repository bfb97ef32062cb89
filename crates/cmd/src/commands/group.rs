// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::record_activity;
use crate::common::NavContext;
use anyhow::{Result, anyhow, bail};
use clap::Subcommand;
use navstate::accessors::groups::{
    GroupRow, GroupType, delete_group, get_group, list_groups, set_group,
};
use navstate::accessors::memberships::list_members;
use navstate::ids::new_group_id;

#[derive(Debug, Clone, Subcommand)]
pub enum GroupCommand {
    /// List groups with their member counts
    List,
    /// Create a group
    Add {
        name: String,
        /// organization, team or group
        #[arg(long = "type", default_value = "group")]
        group_type: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Id of the enclosing group
        #[arg(long)]
        parent: Option<String>,
    },
    /// Delete a group and its memberships
    Delete { id: String },
}

pub async fn group_command<F>(ctx: &NavContext, command: &GroupCommand, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let mut store = ctx.open_store().await?;
    match command {
        GroupCommand::List => {
            for (id, row) in list_groups(&store) {
                let members = list_members(&store, &id).len();
                handler(&format!("{id}  {} [{}] {members} members", row.name, row.group_type));
            }
            return Ok(());
        }
        GroupCommand::Add {
            name,
            group_type,
            description,
            url,
            parent,
        } => {
            let group_type: GroupType = group_type.parse().map_err(|e: String| anyhow!(e))?;
            if let Some(parent) = parent {
                if get_group(&store, parent).is_none() {
                    bail!("no parent group {parent}");
                }
            }
            let id = new_group_id();
            let row = GroupRow {
                group_type,
                description: description.clone().unwrap_or_default(),
                url: url.clone().unwrap_or_default(),
                parent_group: parent.clone().unwrap_or_default(),
                ..GroupRow::new(name.as_str())
            };
            set_group(&mut store, &id, &row)?;
            record_activity(&mut store, "group", &id, "created");
            handler(&id);
        }
        GroupCommand::Delete { id } => {
            if get_group(&store, id).is_none() {
                bail!("no group {id}");
            }
            delete_group(&mut store, id);
            record_activity(&mut store, "group", id, "deleted");
        }
    }
    ctx.save_store(&store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::native_context;

    fn add(name: &str, group_type: &str, parent: Option<String>) -> GroupCommand {
        GroupCommand::Add {
            name: name.to_string(),
            group_type: group_type.to_string(),
            description: None,
            url: None,
            parent,
        }
    }

    #[tokio::test]
    async fn test_add_nested_and_list() {
        let (_tmp, ctx) = native_context();
        let mut ids = Vec::new();
        group_command(&ctx, &add("Acme", "org", None), |s| ids.push(s.to_string()))
            .await
            .unwrap();
        let parent = Some(ids[0].clone());
        group_command(&ctx, &add("Platform", "team", parent), |s| ids.push(s.to_string()))
            .await
            .unwrap();

        let store = ctx.open_store().await.unwrap();
        let team = get_group(&store, &ids[1]).unwrap();
        assert_eq!(team.group_type, GroupType::Team);
        assert_eq!(team.parent_group, ids[0]);

        let mut lines = Vec::new();
        group_command(&ctx, &GroupCommand::List, |s| lines.push(s.to_string()))
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Acme [organization] 0 members"));
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let (_tmp, ctx) = native_context();
        assert!(group_command(&ctx, &add("X", "tribe", None), |_| {}).await.is_err());
        assert!(
            group_command(&ctx, &add("X", "team", Some("group_missing".into())), |_| {})
                .await
                .is_err()
        );
        let delete = GroupCommand::Delete { id: "group_missing".into() };
        assert!(group_command(&ctx, &delete, |_| {}).await.is_err());
    }
}
