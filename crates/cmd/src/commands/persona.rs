// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::record_activity;
use crate::common::NavContext;
use anyhow::{Result, bail};
use clap::Subcommand;
use navstate::accessors::personas::{
    PersonaRow, delete_persona, get_default_persona, get_persona, list_personas, set_default_persona,
    set_persona,
};
use navstate::ids::new_persona_id;

#[derive(Debug, Clone, Subcommand)]
pub enum PersonaCommand {
    /// List personas; the default is marked with `*`
    List,
    /// Create a persona
    Add {
        name: String,
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        homepage: Option<String>,
        /// Make this the default persona
        #[arg(long)]
        default: bool,
    },
    /// Make a persona the default
    SetDefault { id: String },
    /// Delete a persona
    Delete { id: String },
}

pub async fn persona_command<F>(ctx: &NavContext, command: &PersonaCommand, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let mut store = ctx.open_store().await?;
    match command {
        PersonaCommand::List => {
            let default_id = get_default_persona(&store).map(|(id, _)| id);
            for (id, row) in list_personas(&store) {
                let mark = if default_id.as_deref() == Some(id.as_str()) { "*" } else { " " };
                let nick = if row.nickname.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", row.nickname)
                };
                handler(&format!("{mark} {id}  {}{nick}", row.name));
            }
            return Ok(());
        }
        PersonaCommand::Add {
            name,
            nickname,
            email,
            homepage,
            default,
        } => {
            let id = new_persona_id();
            let row = PersonaRow {
                nickname: nickname.clone().unwrap_or_default(),
                email: email.clone().unwrap_or_default(),
                homepage: homepage.clone().unwrap_or_default(),
                is_default: *default,
                ..PersonaRow::new(name.as_str())
            };
            set_persona(&mut store, &id, &row)?;
            record_activity(&mut store, "persona", &id, "created");
            handler(&id);
        }
        PersonaCommand::SetDefault { id } => {
            set_default_persona(&mut store, id)?;
            record_activity(&mut store, "persona", id, "set-default");
        }
        PersonaCommand::Delete { id } => {
            if get_persona(&store, id).is_none() {
                bail!("no persona {id}");
            }
            delete_persona(&mut store, id)?;
        }
    }
    ctx.save_store(&store).await
}
