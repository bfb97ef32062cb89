// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::NavContext;
use anyhow::{Context, Result};
use diagnostics::log_info;
use navstate::{DEFAULT_BUNDLE_FILE, import_social_bundle, read_social_bundle, write_social_bundle};

/// Write personas, contacts and groups as a JSON-LD bundle.
pub async fn social_export_command<F>(ctx: &NavContext, output: Option<&str>, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let store = ctx.open_store().await?;
    let path = ctx.file(output.unwrap_or(DEFAULT_BUNDLE_FILE))?;
    let driver = ctx.driver();
    let bundle = write_social_bundle(driver.as_ref(), &path, &store)
        .await
        .with_context(|| format!("cannot export to {path}"))?;

    let target = path.to_string();
    log_info!("exported social bundle to {target}", target: target);
    handler(&format!(
        "exported {} personas, {} contacts, {} groups to {path}",
        bundle.personas.len(),
        bundle.contacts.len(),
        bundle.groups.len()
    ));
    Ok(())
}

/// Merge a bundle into the saved store. Existing rows with the same ids are
/// replaced.
pub async fn social_import_command<F>(ctx: &NavContext, file: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let path = ctx.file(file)?;
    let driver = ctx.driver();
    let bundle = read_social_bundle(driver.as_ref(), &path)
        .await
        .with_context(|| format!("cannot read bundle {path}"))?;

    let mut store = ctx.open_store().await?;
    let counts = import_social_bundle(&mut store, &bundle)?;
    ctx.save_store(&store).await?;
    handler(&format!("imported {counts}"));
    Ok(())
}
