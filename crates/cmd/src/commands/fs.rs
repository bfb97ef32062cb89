// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File commands that go straight through the platform driver.

use crate::common::{NavContext, format_entry, format_file_size};
use anyhow::Result;
use diagnostics::{log_debug, log_info};

pub async fn ls_command<F>(ctx: &NavContext, path: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let dir = ctx.dir(path)?;
    let mut entries = ctx.driver().readdir(&dir).await?;
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });
    for entry in &entries {
        handler(&format_entry(entry));
    }
    Ok(())
}

pub async fn cat_command<F>(ctx: &NavContext, path: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let file = ctx.file(path)?;
    let data = ctx.driver().read_file(&file).await?;
    handler(&String::from_utf8_lossy(&data));
    Ok(())
}

/// Replace a file's content, creating parent directories as needed.
pub async fn write_command(ctx: &NavContext, path: &str, content: &str) -> Result<()> {
    let file = ctx.file(path)?;
    let driver = ctx.driver();
    if let Some(parent) = file.parent() {
        driver.mkdir(&parent).await?;
    }
    driver.write_file(&file, content.as_bytes()).await?;
    let path = file.as_str();
    let size = content.len();
    log_info!("wrote {size} bytes to {path}", size: size, path: path);
    Ok(())
}

pub async fn mkdir_command(ctx: &NavContext, path: &str) -> Result<()> {
    let dir = ctx.dir(path)?;
    log_debug!("creating directory {path}", path: dir.as_str());
    ctx.driver().mkdir(&dir).await?;
    Ok(())
}

pub async fn rm_command(ctx: &NavContext, path: &str) -> Result<()> {
    let file = ctx.file(path)?;
    log_debug!("removing {path}", path: file.as_str());
    ctx.driver().rm(&file).await?;
    Ok(())
}

pub async fn stat_command<F>(ctx: &NavContext, path: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let file = ctx.file(path)?;
    let entry = ctx.driver().stat(&file).await?;
    handler(&format!("path: {}", entry.path));
    handler(&format!(
        "type: {}",
        if entry.is_directory { "directory" } else { "file" }
    ));
    if let Some(size) = entry.size {
        handler(&format!("size: {} ({size} bytes)", format_file_size(size)));
    }
    if let Some(mtime) = entry.mtime {
        handler(&format!("modified: {}", mtime.to_rfc3339()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::native_context;

    #[tokio::test]
    async fn test_write_cat_ls_rm() {
        let (tmp, ctx) = native_context();
        write_command(&ctx, "docs/readme.md", "hello").await.unwrap();
        mkdir_command(&ctx, "docs/drafts").await.unwrap();
        assert!(tmp.path().join("docs/readme.md").is_file());

        let mut out = Vec::new();
        cat_command(&ctx, "docs/readme.md", |s| out.push(s.to_string()))
            .await
            .unwrap();
        assert_eq!(out, vec!["hello"]);

        let mut listing = Vec::new();
        ls_command(&ctx, "docs", |s| listing.push(s.to_string()))
            .await
            .unwrap();
        assert_eq!(listing.len(), 2);
        assert!(listing[0].starts_with("d ") && listing[0].ends_with("drafts/"));
        assert!(listing[1].ends_with("readme.md"));
        assert!(listing[1].contains("5B"));

        rm_command(&ctx, "docs").await.unwrap();
        rm_command(&ctx, "docs").await.unwrap();
        assert!(!tmp.path().join("docs").exists());
    }

    #[tokio::test]
    async fn test_stat_and_missing() {
        let (_tmp, ctx) = native_context();
        write_command(&ctx, "a.txt", "abc").await.unwrap();

        let mut out = Vec::new();
        stat_command(&ctx, "a.txt", |s| out.push(s.to_string()))
            .await
            .unwrap();
        assert!(out.contains(&"type: file".to_string()));
        assert!(out.iter().any(|l| l.starts_with("size: 3B")));

        assert!(cat_command(&ctx, "missing.txt", |_| {}).await.is_err());
        assert!(ls_command(&ctx, "missing", |_| {}).await.is_err());
    }
}
