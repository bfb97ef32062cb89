// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::NavContext;
use anyhow::Result;
use navfs::get_filesystem_backend_info;

/// Describe the driver and watcher this process would use.
pub fn backend_command<F>(ctx: &NavContext, json: bool, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let info = get_filesystem_backend_info(ctx.fs());
    if json {
        handler(&serde_json::to_string_pretty(&info)?);
        return Ok(());
    }
    let env = ctx.fs().env();
    handler(&format!("backend: {info}"));
    handler(&format!("platform: {}", env.platform));
    handler(&format!("native watch: {}", env.has_fs_watch));
    handler(&format!("state file: {}", ctx.state_path().display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::native_context;

    #[test]
    fn test_text_and_json() {
        let (_tmp, ctx) = native_context();

        let mut lines = Vec::new();
        backend_command(&ctx, false, |s| lines.push(s.to_string())).unwrap();
        assert!(lines[0].starts_with("backend: "));
        assert_eq!(lines[1], "platform: native");

        let mut json = String::new();
        backend_command(&ctx, true, |s| json.push_str(s)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["platform"], "native");
    }
}
