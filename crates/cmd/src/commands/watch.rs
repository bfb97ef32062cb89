// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::NavContext;
use anyhow::Result;
use diagnostics::log_info;
use navfs::WatchEvent;
use std::time::Duration;
use tokio::sync::mpsc;

/// When `watch` stops reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchLimits {
    /// Stop after this many events.
    pub count: Option<usize>,
    /// Stop after this long.
    pub timeout: Option<Duration>,
}

fn format_event(event: &WatchEvent) -> String {
    let time = event.timestamp.format("%H:%M:%S%.3f");
    match &event.old_path {
        Some(old) => format!("{time} {} {old} -> {}", event.kind, event.path),
        None => format!("{time} {} {}", event.kind, event.path),
    }
}

/// Report changes to a file or directory until interrupted or a limit is
/// reached.
pub async fn watch_command<F>(
    ctx: &NavContext,
    path: &str,
    limits: WatchLimits,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let file = ctx.file(path)?;
    let is_directory = ctx.driver().stat(&file).await?.is_directory;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let callback = Box::new(move |event: &WatchEvent| {
        let _ = tx.send(format_event(event));
    });
    let watcher = ctx.watcher();
    let subscription = if is_directory {
        watcher.watch(&file.as_directory_path(), callback)?
    } else {
        watcher.watch_file(&file, callback)?
    };
    log_info!("watching {path}", path: file.as_str());

    let deadline = limits.timeout.map(|t| tokio::time::Instant::now() + t);
    let mut seen = 0usize;
    loop {
        if limits.count.is_some_and(|max| seen >= max) {
            break;
        }
        let sleep = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => {
                    seen += 1;
                    handler(&line);
                }
                None => break,
            },
            () = sleep => break,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.unsubscribe();
    Ok(())
}
