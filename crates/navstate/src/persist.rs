// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Saving and loading a whole store as one JSON file through a driver.

use crate::error::Result;
use crate::store::{Store, StoreSnapshot};
use crate::tables::{SchemaStatus, add_social_tables, create_social_store, register_core_tables};
use diagnostics::log_debug;
use navfs::{FilePath, FilesystemDriver};

/// Write `store` as a pretty JSON snapshot, creating the parent directory.
pub async fn save_store(driver: &dyn FilesystemDriver, path: &FilePath, store: &Store) -> Result<()> {
    let json = serde_json::to_vec_pretty(&store.snapshot())?;
    if let Some(parent) = path.parent() {
        driver.mkdir(&parent).await?;
    }
    driver.write_file(path, &json).await?;
    let path = path.as_str();
    let bytes = json.len();
    log_debug!("saved store to {path} ({bytes} bytes)", path: path, bytes: bytes);
    Ok(())
}

/// Load a store saved by [`save_store`], with every table schema
/// registered. A missing file yields a fresh social store.
pub async fn load_store(driver: &dyn FilesystemDriver, path: &FilePath) -> Result<(Store, SchemaStatus)> {
    let data = match driver.read_file(path).await {
        Ok(data) => data,
        Err(e) if e.is_not_found() => {
            let path = path.as_str();
            log_debug!("no store at {path}; starting fresh", path: path);
            return Ok((create_social_store(), SchemaStatus::Initialized));
        }
        Err(e) => return Err(e.into()),
    };
    let snapshot: StoreSnapshot = serde_json::from_slice(&data)?;
    let mut store = Store::from_snapshot(snapshot);
    register_core_tables(&mut store);
    let status = add_social_tables(&mut store);
    Ok((store, status))
}
