// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Application state for naveditor.
//!
//! A reactive tabular [`Store`] holds the file tree cache, editor buffers
//! and the social graph (personas, contacts, groups, memberships). Typed
//! accessors validate what goes in and what comes out; mappers translate
//! rows to and from JSON-LD for bundle export and import.

pub mod accessors;
pub mod bundle;
pub mod error;
pub mod file_tree;
pub mod ids;
pub mod mappers;
pub mod persist;
pub mod schema;
pub mod store;
pub mod tables;
pub mod vocab;

pub use bundle::{
    BundleCounts, DEFAULT_BUNDLE_FILE, SocialBundle, export_social_bundle, import_social_bundle,
    read_social_bundle, write_social_bundle,
};
pub use error::{Result, StateError};
pub use file_tree::{refresh_directory, watch_directory};
pub use persist::{load_store, save_store};
pub use schema::{CellType, FieldSpec, ValidationIssue, validate_row};
pub use store::{Cell, ListenerId, Row, Store, StoreChange, StoreSnapshot};
pub use tables::{SchemaStatus, add_social_tables, create_social_store, create_store};
