// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Driver backends.

mod memory;
mod native;
pub(crate) mod persisted;
mod persister;
mod sandboxed;
mod tree;
mod unavailable;

pub use memory::MemoryDriver;
pub use native::NativeDriver;
pub use persisted::{PersistedDriver, PersistedStorage};
pub use sandboxed::{HostDirSandbox, HostEntry, SandboxHost, SandboxedDriver};
pub use unavailable::UnavailableDriver;
