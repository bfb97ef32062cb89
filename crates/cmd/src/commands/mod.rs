// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod backend;
pub mod bundle;
pub mod contact;
pub mod fs;
pub mod group;
pub mod member;
pub mod persona;
pub mod watch;

pub use backend::backend_command;
pub use bundle::{social_export_command, social_import_command};
pub use contact::{ContactCommand, contact_command};
pub use fs::{cat_command, ls_command, mkdir_command, rm_command, stat_command, write_command};
pub use group::{GroupCommand, group_command};
pub use member::{MemberCommand, member_command};
pub use persona::{PersonaCommand, persona_command};
pub use watch::{WatchLimits, watch_command};

use diagnostics::log_debug;
use navstate::Store;
use navstate::accessors::activities::{ActivityRow, log_activity};
use navstate::accessors::personas::get_default_persona;
use navstate::ids::new_activity_id;

/// Append to the activity log on behalf of the default persona. Without
/// one there is no actor and nothing is recorded.
pub(crate) fn record_activity(store: &mut Store, subject_type: &str, subject_id: &str, kind: &str) {
    let Some((actor, _)) = get_default_persona(store) else {
        return;
    };
    let activity = ActivityRow::new(actor, subject_type, subject_id, kind);
    if let Err(e) = log_activity(store, &new_activity_id(), &activity) {
        let err = e.to_string();
        log_debug!("activity not recorded: {error}", error: err);
    }
}
