// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::commands::{
    ContactCommand, GroupCommand, MemberCommand, PersonaCommand, WatchLimits, backend_command,
    cat_command, contact_command, group_command, ls_command, member_command, mkdir_command,
    persona_command, rm_command, social_export_command, social_import_command, stat_command,
    watch_command, write_command,
};
use cmd::common::{NavContext, STATE_ENV};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "naveditor")]
struct Cli {
    /// State file holding personas, contacts and groups
    #[arg(long, env = STATE_ENV, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory
    Ls {
        #[arg(default_value = ".")]
        path: String,
    },
    /// Print a file
    Cat { path: String },
    /// Write text to a file, creating parent directories
    Write { path: String, content: String },
    /// Create a directory
    Mkdir { path: String },
    /// Remove a file or directory
    Rm { path: String },
    /// Show file metadata
    Stat { path: String },
    /// Print change events for a file or directory
    Watch {
        path: String,
        /// Stop after this many events
        #[arg(long)]
        count: Option<usize>,
        /// Stop after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Describe the active filesystem backend
    Backend {
        #[arg(long)]
        json: bool,
    },
    /// Manage personas
    #[command(subcommand)]
    Persona(PersonaCommand),
    /// Manage contacts
    #[command(subcommand)]
    Contact(ContactCommand),
    /// Manage groups
    #[command(subcommand)]
    Group(GroupCommand),
    /// Manage group memberships
    #[command(subcommand)]
    Member(MemberCommand),
    /// Export personas, contacts and groups as JSON-LD
    SocialExport { output: Option<String> },
    /// Import a JSON-LD social bundle
    SocialImport { file: String },
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}

#[allow(clippy::print_stdout)]
fn print_raw(text: &str) {
    print!("{text}");
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let ctx = NavContext::from_env(cli.state)?;

    match &cli.command {
        Commands::Ls { path } => ls_command(&ctx, path, print_line).await,
        Commands::Cat { path } => cat_command(&ctx, path, print_raw).await,
        Commands::Write { path, content } => write_command(&ctx, path, content).await,
        Commands::Mkdir { path } => mkdir_command(&ctx, path).await,
        Commands::Rm { path } => rm_command(&ctx, path).await,
        Commands::Stat { path } => stat_command(&ctx, path, print_line).await,
        Commands::Watch {
            path,
            count,
            timeout,
        } => {
            let limits = WatchLimits {
                count: *count,
                timeout: timeout.map(Duration::from_secs),
            };
            watch_command(&ctx, path, limits, print_line).await
        }
        Commands::Backend { json } => backend_command(&ctx, *json, print_line),
        Commands::Persona(command) => persona_command(&ctx, command, print_line).await,
        Commands::Contact(command) => contact_command(&ctx, command, print_line).await,
        Commands::Group(command) => group_command(&ctx, command, print_line).await,
        Commands::Member(command) => member_command(&ctx, command, print_line).await,
        Commands::SocialExport { output } => {
            social_export_command(&ctx, output.as_deref(), print_line).await
        }
        Commands::SocialImport { file } => social_import_command(&ctx, file, print_line).await,
    }
}
