//! CLI module - Command-line interface for PlayParty
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::state::App;

/// PlayParty - rooms for playing together
#[derive(Parser)]
#[command(name = "playparty")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (default: search the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file
    Init,

    /// Show whether you are signed in or can restore an account
    #[command(alias = "st")]
    Status,

    /// Show the signed-in user
    Whoami,

    /// Create an account from just a display name
    #[command(alias = "start")]
    Onboard {
        /// Display name
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Sign back in with the credentials stored for this device
    Restore,

    /// Sign in with username and password
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Register with a username of your choosing
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        name: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Change your display name
    Rename {
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Sign out (stored credentials are kept)
    Logout,

    /// Manage rooms
    Rooms {
        #[command(subcommand)]
        command: RoomsCommands,
    },
}

#[derive(Subcommand)]
pub enum RoomsCommands {
    /// List rooms
    #[command(alias = "ls")]
    List,

    /// Create a room
    Create {
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Show room details
    Show { id: String },

    /// Rename a room
    Rename {
        id: String,
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Join a room (or request to)
    Join { id: String },

    /// Leave a room
    Leave { id: String },

    /// Delete a room
    #[command(alias = "rm")]
    Delete { id: String },

    /// Accept a join request
    Accept { id: String, user_id: i64 },

    /// Reject a join request
    Reject { id: String, user_id: i64 },
}

pub use commands::cmd_init;

/// Runs one command against a reconciled [`App`].
pub async fn dispatch(app: &mut App, command: Option<Commands>) -> anyhow::Result<()> {
    use commands::*;

    match command {
        None | Some(Commands::Status) => {
            cmd_status(app);
            Ok(())
        }
        Some(Commands::Whoami) => {
            cmd_whoami(app);
            Ok(())
        }
        Some(Commands::Onboard { name }) => cmd_onboard(app, &name.join(" ")).await,
        Some(Commands::Restore) => cmd_restore(app).await,
        Some(Commands::Login { username, password }) => cmd_login(app, username, password).await,
        Some(Commands::Register {
            username,
            name,
            password,
        }) => cmd_register(app, &username, &name, password).await,
        Some(Commands::Rename { name }) => cmd_rename(app, &name.join(" ")).await,
        Some(Commands::Logout) => cmd_logout(app).await,
        Some(Commands::Rooms { command }) => match command {
            RoomsCommands::List => cmd_rooms_list(app).await,
            RoomsCommands::Create { name } => cmd_rooms_create(app, &name.join(" ")).await,
            RoomsCommands::Show { id } => cmd_rooms_show(app, &id).await,
            RoomsCommands::Rename { id, name } => {
                cmd_rooms_rename(app, &id, &name.join(" ")).await
            }
            RoomsCommands::Join { id } => cmd_rooms_join(app, &id).await,
            RoomsCommands::Leave { id } => cmd_rooms_leave(app, &id).await,
            RoomsCommands::Delete { id } => cmd_rooms_delete(app, &id).await,
            RoomsCommands::Accept { id, user_id } => cmd_rooms_handle(app, &id, user_id, true).await,
            RoomsCommands::Reject { id, user_id } => {
                cmd_rooms_handle(app, &id, user_id, false).await
            }
        },
        // Handled before the app is built.
        Some(Commands::Init) => Ok(()),
    }
}
