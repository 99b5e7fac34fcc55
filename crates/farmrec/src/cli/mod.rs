//! Command-line interface for farmrec.
//!
//! This module provides the CLI structure and command handlers for the
//! `farmrec` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CatalogCommand, ConfigCommand, DataCommand, FarmersCommand, FormatArg, OutputFormat,
    PlantingsCommand, ProfileCommand, ProfitsCommand, RegisterCommand, RoleArg, UsersCommand,
    WaterArg,
};

/// farmrec - Farm records manager
///
/// Keeps users, farmer records, a crop catalog and crop-profit reference
/// data, and estimates the profit of the crops farmers plant.
#[derive(Debug, Parser)]
#[command(name = "farmrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Database file (overrides the configured path)
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Username to log in with
    #[arg(short, long, global = true, env = "FARMREC_USER")]
    pub user: Option<String>,

    /// Password to log in (or register) with
    #[arg(
        short,
        long,
        global = true,
        env = "FARMREC_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new account
    Register(RegisterCommand),

    /// Show who you are logged in as
    Whoami,

    /// Show the dashboard for your role
    Dashboard(FormatArg),

    /// Manage user accounts (admin)
    #[command(subcommand)]
    Users(UsersCommand),

    /// Manage farmer records (admin)
    #[command(subcommand)]
    Farmers(FarmersCommand),

    /// Manage your own farmer record (farmer)
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Browse or manage the crop catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Browse or manage crop-profit reference data
    #[command(subcommand)]
    Profits(ProfitsCommand),

    /// Record and review the crops you planted
    #[command(subcommand)]
    Plantings(PlantingsCommand),

    /// Estimated profit per user (admin)
    Report(FormatArg),

    /// Import or export legacy CSV data
    #[command(subcommand)]
    Data(DataCommand),

    /// Run the interactive menus
    Menu,

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
