//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::records::{Role, WaterNeeds};

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Login name for the new account
    #[arg(long)]
    pub username: String,

    /// Full name
    #[arg(long)]
    pub name: String,

    /// Role of the new account
    #[arg(long, value_enum, default_value = "farmer")]
    pub role: RoleArg,

    /// Location (farmers only)
    #[arg(long)]
    pub location: Option<String>,

    /// Contact number (farmers only)
    #[arg(long)]
    pub contact: Option<String>,

    /// Password confirmation (defaults to --password)
    #[arg(long)]
    pub confirm: Option<String>,
}

/// Output format argument shared by listing commands.
#[derive(Debug, Args)]
pub struct FormatArg {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// User account commands (admin).
#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List every account
    List(FormatArg),

    /// Change an account
    Update {
        /// Account to change
        username: String,

        /// New login name
        #[arg(long)]
        new_username: Option<String>,

        /// New full name
        #[arg(long)]
        name: Option<String>,

        /// New role
        #[arg(long, value_enum)]
        role: Option<RoleArg>,

        /// New password
        #[arg(long)]
        new_password: Option<String>,
    },

    /// Delete an account
    Delete {
        /// Account to delete
        username: String,
    },
}

/// Farmer record commands (admin).
#[derive(Debug, Subcommand)]
pub enum FarmersCommand {
    /// List every farmer record
    List(FormatArg),

    /// Add a farmer record
    Add {
        /// Farmer name
        #[arg(long)]
        name: String,

        /// Village, district or region
        #[arg(long)]
        location: String,

        /// Contact number
        #[arg(long)]
        contact: String,

        /// Linked username (defaults to the lowercased name)
        #[arg(long)]
        username: Option<String>,
    },

    /// Change a farmer record
    Update {
        /// Farmer id
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New location
        #[arg(long)]
        location: Option<String>,

        /// New contact number
        #[arg(long)]
        contact: Option<String>,

        /// New linked username
        #[arg(long)]
        username: Option<String>,
    },

    /// Delete a farmer record
    Delete {
        /// Farmer id
        id: i64,
    },
}

/// Own profile commands (farmer).
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show your farmer record
    Show(FormatArg),

    /// Create or update your farmer record
    Save {
        /// Name on the record
        #[arg(long)]
        name: Option<String>,

        /// Location
        #[arg(long)]
        location: Option<String>,

        /// Contact number
        #[arg(long)]
        contact: Option<String>,
    },

    /// Delete your account, farmer record and crop entries
    DeleteAccount {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Crop catalog commands.
#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List the crop catalog
    List(FormatArg),

    /// Add a catalog crop (admin)
    Add {
        /// Crop name
        #[arg(long)]
        name: String,

        /// Growing season
        #[arg(long)]
        season: String,

        /// Market price per quintal
        #[arg(long)]
        price: Option<f64>,

        /// Recommended fertilizer
        #[arg(long, default_value = "")]
        fertilizer: String,

        /// Water requirement
        #[arg(long, value_enum)]
        water: Option<WaterArg>,
    },

    /// Change a catalog crop (admin)
    Update {
        /// Crop id
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New season
        #[arg(long)]
        season: Option<String>,

        /// New price per quintal
        #[arg(long)]
        price: Option<f64>,

        /// New fertilizer
        #[arg(long)]
        fertilizer: Option<String>,

        /// New water requirement
        #[arg(long, value_enum)]
        water: Option<WaterArg>,
    },

    /// Delete a catalog crop (admin)
    Delete {
        /// Crop id
        id: i64,
    },
}

/// Crop-profit reference commands.
#[derive(Debug, Subcommand)]
pub enum ProfitsCommand {
    /// List reference crops
    List {
        /// Only this season
        #[arg(long)]
        season: Option<String>,

        /// Only crops whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Minimum profit per acre (0 for no bound)
        #[arg(long, default_value_t = 0.0)]
        min: f64,

        /// Maximum profit per acre (0 for no bound)
        #[arg(long, default_value_t = 0.0)]
        max: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List seasons
    Seasons,

    /// Show one crop with its description
    Show {
        /// Crop name
        crop: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a reference crop (admin)
    Add {
        /// Crop name
        #[arg(long)]
        name: String,

        /// Growing season
        #[arg(long)]
        season: String,

        /// Expected profit for one acre
        #[arg(long)]
        profit: f64,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// Set a crop's profit per acre (admin)
    Update {
        /// Crop name
        crop: String,

        /// New profit per acre
        profit: f64,
    },

    /// Delete a reference crop (admin)
    Delete {
        /// Crop name
        crop: String,
    },

    /// Set a crop's description (admin)
    Describe {
        /// Crop name
        crop: String,

        /// Description text
        description: String,
    },
}

/// Crop entry commands (farmer, export is admin).
#[derive(Debug, Subcommand)]
pub enum PlantingsCommand {
    /// Record a crop you planted
    Add {
        /// Crop name from the reference table
        crop: String,

        /// Field size in acres
        acres: f64,
    },

    /// List your crop entries with totals
    List(FormatArg),

    /// Remove one of your entries
    Remove {
        /// Entry id
        id: i64,
    },

    /// Remove all of your entries
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Write every entry to a CSV file (admin)
    Export {
        /// Output file
        path: PathBuf,
    },
}

/// Legacy CSV directory commands.
#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Load a directory of legacy CSV files
    Import {
        /// Directory holding users.csv, farmers.csv, ...
        dir: PathBuf,
    },

    /// Write every table as legacy CSV files
    Export {
        /// Output directory
        dir: PathBuf,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Role argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Administrator
    Admin,
    /// Farmer
    Farmer,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Farmer => Self::Farmer,
        }
    }
}

/// Water requirement argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WaterArg {
    /// Rain-fed or drought tolerant
    Low,
    /// Regular irrigation
    Medium,
    /// Heavily irrigated
    High,
}

impl From<WaterArg> for WaterNeeds {
    fn from(arg: WaterArg) -> Self {
        match arg {
            WaterArg::Low => Self::Low,
            WaterArg::Medium => Self::Medium,
            WaterArg::High => Self::High,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
