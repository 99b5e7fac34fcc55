//! `SQLite` schema definitions for farmrec.
//!
//! Tables are created with `IF NOT EXISTS` on every open. There is no
//! versioning: the schema is the one below.

use rusqlite::Connection;

use crate::error::Result;

/// Registered accounts.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    registered_at TEXT NOT NULL
)
";

/// Farmer contact records.
pub const CREATE_FARMERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS farmers (
    id INTEGER PRIMARY KEY,
    username TEXT,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    contact TEXT NOT NULL
)
";

/// Index for looking up a user's own farmer record.
pub const CREATE_FARMERS_USERNAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_farmers_username ON farmers(username)
";

/// The crop catalog.
pub const CREATE_CROPS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS crops (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    season TEXT NOT NULL,
    price_per_quintal REAL,
    fertilizer TEXT NOT NULL,
    water_needs TEXT
)
";

/// Crop-profit reference data, keyed case-insensitively by crop name.
pub const CREATE_CROP_PROFITS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS crop_profits (
    crop_name TEXT PRIMARY KEY COLLATE NOCASE,
    season TEXT NOT NULL,
    profit_per_acre REAL NOT NULL
)
";

/// Free-text crop descriptions.
pub const CREATE_CROP_DETAILS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS crop_details (
    crop_name TEXT PRIMARY KEY COLLATE NOCASE,
    description TEXT NOT NULL
)
";

/// Crops planted by farmers with their profit estimates.
pub const CREATE_FARMER_CROPS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS farmer_crops (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    crop_name TEXT NOT NULL,
    field_size_acres REAL NOT NULL,
    profit_per_acre REAL NOT NULL,
    estimated_profit REAL NOT NULL,
    recorded_at TEXT NOT NULL
)
";

/// Index for listing one farmer's entries.
pub const CREATE_FARMER_CROPS_USERNAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_farmer_crops_username ON farmer_crops(username)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_FARMERS_TABLE,
    CREATE_FARMERS_USERNAME_INDEX,
    CREATE_CROPS_TABLE,
    CREATE_CROP_PROFITS_TABLE,
    CREATE_CROP_DETAILS_TABLE,
    CREATE_FARMER_CROPS_TABLE,
    CREATE_FARMER_CROPS_USERNAME_INDEX,
];

/// Create every table and index that does not exist yet.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}
