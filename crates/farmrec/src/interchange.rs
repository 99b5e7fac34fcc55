//! Legacy CSV interchange.
//!
//! Older installations kept every dataset in a directory of CSV files. This
//! module reads and writes that layout so such a directory can be loaded
//! into the database and the database can be written back out.
//!
//! | File                   | Table          |
//! |------------------------|----------------|
//! | `users.csv`            | `users`        |
//! | `farmers.csv`          | `farmers`      |
//! | `crops.csv`            | `crops`        |
//! | `crop_profit_data.csv` | `crop_profits` |
//! | `crop_details.csv`     | `crop_details` |
//! | `farmer_crops.csv`     | `farmer_crops` |

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::records::{Crop, CropProfit, Farmer, FarmerCrop, Role, User};
use crate::storage::Storage;

/// Legacy file holding user accounts.
pub const USERS_FILE: &str = "users.csv";
/// Legacy file holding farmer records.
pub const FARMERS_FILE: &str = "farmers.csv";
/// Legacy file holding the crop catalog.
pub const CROPS_FILE: &str = "crops.csv";
/// Legacy file holding the crop-profit reference table.
pub const CROP_PROFITS_FILE: &str = "crop_profit_data.csv";
/// Legacy file holding crop descriptions.
pub const CROP_DETAILS_FILE: &str = "crop_details.csv";
/// Legacy file holding farmers' crop entries.
pub const FARMER_CROPS_FILE: &str = "farmer_crops.csv";

/// Rows moved for one file during an import or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransfer {
    /// File name inside the data directory.
    pub file: &'static str,
    /// Number of rows read or written.
    pub rows: usize,
}

/// A legacy CSV row with a fixed header line.
trait LegacyRow: Serialize {
    /// Column names, in field order.
    const HEADERS: &'static [&'static str];
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    user_id: i64,
    username: String,
    role: String,
    name: String,
    password_hash: String,
    salt: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FarmerRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    farmer_id: Option<i64>,
    #[serde(default)]
    username: Option<String>,
    name: String,
    location: String,
    contact: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CropRow {
    crop_id: i64,
    crop_name: String,
    season: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    price_per_quintal: Option<f64>,
    #[serde(default)]
    fertilizer: String,
    #[serde(default)]
    water_needs: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CropProfitRow {
    #[serde(rename = "Crop Name")]
    crop_name: String,
    #[serde(rename = "Profit Per Acre")]
    profit_per_acre: f64,
    #[serde(rename = "Season")]
    season: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CropDetailRow {
    #[serde(rename = "Crop Name")]
    crop_name: String,
    #[serde(rename = "Description")]
    description: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FarmerCropRow {
    username: String,
    #[serde(rename = "Crop Name")]
    crop_name: String,
    #[serde(rename = "Field Size (acres)")]
    field_size_acres: f64,
    #[serde(rename = "Profit Per Acre")]
    profit_per_acre: f64,
    #[serde(rename = "Estimated Profit")]
    estimated_profit: f64,
}

impl LegacyRow for UserRow {
    const HEADERS: &'static [&'static str] =
        &["user_id", "username", "role", "name", "password_hash", "salt"];
}

impl LegacyRow for FarmerRow {
    const HEADERS: &'static [&'static str] =
        &["farmer_id", "username", "name", "location", "contact"];
}

impl LegacyRow for CropRow {
    const HEADERS: &'static [&'static str] = &[
        "crop_id",
        "crop_name",
        "season",
        "price_per_quintal",
        "fertilizer",
        "water_needs",
    ];
}

impl LegacyRow for CropProfitRow {
    const HEADERS: &'static [&'static str] = &["Crop Name", "Profit Per Acre", "Season"];
}

impl LegacyRow for CropDetailRow {
    const HEADERS: &'static [&'static str] = &["Crop Name", "Description"];
}

impl LegacyRow for FarmerCropRow {
    const HEADERS: &'static [&'static str] = &[
        "username",
        "Crop Name",
        "Field Size (acres)",
        "Profit Per Acre",
        "Estimated Profit",
    ];
}

/// Load every legacy file present in `dir`, replacing the matching tables.
///
/// Missing files leave their table untouched. Rows that cannot be parsed are
/// logged and skipped.
///
/// # Errors
///
/// Returns an error if `dir` is not a directory, a file cannot be read, or
/// the database operation fails.
pub fn import_dir(storage: &Storage, dir: &Path) -> Result<Vec<FileTransfer>> {
    if !dir.is_dir() {
        return Err(Error::not_found("data directory", dir.display()));
    }

    let mut transfers = Vec::new();

    if let Some(rows) = read_rows::<UserRow>(&dir.join(USERS_FILE))? {
        let users: Vec<User> = rows.into_iter().map(user_from_row).collect();
        transfers.push(FileTransfer {
            file: USERS_FILE,
            rows: storage.replace_users(&users)?,
        });
    }

    if let Some(rows) = read_rows::<FarmerRow>(&dir.join(FARMERS_FILE))? {
        let farmers = number_farmers(rows);
        transfers.push(FileTransfer {
            file: FARMERS_FILE,
            rows: storage.replace_farmers(&farmers)?,
        });
    }

    if let Some(rows) = read_rows::<CropRow>(&dir.join(CROPS_FILE))? {
        let crops: Vec<Crop> = rows.into_iter().map(crop_from_row).collect();
        transfers.push(FileTransfer {
            file: CROPS_FILE,
            rows: storage.replace_crops(&crops)?,
        });
    }

    if let Some(rows) = read_rows::<CropProfitRow>(&dir.join(CROP_PROFITS_FILE))? {
        let profits: Vec<CropProfit> = rows
            .into_iter()
            .map(|row| CropProfit {
                crop_name: row.crop_name.trim().to_string(),
                season: row.season.trim().to_string(),
                profit_per_acre: row.profit_per_acre,
                description: None,
            })
            .collect();
        transfers.push(FileTransfer {
            file: CROP_PROFITS_FILE,
            rows: storage.replace_crop_profits(&profits)?,
        });
    }

    if let Some(rows) = read_rows::<CropDetailRow>(&dir.join(CROP_DETAILS_FILE))? {
        let details: Vec<(String, String)> = rows
            .into_iter()
            .map(|row| (row.crop_name.trim().to_string(), row.description))
            .collect();
        transfers.push(FileTransfer {
            file: CROP_DETAILS_FILE,
            rows: storage.replace_crop_details(&details)?,
        });
    }

    if let Some(rows) = read_rows::<FarmerCropRow>(&dir.join(FARMER_CROPS_FILE))? {
        let recorded_at = Utc::now();
        let entries: Vec<FarmerCrop> = (1..)
            .zip(rows)
            .map(|(id, row)| FarmerCrop {
                id,
                username: row.username,
                crop_name: row.crop_name,
                field_size_acres: row.field_size_acres,
                profit_per_acre: row.profit_per_acre,
                estimated_profit: row.estimated_profit,
                recorded_at,
            })
            .collect();
        transfers.push(FileTransfer {
            file: FARMER_CROPS_FILE,
            rows: storage.replace_plantings(&entries)?,
        });
    }

    info!(dir = %dir.display(), files = transfers.len(), "Imported legacy data");
    Ok(transfers)
}

/// Write every table to `dir` using the legacy file names and headers.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, a file cannot be
/// written, or the database operation fails.
pub fn export_dir(storage: &Storage, dir: &Path) -> Result<Vec<FileTransfer>> {
    fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;

    let users = storage.list_users()?.into_iter().map(|user| UserRow {
        user_id: user.id,
        username: user.username,
        role: user.role.to_string(),
        name: user.name,
        password_hash: user.password_hash,
        salt: user.salt,
    });
    let farmers = storage.list_farmers()?.into_iter().map(|farmer| FarmerRow {
        farmer_id: Some(farmer.id),
        username: farmer.username,
        name: farmer.name,
        location: farmer.location,
        contact: farmer.contact,
    });
    let crops = storage.list_crops()?.into_iter().map(|crop| CropRow {
        crop_id: crop.id,
        crop_name: crop.name,
        season: crop.season,
        price_per_quintal: crop.price_per_quintal,
        fertilizer: crop.fertilizer,
        water_needs: crop.water_needs.map(|w| w.to_string()),
    });
    let profits = storage
        .list_crop_profits()?
        .into_iter()
        .map(|profit| CropProfitRow {
            crop_name: profit.crop_name,
            profit_per_acre: profit.profit_per_acre,
            season: profit.season,
        });
    let details = storage
        .list_crop_details()?
        .into_iter()
        .map(|(crop_name, description)| CropDetailRow {
            crop_name,
            description,
        });

    let transfers = vec![
        FileTransfer {
            file: USERS_FILE,
            rows: write_rows(&dir.join(USERS_FILE), users)?,
        },
        FileTransfer {
            file: FARMERS_FILE,
            rows: write_rows(&dir.join(FARMERS_FILE), farmers)?,
        },
        FileTransfer {
            file: CROPS_FILE,
            rows: write_rows(&dir.join(CROPS_FILE), crops)?,
        },
        FileTransfer {
            file: CROP_PROFITS_FILE,
            rows: write_rows(&dir.join(CROP_PROFITS_FILE), profits)?,
        },
        FileTransfer {
            file: CROP_DETAILS_FILE,
            rows: write_rows(&dir.join(CROP_DETAILS_FILE), details)?,
        },
        FileTransfer {
            file: FARMER_CROPS_FILE,
            rows: write_plantings(&dir.join(FARMER_CROPS_FILE), &storage.list_plantings()?)?,
        },
    ];

    info!(dir = %dir.display(), "Exported legacy data");
    Ok(transfers)
}

/// Write crop entries to a single CSV file with the legacy headers.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_plantings(path: &Path, entries: &[FarmerCrop]) -> Result<usize> {
    write_rows(
        path,
        entries.iter().map(|entry| FarmerCropRow {
            username: entry.username.clone(),
            crop_name: entry.crop_name.clone(),
            field_size_acres: entry.field_size_acres,
            profit_per_acre: entry.profit_per_acre,
            estimated_profit: entry.estimated_profit,
        }),
    )
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> Error + '_ {
    move |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Read every parseable row of `path`, or `None` if the file doesn't exist.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        debug!("Skipping missing {}", path.display());
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error(path))?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<T>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                // Header is line 1
                warn!(file = %path.display(), line = index + 2, "Skipping unreadable row: {}", e);
            }
        }
    }
    Ok(Some(rows))
}

/// Write the header line, then every row. Empty tables still get headers.
fn write_rows<T: LegacyRow>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error(path))?;
    writer.write_record(T::HEADERS).map_err(csv_error(path))?;
    let mut written = 0;
    for row in rows {
        writer.serialize(row).map_err(csv_error(path))?;
        written += 1;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", written, path.display());
    Ok(written)
}

fn user_from_row(row: UserRow) -> User {
    let role = row.role.parse().unwrap_or_else(|_| {
        warn!(username = %row.username, "Unknown role: {}, defaulting to farmer", row.role);
        Role::Farmer
    });
    User {
        id: row.user_id,
        username: row.username.trim().to_string(),
        name: row.name,
        role,
        password_hash: row.password_hash,
        salt: row.salt,
        registered_at: Utc::now(),
    }
}

/// Keep the ids a legacy file carries and number the rest after them.
fn number_farmers(rows: Vec<FarmerRow>) -> Vec<Farmer> {
    let mut next_id = rows.iter().filter_map(|row| row.farmer_id).max().unwrap_or(0) + 1;
    rows.into_iter()
        .map(|row| {
            let id = row.farmer_id.unwrap_or_else(|| {
                let id = next_id;
                next_id += 1;
                id
            });
            Farmer {
                id,
                username: row
                    .username
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty()),
                name: row.name,
                location: row.location,
                contact: row.contact.trim().to_string(),
            }
        })
        .collect()
}

fn crop_from_row(row: CropRow) -> Crop {
    let water_needs = row
        .water_needs
        .filter(|w| !w.trim().is_empty())
        .and_then(|w| match w.parse() {
            Ok(needs) => Some(needs),
            Err(_) => {
                warn!(crop = %row.crop_name, "Unknown water needs: {}, ignoring", w);
                None
            }
        });
    Crop {
        id: row.crop_id,
        name: row.crop_name,
        season: row.season,
        price_per_quintal: row.price_per_quintal,
        fertilizer: row.fertilizer,
        water_needs,
    }
}
