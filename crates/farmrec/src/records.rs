//! Core record types for farmrec.
//!
//! This module defines the rows stored in each dataset: users, farmers, the
//! crop catalog, the crop-profit reference table and farmers' crop entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The role a user logs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages every dataset.
    Admin,
    /// Manages their own profile and crop entries.
    Farmer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Farmer => write!(f, "farmer"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            // Older datasets called farmers "client"
            "farmer" | "client" => Ok(Self::Farmer),
            other => Err(Error::validation(
                "role",
                format!("unknown role '{other}', expected admin or farmer"),
            )),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Row id.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Full name.
    pub name: String,
    /// Role granted at registration.
    pub role: Role,
    /// Hex SHA-256 of password + salt.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Hex salt mixed into the hash.
    #[serde(skip_serializing)]
    pub salt: String,
    /// When the account was created.
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Build the session handed out after a successful login.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            user_id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// The identity of a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Id of the user row.
    pub user_id: i64,
    /// Login name.
    pub username: String,
    /// Full name.
    pub name: String,
    /// Role the user acts with.
    pub role: Role,
}

impl Session {
    /// Fail unless this session has the given role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] for any other role.
    pub fn require(&self, required: Role) -> Result<()> {
        if self.role == required {
            Ok(())
        } else {
            Err(Error::PermissionDenied { required })
        }
    }

    /// Check whether this session belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A farmer's contact record, optionally linked to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farmer {
    /// Row id.
    pub id: i64,
    /// Username of the linked account, if any.
    pub username: Option<String>,
    /// Full name.
    pub name: String,
    /// Village, district or region.
    pub location: String,
    /// Contact phone number.
    pub contact: String,
}

/// Water requirement of a catalog crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterNeeds {
    /// Rain-fed or drought tolerant.
    Low,
    /// Regular irrigation.
    Medium,
    /// Flooded or heavily irrigated.
    High,
}

impl fmt::Display for WaterNeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl FromStr for WaterNeeds {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::validation(
                "water_needs",
                format!("unknown water needs '{other}', expected Low, Medium or High"),
            )),
        }
    }
}

/// A row of the crop catalog maintained by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    /// Row id.
    pub id: i64,
    /// Crop name.
    pub name: String,
    /// Growing season, e.g. Kharif, Rabi or Zaid.
    pub season: String,
    /// Market price per quintal.
    pub price_per_quintal: Option<f64>,
    /// Recommended fertilizer.
    pub fertilizer: String,
    /// Water requirement.
    pub water_needs: Option<WaterNeeds>,
}

/// A row of the crop-profit reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfit {
    /// Crop name, unique within the table.
    pub crop_name: String,
    /// Growing season.
    pub season: String,
    /// Expected profit for one acre.
    pub profit_per_acre: f64,
    /// Free-text description from the crop details dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CropProfit {
    /// Estimated profit for a field of the given size.
    #[must_use]
    pub fn estimate(&self, field_size_acres: f64) -> f64 {
        self.profit_per_acre * field_size_acres
    }
}

/// A crop a farmer has planted, with its profit estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerCrop {
    /// Row id.
    pub id: i64,
    /// Username of the farmer who recorded the entry.
    pub username: String,
    /// Crop name from the reference table.
    pub crop_name: String,
    /// Field size in acres.
    pub field_size_acres: f64,
    /// Profit per acre at the time the entry was recorded.
    pub profit_per_acre: f64,
    /// `profit_per_acre * field_size_acres`.
    pub estimated_profit: f64,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl FarmerCrop {
    /// Create an unsaved entry for `username` from a reference row.
    #[must_use]
    pub fn new(username: &str, reference: &CropProfit, field_size_acres: f64) -> Self {
        Self {
            id: 0,
            username: username.to_string(),
            crop_name: reference.crop_name.clone(),
            field_size_acres,
            profit_per_acre: reference.profit_per_acre,
            estimated_profit: reference.estimate(field_size_acres),
            recorded_at: Utc::now(),
        }
    }
}
