//! `farmrec` - Farm records manager
//!
//! This library keeps user accounts, farmer records, a crop catalog and a
//! crop-profit reference table in a SQLite database, and estimates the
//! profit of the crops each farmer plants. Every operation goes through
//! [`Portal`], which checks the caller's [`Session`] role and validates
//! input before touching [`Storage`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod interchange;
pub mod logging;
pub mod menu;
pub mod portal;
pub mod records;
pub mod security;
pub mod storage;
pub mod table;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use portal::Portal;
pub use records::{Crop, CropProfit, Farmer, FarmerCrop, Role, Session, User, WaterNeeds};
pub use storage::{Storage, StorageStats};
