//! Farm records operations.
//!
//! [`Portal`] is the single entry point used by both the command line and the
//! interactive menu. It checks the caller's role, validates input, applies
//! the record rules and writes through to [`Storage`].

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::interchange::{self, FileTransfer};
use crate::records::{Crop, CropProfit, Farmer, FarmerCrop, Role, Session, User, WaterNeeds};
use crate::security;
use crate::storage::{Storage, StorageStats};
use crate::validation::Validator;

/// A new account.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    /// Requested login name.
    pub username: String,
    /// Full name.
    pub name: String,
    /// Chosen password.
    pub password: String,
    /// The password typed a second time.
    pub confirm_password: String,
    /// Role to register with.
    pub role: Option<Role>,
    /// Location, required for farmers.
    pub location: Option<String>,
    /// Contact number, required for farmers.
    pub contact: Option<String>,
}

/// Changes to a user account. `None` or blank keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New login name.
    pub username: Option<String>,
    /// New full name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New password.
    pub password: Option<String>,
}

/// A farmer record added by an administrator.
#[derive(Debug, Clone, Default)]
pub struct NewFarmer {
    /// Full name, unique among farmer records.
    pub name: String,
    /// Village, district or region.
    pub location: String,
    /// Contact number.
    pub contact: String,
    /// Linked username. Defaults to the lowercased name.
    pub username: Option<String>,
}

/// Changes to a farmer record. `None` or blank keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct FarmerUpdate {
    /// New name.
    pub name: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New contact number.
    pub contact: Option<String>,
    /// New linked username.
    pub username: Option<String>,
}

/// A farmer's own profile details. `None` or blank keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Name on the record. Defaults to the account name.
    pub name: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// Contact number.
    pub contact: Option<String>,
}

/// A crop catalog entry.
#[derive(Debug, Clone, Default)]
pub struct NewCrop {
    /// Crop name.
    pub name: String,
    /// Growing season.
    pub season: String,
    /// Market price per quintal.
    pub price_per_quintal: Option<f64>,
    /// Recommended fertilizer.
    pub fertilizer: String,
    /// Water requirement.
    pub water_needs: Option<WaterNeeds>,
}

/// Changes to a catalog crop. `None` or blank keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct CropUpdate {
    /// New name.
    pub name: Option<String>,
    /// New season.
    pub season: Option<String>,
    /// New price per quintal.
    pub price_per_quintal: Option<f64>,
    /// New fertilizer.
    pub fertilizer: Option<String>,
    /// New water requirement.
    pub water_needs: Option<WaterNeeds>,
}

/// Filters for the crop-profit reference table.
#[derive(Debug, Clone, Default)]
pub struct ProfitFilter {
    /// Only crops of this season.
    pub season: Option<String>,
    /// Only crops whose name contains this text, ignoring case.
    pub search: Option<String>,
    /// Lower bound on profit per acre, applied when above zero.
    pub min_profit: f64,
    /// Upper bound on profit per acre, applied when above zero.
    pub max_profit: f64,
}

impl ProfitFilter {
    /// Check whether a reference crop passes every filter.
    #[must_use]
    pub fn matches(&self, profit: &CropProfit) -> bool {
        if let Some(season) = self.season.as_deref().filter(|s| !s.is_empty()) {
            if profit.season != season {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !profit
                .crop_name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if self.min_profit > 0.0 && profit.profit_per_acre < self.min_profit {
            return false;
        }
        if self.max_profit > 0.0 && profit.profit_per_acre > self.max_profit {
            return false;
        }
        true
    }
}

/// The effect of changing a crop's profit per acre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitChange {
    /// Crop that changed.
    pub crop_name: String,
    /// Profit per acre before the change.
    pub old: f64,
    /// Profit per acre after the change.
    pub new: f64,
    /// `new - old`.
    pub change: f64,
    /// Change relative to the old value in percent, 0 when old was 0.
    pub change_pct: f64,
}

impl ProfitChange {
    fn new(crop_name: String, old: f64, new: f64) -> Self {
        let change = new - old;
        let change_pct = if old == 0.0 { 0.0 } else { change / old * 100.0 };
        Self {
            crop_name,
            old,
            new,
            change,
            change_pct,
        }
    }
}

/// A farmer's crop entries with their totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropSummary {
    /// Entries, oldest first.
    pub entries: Vec<FarmerCrop>,
    /// Sum of estimated profits.
    pub total_profit: f64,
    /// Sum of field sizes.
    pub total_acres: f64,
}

impl CropSummary {
    fn from_entries(entries: Vec<FarmerCrop>) -> Self {
        let total_profit = entries.iter().map(|e| e.estimated_profit).sum();
        let total_acres = entries.iter().map(|e| e.field_size_acres).sum();
        Self {
            entries,
            total_profit,
            total_acres,
        }
    }
}

/// The landing page shown after login.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    /// Portal-wide overview.
    Admin {
        /// Row counts.
        stats: StorageStats,
        /// Most recently added farmer records.
        recent_farmers: Vec<Farmer>,
        /// The first reference crops.
        crops: Vec<CropProfit>,
    },
    /// One farmer's overview.
    Farmer {
        /// Number of crop entries.
        entries: usize,
        /// Sum of estimated profits.
        total_profit: f64,
        /// Sum of field sizes.
        total_acres: f64,
        /// Most recent crop entries.
        recent: Vec<FarmerCrop>,
    },
}

/// Estimated profit of one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfit {
    /// Username the entries belong to.
    pub username: String,
    /// Sum of their estimated profits.
    pub total_profit: f64,
}

/// Estimated profit per user across the portal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfitReport {
    /// One row per user, sorted by username.
    pub rows: Vec<UserProfit>,
    /// Sum over all users.
    pub total: f64,
}

/// Role-checked operations over the farm records.
#[derive(Debug)]
pub struct Portal {
    storage: Storage,
    validator: Validator,
    recent_limit: usize,
}

/// Trimmed replacement text, or `None` when blank.
fn changed(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl Portal {
    /// Create a portal over `storage` with the rules from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured validation rules do not compile.
    pub fn new(storage: Storage, config: &Config) -> Result<Self> {
        Ok(Self {
            storage,
            validator: Validator::new(&config.validation)?,
            recent_limit: config.display.recent_limit,
        })
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The field validator in use.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    // === Auth ===

    /// Register a new account.
    ///
    /// Farmers also get a farmer record linked to their username.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first rule the input breaks,
    /// [`Error::UsernameTaken`] if the username exists, or a storage error.
    pub fn register(&self, registration: &Registration) -> Result<User> {
        let v = &self.validator;
        let username = v.required("username", &registration.username)?;
        let name = v.required("name", &registration.name)?;
        if registration.password.is_empty() {
            return Err(Error::validation("password", "is required"));
        }

        if self.storage.user_by_username(&username)?.is_some() {
            return Err(Error::UsernameTaken(username));
        }

        let name = v.name(&name)?;
        v.password_confirmation(&registration.password, &registration.confirm_password)?;
        v.password(&registration.password)?;

        let role = registration.role.unwrap_or(Role::Farmer);
        let farmer = if role == Role::Farmer {
            let contact = v.contact(registration.contact.as_deref().unwrap_or_default())?;
            let location = v.required(
                "location",
                registration.location.as_deref().unwrap_or_default(),
            )?;
            Some(Farmer {
                id: 0,
                username: Some(username.clone()),
                name: name.clone(),
                location,
                contact,
            })
        } else {
            None
        };

        let (password_hash, salt) = security::hash_password(&registration.password);
        let user = self.storage.insert_user(&User {
            id: 0,
            username,
            name,
            role,
            password_hash,
            salt,
            registered_at: Utc::now(),
        })?;

        if let Some(farmer) = farmer {
            self.storage.insert_farmer(&farmer)?;
        }

        info!(username = %user.username, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Check credentials and open a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoUsers`] when nobody has registered,
    /// [`Error::UserNotFound`] for an unknown username and
    /// [`Error::IncorrectPassword`] when the password does not match.
    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        if self.storage.count_users()? == 0 {
            return Err(Error::NoUsers);
        }

        let username = username.trim();
        let Some(user) = self.storage.user_by_username(username)? else {
            warn!(username, "Login for unknown user");
            return Err(Error::UserNotFound(username.to_string()));
        };

        if !security::verify_password(password, &user.password_hash, &user.salt) {
            warn!(username, "Login with incorrect password");
            return Err(Error::IncorrectPassword);
        }

        debug!(username, role = %user.role, "Logged in");
        Ok(user.session())
    }

    // === Users ===

    /// List every account.
    ///
    /// # Errors
    ///
    /// Requires the admin role.
    pub fn users(&self, session: &Session) -> Result<Vec<User>> {
        session.require(Role::Admin)?;
        self.storage.list_users()
    }

    /// Change an account.
    ///
    /// A new password is checked for complexity and rehashed with a fresh
    /// salt. A new username is carried over to linked farmer records and crop
    /// entries.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown
    /// user, [`Error::UsernameTaken`] on a clashing rename, or a validation
    /// error.
    pub fn update_user(
        &self,
        session: &Session,
        username: &str,
        update: &UserUpdate,
    ) -> Result<User> {
        session.require(Role::Admin)?;
        let mut user = self
            .storage
            .user_by_username(username)?
            .ok_or_else(|| Error::not_found("user", username))?;
        let old_username = user.username.clone();

        if let Some(new_username) = changed(update.username.as_ref()) {
            if new_username != user.username {
                if self.storage.user_by_username(new_username)?.is_some() {
                    return Err(Error::UsernameTaken(new_username.to_string()));
                }
                user.username = new_username.to_string();
            }
        }
        if let Some(name) = changed(update.name.as_ref()) {
            user.name = self.validator.name(name)?;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) {
            self.validator.password(password)?;
            let (hash, salt) = security::hash_password(password);
            user.password_hash = hash;
            user.salt = salt;
        }

        self.storage.update_user(&user)?;
        if user.username != old_username {
            let moved = self
                .storage
                .rename_user_links(&old_username, &user.username)?;
            debug!(old = %old_username, new = %user.username, moved, "Renamed user links");
        }

        info!(admin = %session.username, username = %user.username, "Updated user");
        Ok(user)
    }

    /// Delete an account. Farmer records and crop entries are kept.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown user.
    pub fn delete_user(&self, session: &Session, username: &str) -> Result<()> {
        session.require(Role::Admin)?;
        if !self.storage.delete_user(username)? {
            return Err(Error::not_found("user", username));
        }
        info!(admin = %session.username, username, "Deleted user");
        Ok(())
    }

    // === Farmers ===

    /// List every farmer record.
    ///
    /// # Errors
    ///
    /// Requires the admin role.
    pub fn farmers(&self, session: &Session) -> Result<Vec<Farmer>> {
        session.require(Role::Admin)?;
        self.storage.list_farmers()
    }

    /// Add a farmer record.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns a validation error,
    /// [`Error::FarmerExists`] for a repeated name, or a storage error.
    pub fn add_farmer(&self, session: &Session, farmer: &NewFarmer) -> Result<Farmer> {
        session.require(Role::Admin)?;
        let v = &self.validator;
        let name = v.required("name", &farmer.name)?;
        let location = v.required("location", &farmer.location)?;
        v.required("contact", &farmer.contact)?;
        let contact = v.contact(&farmer.contact)?;

        if self.storage.farmer_name_exists(&name)? {
            return Err(Error::FarmerExists(name));
        }

        let username = changed(farmer.username.as_ref())
            .map_or_else(|| name.to_lowercase(), str::to_string);
        let stored = self.storage.insert_farmer(&Farmer {
            id: 0,
            username: Some(username),
            name,
            location,
            contact,
        })?;

        info!(admin = %session.username, farmer = %stored.name, id = stored.id, "Added farmer");
        Ok(stored)
    }

    /// Change a farmer record.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown
    /// id, [`Error::FarmerExists`] when renaming onto another farmer, or a
    /// validation error.
    pub fn update_farmer(
        &self,
        session: &Session,
        id: i64,
        update: &FarmerUpdate,
    ) -> Result<Farmer> {
        session.require(Role::Admin)?;
        let mut farmer = self
            .storage
            .farmer(id)?
            .ok_or_else(|| Error::not_found("farmer", id))?;

        if let Some(name) = changed(update.name.as_ref()) {
            if name != farmer.name && self.storage.farmer_name_exists(name)? {
                return Err(Error::FarmerExists(name.to_string()));
            }
            farmer.name = name.to_string();
        }
        if let Some(location) = changed(update.location.as_ref()) {
            farmer.location = location.to_string();
        }
        if let Some(contact) = changed(update.contact.as_ref()) {
            farmer.contact = contact.to_string();
        }
        if let Some(username) = changed(update.username.as_ref()) {
            farmer.username = Some(username.to_string());
        }
        farmer.contact = self.validator.contact(&farmer.contact)?;

        self.storage.update_farmer(&farmer)?;
        info!(admin = %session.username, id, "Updated farmer");
        Ok(farmer)
    }

    /// Delete a farmer record.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown id.
    pub fn delete_farmer(&self, session: &Session, id: i64) -> Result<()> {
        session.require(Role::Admin)?;
        if !self.storage.delete_farmer(id)? {
            return Err(Error::not_found("farmer", id));
        }
        info!(admin = %session.username, id, "Deleted farmer");
        Ok(())
    }

    // === Profile ===

    /// The caller's own farmer record, if one exists.
    ///
    /// # Errors
    ///
    /// Requires the farmer role.
    pub fn profile(&self, session: &Session) -> Result<Option<Farmer>> {
        session.require(Role::Farmer)?;
        self.storage.farmer_by_username(&session.username)
    }

    /// Create or update the caller's farmer record.
    ///
    /// # Errors
    ///
    /// Requires the farmer role. Returns a validation error when the
    /// resulting location is empty or the contact number is malformed.
    pub fn save_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<Farmer> {
        session.require(Role::Farmer)?;
        let existing = self.storage.farmer_by_username(&session.username)?;
        let mut farmer = existing.clone().unwrap_or_else(|| Farmer {
            id: 0,
            username: Some(session.username.clone()),
            name: session.name.clone(),
            location: String::new(),
            contact: String::new(),
        });

        if let Some(name) = changed(update.name.as_ref()) {
            farmer.name = self.validator.name(name)?;
        }
        if let Some(location) = changed(update.location.as_ref()) {
            farmer.location = location.to_string();
        }
        if let Some(contact) = changed(update.contact.as_ref()) {
            farmer.contact = contact.to_string();
        }
        farmer.location = self.validator.required("location", &farmer.location)?;
        farmer.contact = self.validator.contact(&farmer.contact)?;

        let saved = if existing.is_some() {
            self.storage.update_farmer(&farmer)?;
            farmer
        } else {
            self.storage.insert_farmer(&farmer)?
        };

        info!(username = %session.username, id = saved.id, "Saved profile");
        Ok(saved)
    }

    /// Delete the caller's account, farmer record and crop entries.
    ///
    /// # Errors
    ///
    /// Requires the farmer role.
    pub fn delete_account(&self, session: &Session) -> Result<()> {
        session.require(Role::Farmer)?;
        let entries = self.storage.delete_plantings_for(&session.username)?;
        let farmers = self.storage.delete_farmers_for(&session.username)?;
        self.storage.delete_user(&session.username)?;
        info!(username = %session.username, entries, farmers, "Deleted account");
        Ok(())
    }

    // === Crop catalog ===

    /// List the crop catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn crops(&self, session: &Session) -> Result<Vec<Crop>> {
        debug!(username = %session.username, "Listing crop catalog");
        self.storage.list_crops()
    }

    /// Add a catalog crop.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns a validation error for a blank name
    /// or season or a negative price.
    pub fn add_crop(&self, session: &Session, crop: &NewCrop) -> Result<Crop> {
        session.require(Role::Admin)?;
        let v = &self.validator;
        let price_per_quintal = crop
            .price_per_quintal
            .map(|p| v.amount("price_per_quintal", p))
            .transpose()?;

        let stored = self.storage.insert_crop(&Crop {
            id: 0,
            name: v.required("crop_name", &crop.name)?,
            season: v.required("season", &crop.season)?,
            price_per_quintal,
            fertilizer: crop.fertilizer.trim().to_string(),
            water_needs: crop.water_needs,
        })?;

        info!(admin = %session.username, crop = %stored.name, id = stored.id, "Added crop");
        Ok(stored)
    }

    /// Change a catalog crop.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown id
    /// or a validation error for a negative price.
    pub fn update_crop(&self, session: &Session, id: i64, update: &CropUpdate) -> Result<Crop> {
        session.require(Role::Admin)?;
        let mut crop = self
            .storage
            .crop(id)?
            .ok_or_else(|| Error::not_found("crop", id))?;

        if let Some(name) = changed(update.name.as_ref()) {
            crop.name = name.to_string();
        }
        if let Some(season) = changed(update.season.as_ref()) {
            crop.season = season.to_string();
        }
        if let Some(price) = update.price_per_quintal {
            crop.price_per_quintal = Some(self.validator.amount("price_per_quintal", price)?);
        }
        if let Some(fertilizer) = changed(update.fertilizer.as_ref()) {
            crop.fertilizer = fertilizer.to_string();
        }
        if let Some(water_needs) = update.water_needs {
            crop.water_needs = Some(water_needs);
        }

        self.storage.update_crop(&crop)?;
        info!(admin = %session.username, id, "Updated crop");
        Ok(crop)
    }

    /// Delete a catalog crop.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown id.
    pub fn delete_crop(&self, session: &Session, id: i64) -> Result<()> {
        session.require(Role::Admin)?;
        if !self.storage.delete_crop(id)? {
            return Err(Error::not_found("crop", id));
        }
        info!(admin = %session.username, id, "Deleted crop");
        Ok(())
    }

    // === Crop-profit reference ===

    /// Reference crops passing `filter`, in table order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn crop_profits(
        &self,
        session: &Session,
        filter: &ProfitFilter,
    ) -> Result<Vec<CropProfit>> {
        debug!(username = %session.username, ?filter, "Listing reference crops");
        let profits = self.storage.list_crop_profits()?;
        Ok(profits.into_iter().filter(|p| filter.matches(p)).collect())
    }

    /// Distinct seasons of the reference crops.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn seasons(&self, session: &Session) -> Result<Vec<String>> {
        debug!(username = %session.username, "Listing seasons");
        self.storage.seasons()
    }

    /// One reference crop with its description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown crop.
    pub fn crop_profit(&self, session: &Session, crop_name: &str) -> Result<CropProfit> {
        debug!(username = %session.username, crop_name, "Looking up reference crop");
        self.reference(crop_name)
    }

    fn reference(&self, crop_name: &str) -> Result<CropProfit> {
        let crop_name = crop_name.trim();
        self.storage
            .crop_profit(crop_name)?
            .ok_or_else(|| Error::not_found("crop", crop_name))
    }

    /// Add a reference crop, with an optional description.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns a validation error,
    /// [`Error::CropExists`] for a repeated name, or a storage error.
    pub fn add_crop_profit(&self, session: &Session, profit: &CropProfit) -> Result<CropProfit> {
        session.require(Role::Admin)?;
        let v = &self.validator;
        let reference = CropProfit {
            crop_name: v.required("crop_name", &profit.crop_name)?,
            season: v.required("season", &profit.season)?,
            profit_per_acre: v.amount("profit_per_acre", profit.profit_per_acre)?,
            description: profit
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };

        self.storage.insert_crop_profit(&reference)?;
        info!(admin = %session.username, crop = %reference.crop_name, "Added reference crop");
        Ok(reference)
    }

    /// Set a crop's profit per acre and report the change.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown
    /// crop or a validation error for a negative amount.
    pub fn update_profit(
        &self,
        session: &Session,
        crop_name: &str,
        profit_per_acre: f64,
    ) -> Result<ProfitChange> {
        session.require(Role::Admin)?;
        let new = self.validator.amount("profit_per_acre", profit_per_acre)?;
        let current = self.reference(crop_name)?;

        self.storage.set_profit(&current.crop_name, new)?;
        let change = ProfitChange::new(current.crop_name, current.profit_per_acre, new);
        info!(
            admin = %session.username,
            crop = %change.crop_name,
            old = change.old,
            new = change.new,
            "Updated profit per acre"
        );
        Ok(change)
    }

    /// Delete a reference crop.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown crop.
    pub fn delete_crop_profit(&self, session: &Session, crop_name: &str) -> Result<()> {
        session.require(Role::Admin)?;
        let crop_name = crop_name.trim();
        if !self.storage.delete_crop_profit(crop_name)? {
            return Err(Error::not_found("crop", crop_name));
        }
        info!(admin = %session.username, crop = crop_name, "Deleted reference crop");
        Ok(())
    }

    /// Set the description of a reference crop.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns [`Error::NotFound`] for an unknown
    /// crop or a validation error for a blank description.
    pub fn describe_crop(
        &self,
        session: &Session,
        crop_name: &str,
        description: &str,
    ) -> Result<()> {
        session.require(Role::Admin)?;
        let description = self.validator.required("description", description)?;
        let reference = self.reference(crop_name)?;
        self.storage
            .set_description(&reference.crop_name, &description)?;
        info!(admin = %session.username, crop = %reference.crop_name, "Updated description");
        Ok(())
    }

    // === Farmer crop entries ===

    /// Record a crop the caller planted.
    ///
    /// # Errors
    ///
    /// Requires the farmer role. Returns [`Error::NotFound`] if the crop is
    /// not in the reference table or a validation error for the field size.
    pub fn plant(
        &self,
        session: &Session,
        crop_name: &str,
        field_size_acres: f64,
    ) -> Result<FarmerCrop> {
        session.require(Role::Farmer)?;
        let acres = self.validator.field_size(field_size_acres)?;
        let reference = self.reference(crop_name)?;

        let entry = self
            .storage
            .insert_planting(&FarmerCrop::new(&session.username, &reference, acres))?;
        info!(
            username = %session.username,
            crop = %entry.crop_name,
            acres,
            estimated_profit = entry.estimated_profit,
            "Recorded crop entry"
        );
        Ok(entry)
    }

    /// The caller's crop entries with totals.
    ///
    /// # Errors
    ///
    /// Requires the farmer role.
    pub fn my_crops(&self, session: &Session) -> Result<CropSummary> {
        session.require(Role::Farmer)?;
        let entries = self.storage.plantings_for(&session.username)?;
        Ok(CropSummary::from_entries(entries))
    }

    /// Remove one of the caller's crop entries.
    ///
    /// # Errors
    ///
    /// Requires the farmer role. Returns [`Error::NotFound`] unless the entry
    /// exists and belongs to the caller.
    pub fn remove_planting(&self, session: &Session, id: i64) -> Result<()> {
        session.require(Role::Farmer)?;
        if !self.storage.delete_planting(id, &session.username)? {
            return Err(Error::not_found("crop entry", id));
        }
        info!(username = %session.username, id, "Removed crop entry");
        Ok(())
    }

    /// Remove all of the caller's crop entries, returning how many there were.
    ///
    /// # Errors
    ///
    /// Requires the farmer role.
    pub fn clear_plantings(&self, session: &Session) -> Result<usize> {
        session.require(Role::Farmer)?;
        let removed = self.storage.delete_plantings_for(&session.username)?;
        info!(username = %session.username, removed, "Cleared crop entries");
        Ok(removed)
    }

    // === Reports ===

    /// The landing page for the caller's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn dashboard(&self, session: &Session) -> Result<Dashboard> {
        let limit = self.recent_limit;
        match session.role {
            Role::Admin => Ok(Dashboard::Admin {
                stats: self.storage.stats()?,
                recent_farmers: self.storage.recent_farmers(limit)?,
                crops: self
                    .storage
                    .list_crop_profits()?
                    .into_iter()
                    .take(limit)
                    .collect(),
            }),
            Role::Farmer => {
                let entries = self.storage.plantings_for(&session.username)?;
                let summary = CropSummary::from_entries(entries);
                let skip = summary.entries.len().saturating_sub(limit);
                Ok(Dashboard::Farmer {
                    entries: summary.entries.len(),
                    total_profit: summary.total_profit,
                    total_acres: summary.total_acres,
                    recent: summary.entries.into_iter().skip(skip).collect(),
                })
            }
        }
    }

    /// Estimated profit per user.
    ///
    /// # Errors
    ///
    /// Requires the admin role.
    pub fn profit_report(&self, session: &Session) -> Result<ProfitReport> {
        session.require(Role::Admin)?;
        let rows: Vec<UserProfit> = self
            .storage
            .profit_by_user()?
            .into_iter()
            .map(|(username, total_profit)| UserProfit {
                username,
                total_profit,
            })
            .collect();
        let total = rows.iter().map(|r| r.total_profit).sum();
        Ok(ProfitReport { rows, total })
    }

    /// Write every crop entry to a CSV file with the legacy headers.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns an error if the file cannot be written.
    pub fn export_plantings(&self, session: &Session, path: &Path) -> Result<usize> {
        session.require(Role::Admin)?;
        let written = interchange::write_plantings(path, &self.storage.list_plantings()?)?;
        info!(admin = %session.username, path = %path.display(), written, "Exported crop entries");
        Ok(written)
    }

    // === Data directory ===

    /// Load a legacy CSV directory into the database.
    ///
    /// Allowed to administrators, or to anyone while no user is registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] for a non-admin caller once users
    /// exist, or an error if the files cannot be read.
    pub fn import_data(&self, session: Option<&Session>, dir: &Path) -> Result<Vec<FileTransfer>> {
        match session {
            Some(session) => session.require(Role::Admin)?,
            None if self.storage.count_users()? > 0 => {
                return Err(Error::PermissionDenied {
                    required: Role::Admin,
                })
            }
            None => debug!("Importing into an empty portal"),
        }
        interchange::import_dir(&self.storage, dir)
    }

    /// Write every table to a legacy CSV directory.
    ///
    /// # Errors
    ///
    /// Requires the admin role. Returns an error if the files cannot be written.
    pub fn export_data(&self, session: &Session, dir: &Path) -> Result<Vec<FileTransfer>> {
        session.require(Role::Admin)?;
        interchange::export_dir(&self.storage, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &str = "Harvest@2024";

    fn portal() -> Portal {
        crate::logging::init_test_logging();
        Portal::new(Storage::open_in_memory().unwrap(), &Config::default()).unwrap()
    }

    fn registration(username: &str, role: Role) -> Registration {
        Registration {
            username: username.to_string(),
            name: format!("{username} Kumar"),
            password: PASSWORD.to_string(),
            confirm_password: PASSWORD.to_string(),
            role: Some(role),
            location: Some("Nashik".to_string()),
            contact: Some("9876543210".to_string()),
        }
    }

    fn login_as(portal: &Portal, username: &str, role: Role) -> Session {
        portal.register(&registration(username, role)).unwrap();
        portal.login(username, PASSWORD).unwrap()
    }

    fn with_reference(portal: &Portal, admin: &Session) {
        for (name, season, profit) in [
            ("Rice", "Kharif", 30_000.0),
            ("Wheat", "Rabi", 25_000.0),
            ("Cotton", "Kharif", 40_000.0),
            ("Mustard", "Rabi", 0.0),
        ] {
            portal
                .add_crop_profit(
                    admin,
                    &CropProfit {
                        crop_name: name.to_string(),
                        season: season.to_string(),
                        profit_per_acre: profit,
                        description: None,
                    },
                )
                .unwrap();
        }
    }

    #[test]
    fn test_login_before_registration() {
        let err = portal().login("ravi", PASSWORD).unwrap_err();
        assert!(matches!(err, Error::NoUsers));
    }

    #[test]
    fn test_login_outcomes() {
        let portal = portal();
        portal.register(&registration("ravi", Role::Farmer)).unwrap();

        let session = portal.login("ravi", PASSWORD).unwrap();
        assert_eq!(session.role, Role::Farmer);
        assert!(matches!(
            portal.login("meena", PASSWORD),
            Err(Error::UserNotFound(name)) if name == "meena"
        ));
        assert!(matches!(
            portal.login("ravi", "Wrong@2024"),
            Err(Error::IncorrectPassword)
        ));
    }

    #[test]
    fn test_register_farmer_creates_linked_record() {
        let portal = portal();
        let session = login_as(&portal, "ravi", Role::Farmer);

        let profile = portal.profile(&session).unwrap().unwrap();
        assert_eq!(profile.username.as_deref(), Some("ravi"));
        assert_eq!(profile.location, "Nashik");
    }

    #[test]
    fn test_register_admin_needs_no_contact() {
        let portal = portal();
        let mut admin = registration("asha", Role::Admin);
        admin.contact = None;
        admin.location = None;

        portal.register(&admin).unwrap();
        assert_eq!(portal.storage().stats().unwrap().farmers, 0);
    }

    #[test]
    fn test_register_checks_in_order() {
        let portal = portal();
        portal.register(&registration("ravi", Role::Farmer)).unwrap();

        let mut blank = registration("", Role::Farmer);
        blank.name = String::new();
        let err = portal.register(&blank).unwrap_err();
        assert_eq!(err.to_string(), "username: is required");

        // A taken username is reported before a bad name
        let mut taken = registration("ravi", Role::Farmer);
        taken.name = "R".to_string();
        assert!(matches!(
            portal.register(&taken),
            Err(Error::UsernameTaken(_))
        ));

        let mut mismatch = registration("meena", Role::Farmer);
        mismatch.confirm_password = "Other@2024".to_string();
        assert_eq!(
            portal.register(&mismatch).unwrap_err().to_string(),
            "password: passwords don't match"
        );

        let mut weak = registration("meena", Role::Farmer);
        weak.password = "weak".to_string();
        weak.confirm_password = "weak".to_string();
        assert!(portal
            .register(&weak)
            .unwrap_err()
            .to_string()
            .starts_with("password: must contain"));

        let mut bad_contact = registration("meena", Role::Farmer);
        bad_contact.contact = Some("12345".to_string());
        assert_eq!(
            portal.register(&bad_contact).unwrap_err().to_string(),
            "contact: must be exactly 10 digits"
        );
        assert_eq!(portal.storage().count_users().unwrap(), 1);
    }

    #[test]
    fn test_admin_only_operations() {
        let portal = portal();
        let farmer = login_as(&portal, "ravi", Role::Farmer);

        assert!(matches!(
            portal.users(&farmer),
            Err(Error::PermissionDenied {
                required: Role::Admin
            })
        ));
        assert!(portal.farmers(&farmer).is_err());
        assert!(portal.profit_report(&farmer).is_err());
    }

    #[test]
    fn test_farmer_only_operations() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);

        assert!(matches!(
            portal.plant(&admin, "Rice", 1.0),
            Err(Error::PermissionDenied {
                required: Role::Farmer
            })
        ));
        assert!(portal.profile(&admin).is_err());
    }

    #[test]
    fn test_update_user_rename_moves_links() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);
        portal.plant(&farmer, "Rice", 2.0).unwrap();

        let update = UserUpdate {
            username: Some("ravik".to_string()),
            password: Some("Monsoon#1".to_string()),
            ..UserUpdate::default()
        };
        // '#' is not an allowed special character
        assert!(portal.update_user(&admin, "ravi", &update).is_err());

        let update = UserUpdate {
            username: Some("ravik".to_string()),
            password: Some("Monsoon@1".to_string()),
            ..UserUpdate::default()
        };
        let user = portal.update_user(&admin, "ravi", &update).unwrap();
        assert_eq!(user.username, "ravik");

        let session = portal.login("ravik", "Monsoon@1").unwrap();
        assert_eq!(portal.my_crops(&session).unwrap().entries.len(), 1);
        assert!(portal.profile(&session).unwrap().is_some());
    }

    #[test]
    fn test_update_user_rejects_taken_username() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        portal.register(&registration("ravi", Role::Farmer)).unwrap();

        let update = UserUpdate {
            username: Some("asha".to_string()),
            ..UserUpdate::default()
        };
        assert!(matches!(
            portal.update_user(&admin, "ravi", &update),
            Err(Error::UsernameTaken(_))
        ));
        assert!(matches!(
            portal.update_user(&admin, "nobody", &UserUpdate::default()),
            Err(Error::NotFound { kind: "user", .. })
        ));
    }

    #[test]
    fn test_delete_user_keeps_farmer_record() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        portal.register(&registration("ravi", Role::Farmer)).unwrap();

        portal.delete_user(&admin, "ravi").unwrap();
        assert_eq!(portal.users(&admin).unwrap().len(), 1);
        assert_eq!(portal.farmers(&admin).unwrap().len(), 1);
        assert!(portal.delete_user(&admin, "ravi").is_err());
    }

    #[test]
    fn test_add_farmer() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        let new = NewFarmer {
            name: "Meena Devi".to_string(),
            location: "Pune".to_string(),
            contact: "9123456780".to_string(),
            username: None,
        };

        let farmer = portal.add_farmer(&admin, &new).unwrap();
        assert_eq!(farmer.username.as_deref(), Some("meena devi"));
        assert!(matches!(
            portal.add_farmer(&admin, &new),
            Err(Error::FarmerExists(_))
        ));

        let missing = NewFarmer {
            location: String::new(),
            name: "Gopal".to_string(),
            ..new
        };
        assert_eq!(
            portal.add_farmer(&admin, &missing).unwrap_err().to_string(),
            "location: is required"
        );
    }

    #[test]
    fn test_update_farmer_keeps_blank_fields() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        let farmer = portal
            .add_farmer(
                &admin,
                &NewFarmer {
                    name: "Gopal".to_string(),
                    location: "Pune".to_string(),
                    contact: "9123456780".to_string(),
                    username: Some("gopal".to_string()),
                },
            )
            .unwrap();

        let update = FarmerUpdate {
            location: Some("  ".to_string()),
            contact: Some("9000000001".to_string()),
            ..FarmerUpdate::default()
        };
        let updated = portal.update_farmer(&admin, farmer.id, &update).unwrap();
        assert_eq!(updated.location, "Pune");
        assert_eq!(updated.contact, "9000000001");

        let bad = FarmerUpdate {
            contact: Some("90000".to_string()),
            ..FarmerUpdate::default()
        };
        assert!(portal.update_farmer(&admin, farmer.id, &bad).is_err());
        assert!(portal.update_farmer(&admin, 99, &update).is_err());

        portal.delete_farmer(&admin, farmer.id).unwrap();
        assert!(matches!(
            portal.delete_farmer(&admin, farmer.id),
            Err(Error::NotFound { kind: "farmer", .. })
        ));
    }

    #[test]
    fn test_save_profile_creates_then_updates() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);
        // Start without a linked record
        let id = portal.profile(&farmer).unwrap().unwrap().id;
        portal.delete_farmer(&admin, id).unwrap();

        let missing_location = ProfileUpdate {
            contact: Some("9876543210".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(portal.save_profile(&farmer, &missing_location).is_err());

        let created = portal
            .save_profile(
                &farmer,
                &ProfileUpdate {
                    location: Some("Satara".to_string()),
                    contact: Some("9876543210".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(created.name, "ravi Kumar");

        let updated = portal
            .save_profile(
                &farmer,
                &ProfileUpdate {
                    location: Some("Kolhapur".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.location, "Kolhapur");
        assert_eq!(updated.contact, "9876543210");
    }

    #[test]
    fn test_delete_account_removes_everything() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);
        portal.plant(&farmer, "Wheat", 1.0).unwrap();

        portal.delete_account(&farmer).unwrap();
        let stats = portal.storage().stats().unwrap();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.farmers, 0);
        assert_eq!(stats.farmer_crops, 0);
    }

    #[test]
    fn test_crop_catalog() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);

        let crop = portal
            .add_crop(
                &admin,
                &NewCrop {
                    name: "Rice".to_string(),
                    season: "Kharif".to_string(),
                    price_per_quintal: Some(2_200.0),
                    fertilizer: "Urea".to_string(),
                    water_needs: Some(WaterNeeds::High),
                },
            )
            .unwrap();
        assert!(portal.add_crop(&farmer, &NewCrop::default()).is_err());
        assert_eq!(portal.crops(&farmer).unwrap().len(), 1);

        let update = CropUpdate {
            price_per_quintal: Some(-5.0),
            ..CropUpdate::default()
        };
        assert!(portal.update_crop(&admin, crop.id, &update).is_err());

        let update = CropUpdate {
            season: Some("Rabi".to_string()),
            ..CropUpdate::default()
        };
        let updated = portal.update_crop(&admin, crop.id, &update).unwrap();
        assert_eq!(updated.season, "Rabi");
        assert_eq!(updated.fertilizer, "Urea");

        portal.delete_crop(&admin, crop.id).unwrap();
        assert!(portal.crops(&farmer).unwrap().is_empty());
    }

    #[test]
    fn test_crop_profit_filters() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);

        let names = |filter: &ProfitFilter| -> Vec<String> {
            portal
                .crop_profits(&admin, filter)
                .unwrap()
                .into_iter()
                .map(|p| p.crop_name)
                .collect()
        };

        assert_eq!(names(&ProfitFilter::default()).len(), 4);
        assert_eq!(
            names(&ProfitFilter {
                season: Some("Kharif".to_string()),
                ..ProfitFilter::default()
            }),
            vec!["Rice", "Cotton"]
        );
        assert_eq!(
            names(&ProfitFilter {
                search: Some("WHE".to_string()),
                ..ProfitFilter::default()
            }),
            vec!["Wheat"]
        );
        assert_eq!(
            names(&ProfitFilter {
                min_profit: 26_000.0,
                max_profit: 35_000.0,
                ..ProfitFilter::default()
            }),
            vec!["Rice"]
        );
        assert_eq!(
            portal.seasons(&admin).unwrap(),
            vec!["Kharif".to_string(), "Rabi".to_string()]
        );
    }

    #[test]
    fn test_add_crop_profit_rejects_duplicates() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);

        let err = portal
            .add_crop_profit(
                &admin,
                &CropProfit {
                    crop_name: "rice".to_string(),
                    season: "Kharif".to_string(),
                    profit_per_acre: 1.0,
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::CropExists(_)));
    }

    #[test]
    fn test_update_profit_reports_change() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);

        let change = portal.update_profit(&admin, "rice", 33_000.0).unwrap();
        assert_eq!(change.crop_name, "Rice");
        assert!((change.change - 3_000.0).abs() < 1e-9);
        assert!((change.change_pct - 10.0).abs() < 1e-9);

        let from_zero = portal.update_profit(&admin, "Mustard", 5_000.0).unwrap();
        assert!((from_zero.change_pct).abs() < f64::EPSILON);

        assert!(portal.update_profit(&admin, "Maize", 1.0).is_err());
    }

    #[test]
    fn test_describe_and_delete_reference_crop() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);

        portal
            .describe_crop(&admin, "cotton", "Fibre crop for black soil")
            .unwrap();
        let cotton = portal.crop_profit(&admin, "Cotton").unwrap();
        assert_eq!(
            cotton.description.as_deref(),
            Some("Fibre crop for black soil")
        );
        assert!(portal.describe_crop(&admin, "Maize", "x").is_err());

        portal.delete_crop_profit(&admin, "Cotton").unwrap();
        assert!(matches!(
            portal.crop_profit(&admin, "Cotton"),
            Err(Error::NotFound { kind: "crop", .. })
        ));
    }

    #[test]
    fn test_plant_and_summary() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);

        let entry = portal.plant(&farmer, "rice", 2.5).unwrap();
        assert_eq!(entry.crop_name, "Rice");
        assert!((entry.estimated_profit - 75_000.0).abs() < 1e-9);
        portal.plant(&farmer, "Wheat", 1.0).unwrap();

        assert!(portal.plant(&farmer, "Maize", 1.0).is_err());
        assert!(portal.plant(&farmer, "Rice", 0.0).is_err());

        let summary = portal.my_crops(&farmer).unwrap();
        assert_eq!(summary.entries.len(), 2);
        assert!((summary.total_profit - 100_000.0).abs() < 1e-9);
        assert!((summary.total_acres - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_planting_snapshot_survives_profit_change() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);
        portal.plant(&farmer, "Rice", 1.0).unwrap();

        portal.update_profit(&admin, "Rice", 50_000.0).unwrap();
        let summary = portal.my_crops(&farmer).unwrap();
        assert!((summary.total_profit - 30_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_only_own_planting() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let ravi = login_as(&portal, "ravi", Role::Farmer);
        let meena = login_as(&portal, "meena", Role::Farmer);
        let entry = portal.plant(&ravi, "Rice", 1.0).unwrap();
        portal.plant(&ravi, "Wheat", 1.0).unwrap();

        assert!(portal.remove_planting(&meena, entry.id).is_err());
        portal.remove_planting(&ravi, entry.id).unwrap();
        assert_eq!(portal.clear_plantings(&ravi).unwrap(), 1);
        assert_eq!(portal.clear_plantings(&ravi).unwrap(), 0);
    }

    #[test]
    fn test_dashboards() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);
        for _ in 0..7 {
            portal.plant(&farmer, "Wheat", 1.0).unwrap();
        }

        match portal.dashboard(&admin).unwrap() {
            Dashboard::Admin {
                stats,
                recent_farmers,
                crops,
            } => {
                assert_eq!(stats.users, 2);
                assert_eq!(stats.farmer_crops, 7);
                assert_eq!(recent_farmers.len(), 1);
                assert_eq!(crops.len(), 4);
            }
            Dashboard::Farmer { .. } => panic!("expected admin dashboard"),
        }

        match portal.dashboard(&farmer).unwrap() {
            Dashboard::Farmer {
                entries,
                total_profit,
                recent,
                ..
            } => {
                assert_eq!(entries, 7);
                assert!((total_profit - 175_000.0).abs() < 1e-9);
                assert_eq!(recent.len(), 5);
                assert_eq!(recent[4].id, 7);
            }
            Dashboard::Admin { .. } => panic!("expected farmer dashboard"),
        }
    }

    #[test]
    fn test_profit_report() {
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let ravi = login_as(&portal, "ravi", Role::Farmer);
        let meena = login_as(&portal, "meena", Role::Farmer);
        portal.plant(&ravi, "Rice", 1.0).unwrap();
        portal.plant(&meena, "Cotton", 2.0).unwrap();

        let report = portal.profit_report(&admin).unwrap();
        assert_eq!(report.rows[0].username, "meena");
        assert_eq!(report.rows[1].username, "ravi");
        assert!((report.total - 110_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_import_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let portal = portal();

        // Empty portal accepts an anonymous import
        assert!(portal.import_data(None, dir.path()).unwrap().is_empty());

        let farmer = login_as(&portal, "ravi", Role::Farmer);
        assert!(portal.import_data(None, dir.path()).is_err());
        assert!(portal.import_data(Some(&farmer), dir.path()).is_err());
    }

    #[test]
    fn test_export_plantings() {
        let dir = tempfile::tempdir().unwrap();
        let portal = portal();
        let admin = login_as(&portal, "asha", Role::Admin);
        with_reference(&portal, &admin);
        let farmer = login_as(&portal, "ravi", Role::Farmer);
        portal.plant(&farmer, "Rice", 1.0).unwrap();

        let path = dir.path().join("farmer_crops.csv");
        assert_eq!(portal.export_plantings(&admin, &path).unwrap(), 1);
        assert!(portal.export_plantings(&farmer, &path).is_err());
    }
}
