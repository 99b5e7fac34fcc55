//! Interactive text menus.
//!
//! Runs the numbered main, admin and farmer menus over any reader and writer
//! pair, so the same loop serves a terminal and a scripted test. Operation
//! errors are printed and the menu is shown again. End of input logs out and
//! exits.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::portal::{
    CropUpdate, Dashboard, FarmerUpdate, NewCrop, NewFarmer, Portal, ProfileUpdate, ProfitFilter,
    Registration, UserUpdate,
};
use crate::records::{CropProfit, Role, Session, WaterNeeds};
use crate::table;

const MAIN_MENU: &[&str] = &["Register", "Login", "Exit"];

const ADMIN_MENU: &[&str] = &[
    "Dashboard",
    "View users",
    "Update user",
    "Delete user",
    "View farmers",
    "Add farmer",
    "Update farmer",
    "Delete farmer",
    "View crop profits",
    "Add crop profit",
    "Update profit per acre",
    "Delete crop profit",
    "Describe crop",
    "View crop catalog",
    "Add catalog crop",
    "Update catalog crop",
    "Delete catalog crop",
    "Profit report",
    "Export crop entries",
    "Logout",
];

const FARMER_MENU: &[&str] = &[
    "Dashboard",
    "View crop profits",
    "Crop details",
    "Add my crop",
    "View my crops",
    "Remove a crop entry",
    "Clear my crops",
    "View profile",
    "Update profile",
    "Delete my account",
    "Logout",
];

/// What the caller should do after one menu action.
enum Flow {
    Stay,
    Leave,
}

/// An interactive session over `input` and `output`.
#[derive(Debug)]
pub struct Menu<'a, R, W> {
    portal: &'a Portal,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    /// Create a menu session.
    pub fn new(portal: &'a Portal, input: R, output: W) -> Self {
        Self {
            portal,
            input,
            output,
        }
    }

    /// Run the main menu until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(choice) = self.choose("Farm Records Portal", MAIN_MENU)? else {
                break;
            };
            match choice {
                1 => {
                    let outcome = self.register();
                    self.report(outcome)?;
                }
                2 => match self.login() {
                    Ok(Some(session)) => {
                        writeln!(self.output, "Welcome, {}!", session.name)?;
                        let ended = match session.role {
                            Role::Admin => self.admin_loop(&session)?,
                            Role::Farmer => self.farmer_loop(&session)?,
                        };
                        if ended {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => self.show_error(&e)?,
                },
                _ => break,
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    /// Returns `true` when input ended inside the menu.
    fn admin_loop(&mut self, session: &Session) -> Result<bool> {
        loop {
            let Some(choice) = self.choose("Admin Menu", ADMIN_MENU)? else {
                return Ok(true);
            };
            let outcome = match choice {
                1 => self.show_dashboard(session),
                2 => self.show_users(session),
                3 => self.update_user(session),
                4 => self.delete_user(session),
                5 => self.show_farmers(session),
                6 => self.add_farmer(session),
                7 => self.update_farmer(session),
                8 => self.delete_farmer(session),
                9 => self.show_crop_profits(session),
                10 => self.add_crop_profit(session),
                11 => self.update_profit(session),
                12 => self.delete_crop_profit(session),
                13 => self.describe_crop(session),
                14 => self.show_catalog(session),
                15 => self.add_catalog_crop(session),
                16 => self.update_catalog_crop(session),
                17 => self.delete_catalog_crop(session),
                18 => self.show_profit_report(session),
                19 => self.export_plantings(session),
                _ => Ok(Flow::Leave),
            };
            if let Some(Flow::Leave) = self.report(outcome)? {
                writeln!(self.output, "Logged out.")?;
                return Ok(false);
            }
        }
    }

    /// Returns `true` when input ended inside the menu.
    fn farmer_loop(&mut self, session: &Session) -> Result<bool> {
        loop {
            let Some(choice) = self.choose("Farmer Menu", FARMER_MENU)? else {
                return Ok(true);
            };
            let outcome = match choice {
                1 => self.show_dashboard(session),
                2 => self.show_crop_profits(session),
                3 => self.crop_details(session),
                4 => self.plant(session),
                5 => self.show_my_crops(session),
                6 => self.remove_planting(session),
                7 => self.clear_plantings(session),
                8 => self.show_profile(session),
                9 => self.update_profile(session),
                10 => self.delete_account(session),
                _ => Ok(Flow::Leave),
            };
            if let Some(Flow::Leave) = self.report(outcome)? {
                writeln!(self.output, "Logged out.")?;
                return Ok(false);
            }
        }
    }

    // === Input helpers ===

    /// Read one trimmed line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Ask for an optional value. Blank answers become `None`.
    fn ask_optional(&mut self, label: &str) -> Result<Option<String>> {
        let answer = self.ask(&format!("{label} (blank to keep)"))?;
        Ok(Some(answer).filter(|a| !a.is_empty()))
    }

    fn ask_amount(&mut self, field: &'static str, label: &str) -> Result<f64> {
        let answer = self.ask(label)?;
        self.portal.validator().parse_amount(field, &answer)
    }

    fn ask_id(&mut self, label: &str) -> Result<i64> {
        let answer = self.ask(label)?;
        answer
            .parse()
            .map_err(|_| Error::validation("id", format!("'{answer}' is not a number")))
    }

    fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(&format!("{label} (y/n)"))?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    /// Show a numbered menu and read a valid choice, or `None` at end of input.
    fn choose(&mut self, title: &str, items: &[&str]) -> Result<Option<usize>> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "=== {title} ===")?;
            for (i, item) in items.iter().enumerate() {
                writeln!(self.output, "{}. {item}", i + 1)?;
            }
            write!(self.output, "Enter your choice: ")?;
            self.output.flush()?;

            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=items.len()).contains(&n) => {
                    debug!(menu = title, choice = n, "Menu choice");
                    return Ok(Some(n));
                }
                _ => writeln!(self.output, "Invalid choice, try again.")?,
            }
        }
    }

    /// Print an operation error, passing other outcomes through.
    ///
    /// I/O failures on the terminal itself end the session.
    fn report(&mut self, outcome: Result<Flow>) -> Result<Option<Flow>> {
        match outcome {
            Ok(flow) => Ok(Some(flow)),
            Err(Error::Io(e)) => Err(Error::Io(e)),
            Err(e) => {
                self.show_error(&e)?;
                Ok(None)
            }
        }
    }

    fn show_error(&mut self, error: &Error) -> Result<()> {
        if !error.is_validation_error() && !error.is_auth_error() {
            warn!(%error, "Menu action failed");
        }
        writeln!(self.output, "Error: {error}")?;
        Ok(())
    }

    fn done(&mut self, message: &str) -> Result<Flow> {
        writeln!(self.output, "{message}")?;
        Ok(Flow::Stay)
    }

    fn print_table(&mut self, table: &table::Table) -> Result<Flow> {
        write!(self.output, "{table}")?;
        Ok(Flow::Stay)
    }

    // === Main menu ===

    fn register(&mut self) -> Result<Flow> {
        let username = self.ask("Username")?;
        let name = self.ask("Full name")?;
        let password = self.ask("Password")?;
        let confirm_password = self.ask("Confirm password")?;
        let role: Role = self.ask("Role (admin/farmer)")?.parse()?;
        let (location, contact) = if role == Role::Farmer {
            (Some(self.ask("Location")?), Some(self.ask("Contact number")?))
        } else {
            (None, None)
        };

        let user = self.portal.register(&Registration {
            username,
            name,
            password,
            confirm_password,
            role: Some(role),
            location,
            contact,
        })?;
        self.done(&format!("Registered {} as {}.", user.username, user.role))
    }

    /// `Ok(None)` at end of input.
    fn login(&mut self) -> Result<Option<Session>> {
        write!(self.output, "Username: ")?;
        self.output.flush()?;
        let Some(username) = self.read_line()? else {
            return Ok(None);
        };
        let password = self.ask("Password")?;
        self.portal.login(&username, &password).map(Some)
    }

    // === Shared ===

    fn show_dashboard(&mut self, session: &Session) -> Result<Flow> {
        match self.portal.dashboard(session)? {
            Dashboard::Admin {
                stats,
                recent_farmers,
                crops,
            } => {
                writeln!(self.output, "Users:           {}", stats.users)?;
                writeln!(self.output, "Farmers:         {}", stats.farmers)?;
                writeln!(self.output, "Reference crops: {}", stats.crop_profits)?;
                writeln!(self.output, "Crop entries:    {}", stats.farmer_crops)?;
                writeln!(self.output, "\nRecent farmers:")?;
                self.print_table(&table::farmers(&recent_farmers))?;
                writeln!(self.output, "\nCrops:")?;
                self.print_table(&table::crop_profits(&crops))
            }
            Dashboard::Farmer {
                entries,
                total_profit,
                total_acres,
                recent,
            } => {
                writeln!(self.output, "Crop entries:     {entries}")?;
                writeln!(self.output, "Total profit:     {}", table::money(total_profit))?;
                writeln!(self.output, "Total acres:      {}", table::acres(total_acres))?;
                writeln!(self.output, "\nRecent entries:")?;
                self.print_table(&table::plantings(&recent))
            }
        }
    }

    fn show_crop_profits(&mut self, session: &Session) -> Result<Flow> {
        let seasons = self.portal.seasons(session)?;
        if !seasons.is_empty() {
            writeln!(self.output, "Seasons: {}", seasons.join(", "))?;
        }
        let season = self.ask_optional("Season")?;
        let search = self.ask_optional("Search crop name")?;
        let profits = self.portal.crop_profits(
            session,
            &ProfitFilter {
                season,
                search,
                ..ProfitFilter::default()
            },
        )?;
        self.print_table(&table::crop_profits(&profits))
    }

    // === Admin ===

    fn show_users(&mut self, session: &Session) -> Result<Flow> {
        let users = self.portal.users(session)?;
        self.print_table(&table::users(&users))
    }

    fn update_user(&mut self, session: &Session) -> Result<Flow> {
        let username = self.ask("Username to update")?;
        let update = UserUpdate {
            username: self.ask_optional("New username")?,
            name: self.ask_optional("New name")?,
            role: self
                .ask_optional("New role (admin/farmer)")?
                .map(|r| r.parse::<Role>())
                .transpose()?,
            password: self.ask_optional("New password")?,
        };
        let user = self.portal.update_user(session, &username, &update)?;
        self.done(&format!("Updated user {}.", user.username))
    }

    fn delete_user(&mut self, session: &Session) -> Result<Flow> {
        let username = self.ask("Username to delete")?;
        if !self.confirm(&format!("Delete user {username}?"))? {
            return self.done("Cancelled.");
        }
        self.portal.delete_user(session, &username)?;
        self.done(&format!("Deleted user {username}."))
    }

    fn show_farmers(&mut self, session: &Session) -> Result<Flow> {
        let farmers = self.portal.farmers(session)?;
        self.print_table(&table::farmers(&farmers))
    }

    fn add_farmer(&mut self, session: &Session) -> Result<Flow> {
        let farmer = NewFarmer {
            name: self.ask("Farmer name")?,
            contact: self.ask("Contact number")?,
            location: self.ask("Location")?,
            username: self.ask_optional("Username")?,
        };
        let stored = self.portal.add_farmer(session, &farmer)?;
        self.done(&format!("Added farmer {} with id {}.", stored.name, stored.id))
    }

    fn update_farmer(&mut self, session: &Session) -> Result<Flow> {
        let id = self.ask_id("Farmer id")?;
        let update = FarmerUpdate {
            name: self.ask_optional("New name")?,
            location: self.ask_optional("New location")?,
            contact: self.ask_optional("New contact")?,
            username: self.ask_optional("New username")?,
        };
        let farmer = self.portal.update_farmer(session, id, &update)?;
        self.done(&format!("Updated farmer {}.", farmer.name))
    }

    fn delete_farmer(&mut self, session: &Session) -> Result<Flow> {
        let id = self.ask_id("Farmer id")?;
        self.portal.delete_farmer(session, id)?;
        self.done(&format!("Deleted farmer {id}."))
    }

    fn add_crop_profit(&mut self, session: &Session) -> Result<Flow> {
        let crop_name = self.ask("Crop name")?;
        let season = self.ask("Season")?;
        let profit_per_acre = self.ask_amount("profit_per_acre", "Profit per acre")?;
        let description = self.ask_optional("Description")?;
        let stored = self.portal.add_crop_profit(
            session,
            &CropProfit {
                crop_name,
                season,
                profit_per_acre,
                description,
            },
        )?;
        self.done(&format!("Added {}.", stored.crop_name))
    }

    fn update_profit(&mut self, session: &Session) -> Result<Flow> {
        let crop_name = self.ask("Crop name")?;
        let profit = self.ask_amount("profit_per_acre", "New profit per acre")?;
        let change = self.portal.update_profit(session, &crop_name, profit)?;
        self.done(&format!(
            "{}: {} -> {} ({:+.2}, {:+.1}%)",
            change.crop_name,
            table::money(change.old),
            table::money(change.new),
            change.change,
            change.change_pct
        ))
    }

    fn delete_crop_profit(&mut self, session: &Session) -> Result<Flow> {
        let crop_name = self.ask("Crop name")?;
        self.portal.delete_crop_profit(session, &crop_name)?;
        self.done(&format!("Deleted {crop_name}."))
    }

    fn describe_crop(&mut self, session: &Session) -> Result<Flow> {
        let crop_name = self.ask("Crop name")?;
        let description = self.ask("Description")?;
        self.portal.describe_crop(session, &crop_name, &description)?;
        self.done("Description saved.")
    }

    fn show_catalog(&mut self, session: &Session) -> Result<Flow> {
        let crops = self.portal.crops(session)?;
        self.print_table(&table::crops(&crops))
    }

    fn add_catalog_crop(&mut self, session: &Session) -> Result<Flow> {
        let name = self.ask("Crop name")?;
        let season = self.ask("Season")?;
        let price_per_quintal = match self.ask_optional("Price per quintal")? {
            Some(text) => Some(
                self.portal
                    .validator()
                    .parse_amount("price_per_quintal", &text)?,
            ),
            None => None,
        };
        let fertilizer = self.ask("Fertilizer")?;
        let water_needs = self
            .ask_optional("Water needs (Low/Medium/High)")?
            .map(|w| w.parse::<WaterNeeds>())
            .transpose()?;
        let crop = self.portal.add_crop(
            session,
            &NewCrop {
                name,
                season,
                price_per_quintal,
                fertilizer,
                water_needs,
            },
        )?;
        self.done(&format!("Added {} with id {}.", crop.name, crop.id))
    }

    fn update_catalog_crop(&mut self, session: &Session) -> Result<Flow> {
        let id = self.ask_id("Crop id")?;
        let name = self.ask_optional("New name")?;
        let season = self.ask_optional("New season")?;
        let price_per_quintal = match self.ask_optional("New price per quintal")? {
            Some(text) => Some(
                self.portal
                    .validator()
                    .parse_amount("price_per_quintal", &text)?,
            ),
            None => None,
        };
        let fertilizer = self.ask_optional("New fertilizer")?;
        let water_needs = self
            .ask_optional("New water needs (Low/Medium/High)")?
            .map(|w| w.parse::<WaterNeeds>())
            .transpose()?;
        let crop = self.portal.update_crop(
            session,
            id,
            &CropUpdate {
                name,
                season,
                price_per_quintal,
                fertilizer,
                water_needs,
            },
        )?;
        self.done(&format!("Updated {}.", crop.name))
    }

    fn delete_catalog_crop(&mut self, session: &Session) -> Result<Flow> {
        let id = self.ask_id("Crop id")?;
        self.portal.delete_crop(session, id)?;
        self.done(&format!("Deleted crop {id}."))
    }

    fn show_profit_report(&mut self, session: &Session) -> Result<Flow> {
        let report = self.portal.profit_report(session)?;
        let mut grid = table::Table::new(["Username", "Estimated Profit"]);
        for row in &report.rows {
            grid.push([row.username.clone(), table::money(row.total_profit)]);
        }
        self.print_table(&grid)?;
        self.done(&format!("Total: {}", table::money(report.total)))
    }

    fn export_plantings(&mut self, session: &Session) -> Result<Flow> {
        let path = self.ask("Output file")?;
        if path.is_empty() {
            return Err(Error::validation("path", "is required"));
        }
        let written = self
            .portal
            .export_plantings(session, std::path::Path::new(&path))?;
        self.done(&format!("Wrote {written} entries to {path}."))
    }

    // === Farmer ===

    fn crop_details(&mut self, session: &Session) -> Result<Flow> {
        let crop_name = self.ask("Crop name")?;
        let crop = self.portal.crop_profit(session, &crop_name)?;
        writeln!(self.output, "Crop:            {}", crop.crop_name)?;
        writeln!(self.output, "Season:          {}", crop.season)?;
        writeln!(
            self.output,
            "Profit per acre: {}",
            table::money(crop.profit_per_acre)
        )?;
        let description = crop.description.as_deref().unwrap_or("(none)");
        self.done(&format!("Description:     {description}"))
    }

    fn plant(&mut self, session: &Session) -> Result<Flow> {
        let crop_name = self.ask("Crop name")?;
        let acres = self.ask_amount("field_size", "Field size (acres)")?;
        let entry = self.portal.plant(session, &crop_name, acres)?;
        self.done(&format!(
            "Recorded {} acres of {}, estimated profit {}.",
            table::acres(entry.field_size_acres),
            entry.crop_name,
            table::money(entry.estimated_profit)
        ))
    }

    fn show_my_crops(&mut self, session: &Session) -> Result<Flow> {
        let summary = self.portal.my_crops(session)?;
        self.print_table(&table::plantings(&summary.entries))?;
        self.done(&format!(
            "Total: {} acres, estimated profit {}",
            table::acres(summary.total_acres),
            table::money(summary.total_profit)
        ))
    }

    fn remove_planting(&mut self, session: &Session) -> Result<Flow> {
        let id = self.ask_id("Entry id")?;
        self.portal.remove_planting(session, id)?;
        self.done(&format!("Removed entry {id}."))
    }

    fn clear_plantings(&mut self, session: &Session) -> Result<Flow> {
        if !self.confirm("Remove all your crop entries?")? {
            return self.done("Cancelled.");
        }
        let removed = self.portal.clear_plantings(session)?;
        self.done(&format!("Removed {removed} entries."))
    }

    fn show_profile(&mut self, session: &Session) -> Result<Flow> {
        match self.portal.profile(session)? {
            Some(farmer) => self.print_table(&table::farmers(&[farmer])),
            None => self.done("No profile yet. Choose 'Update profile' to create one."),
        }
    }

    fn update_profile(&mut self, session: &Session) -> Result<Flow> {
        let update = ProfileUpdate {
            name: self.ask_optional("Name")?,
            location: self.ask_optional("Location")?,
            contact: self.ask_optional("Contact number")?,
        };
        let farmer = self.portal.save_profile(session, &update)?;
        self.done(&format!("Saved profile for {}.", farmer.name))
    }

    fn delete_account(&mut self, session: &Session) -> Result<Flow> {
        if !self.confirm("Delete your account and all your records?")? {
            return self.done("Cancelled.");
        }
        self.portal.delete_account(session)?;
        writeln!(self.output, "Account deleted.")?;
        Ok(Flow::Leave)
    }
}
