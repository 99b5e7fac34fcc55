//! `farmrec` - CLI for the farm records manager
//!
//! This binary provides the command-line interface and the interactive menus
//! over the farm records database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use farmrec::cli::{
    CatalogCommand, Cli, Command, ConfigCommand, DataCommand, FarmersCommand, OutputFormat,
    PlantingsCommand, ProfileCommand, ProfitsCommand, RegisterCommand, UsersCommand,
};
use farmrec::menu::Menu;
use farmrec::portal::{
    CropUpdate, Dashboard, FarmerUpdate, NewCrop, NewFarmer, Portal, ProfileUpdate, ProfitFilter,
    Registration, UserUpdate,
};
use farmrec::records::{CropProfit, Session};
use farmrec::table::{self, Table};
use farmrec::{init_logging, Config, Storage};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(database) = &cli.database {
        config.storage.database_path = Some(database.clone());
    }

    // Config commands don't touch the database
    if let Command::Config(cmd) = &cli.command {
        return handle_config(&config, cmd);
    }

    let database = config.database_path();
    let storage = Storage::open(&database)
        .with_context(|| format!("opening database {}", database.display()))?;
    let portal = Portal::new(storage, &config)?;

    match &cli.command {
        Command::Register(cmd) => handle_register(&portal, &cli, cmd),
        Command::Whoami => {
            let session = login(&portal, &cli)?;
            println!("{} ({}) - {}", session.username, session.role, session.name);
            Ok(())
        }
        Command::Dashboard(args) => handle_dashboard(&portal, &login(&portal, &cli)?, args.format),
        Command::Users(cmd) => handle_users(&portal, &login(&portal, &cli)?, cmd),
        Command::Farmers(cmd) => handle_farmers(&portal, &login(&portal, &cli)?, cmd),
        Command::Profile(cmd) => handle_profile(&portal, &login(&portal, &cli)?, cmd),
        Command::Catalog(cmd) => handle_catalog(&portal, &login(&portal, &cli)?, cmd),
        Command::Profits(cmd) => handle_profits(&portal, &login(&portal, &cli)?, cmd),
        Command::Plantings(cmd) => handle_plantings(&portal, &login(&portal, &cli)?, cmd),
        Command::Report(args) => handle_report(&portal, &login(&portal, &cli)?, args.format),
        Command::Data(cmd) => handle_data(&portal, &cli, cmd),
        Command::Menu => {
            let stdin = io::stdin();
            Menu::new(&portal, stdin.lock(), io::stdout()).run()?;
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn login(portal: &Portal, cli: &Cli) -> Result<Session> {
    let (Some(user), Some(password)) = (&cli.user, &cli.password) else {
        bail!("this command needs --user and --password (or FARMREC_USER and FARMREC_PASSWORD)");
    };
    Ok(portal.login(user, password)?)
}

/// Print `value` as JSON, or the table built from it.
fn emit<T, F>(format: OutputFormat, value: &T, table: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> Table,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print!("{}", table(value)),
    }
    Ok(())
}

fn handle_register(portal: &Portal, cli: &Cli, cmd: &RegisterCommand) -> Result<()> {
    let Some(password) = cli.password.clone() else {
        bail!("registering needs --password (or FARMREC_PASSWORD)");
    };
    let registration = Registration {
        username: cmd.username.clone(),
        name: cmd.name.clone(),
        confirm_password: cmd.confirm.clone().unwrap_or_else(|| password.clone()),
        password,
        role: Some(cmd.role.into()),
        location: cmd.location.clone(),
        contact: cmd.contact.clone(),
    };
    let user = portal.register(&registration)?;
    println!("Registered {} as {}.", user.username, user.role);
    Ok(())
}

fn handle_dashboard(portal: &Portal, session: &Session, format: OutputFormat) -> Result<()> {
    let dashboard = portal.dashboard(session)?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    match dashboard {
        Dashboard::Admin {
            stats,
            recent_farmers,
            crops,
        } => {
            println!("Admin Dashboard");
            println!("===============");
            println!("Users:           {}", stats.users);
            println!("Farmers:         {}", stats.farmers);
            println!("Catalog crops:   {}", stats.crops);
            println!("Reference crops: {}", stats.crop_profits);
            println!("Crop entries:    {}", stats.farmer_crops);
            println!();
            println!("Recent farmers");
            print!("{}", table::farmers(&recent_farmers));
            println!();
            println!("Crops");
            print!("{}", table::crop_profits(&crops));
        }
        Dashboard::Farmer {
            entries,
            total_profit,
            total_acres,
            recent,
        } => {
            println!("Welcome, {}", session.name);
            println!("===============");
            println!("Crop entries:     {entries}");
            println!("Total profit:     {}", table::money(total_profit));
            println!("Total acres:      {}", table::acres(total_acres));
            println!();
            println!("Recent entries");
            print!("{}", table::plantings(&recent));
        }
    }
    Ok(())
}

fn handle_users(portal: &Portal, session: &Session, cmd: &UsersCommand) -> Result<()> {
    match cmd {
        UsersCommand::List(args) => {
            let users = portal.users(session)?;
            emit(args.format, &users, |u| table::users(u))?;
        }
        UsersCommand::Update {
            username,
            new_username,
            name,
            role,
            new_password,
        } => {
            let update = UserUpdate {
                username: new_username.clone(),
                name: name.clone(),
                role: role.map(Into::into),
                password: new_password.clone(),
            };
            let user = portal.update_user(session, username, &update)?;
            println!("Updated user {}.", user.username);
        }
        UsersCommand::Delete { username } => {
            portal.delete_user(session, username)?;
            println!("Deleted user {username}.");
        }
    }
    Ok(())
}

fn handle_farmers(portal: &Portal, session: &Session, cmd: &FarmersCommand) -> Result<()> {
    match cmd {
        FarmersCommand::List(args) => {
            let farmers = portal.farmers(session)?;
            emit(args.format, &farmers, |f| table::farmers(f))?;
        }
        FarmersCommand::Add {
            name,
            location,
            contact,
            username,
        } => {
            let farmer = portal.add_farmer(
                session,
                &NewFarmer {
                    name: name.clone(),
                    location: location.clone(),
                    contact: contact.clone(),
                    username: username.clone(),
                },
            )?;
            println!("Added farmer {} with id {}.", farmer.name, farmer.id);
        }
        FarmersCommand::Update {
            id,
            name,
            location,
            contact,
            username,
        } => {
            let update = FarmerUpdate {
                name: name.clone(),
                location: location.clone(),
                contact: contact.clone(),
                username: username.clone(),
            };
            let farmer = portal.update_farmer(session, *id, &update)?;
            println!("Updated farmer {} ({}).", farmer.id, farmer.name);
        }
        FarmersCommand::Delete { id } => {
            portal.delete_farmer(session, *id)?;
            println!("Deleted farmer {id}.");
        }
    }
    Ok(())
}

fn handle_profile(portal: &Portal, session: &Session, cmd: &ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Show(args) => match portal.profile(session)? {
            Some(farmer) => emit(args.format, &farmer, |f| table::farmers(std::slice::from_ref(f)))?,
            None => println!("No profile yet. Use 'farmrec profile save' to create one."),
        },
        ProfileCommand::Save {
            name,
            location,
            contact,
        } => {
            let update = ProfileUpdate {
                name: name.clone(),
                location: location.clone(),
                contact: contact.clone(),
            };
            let farmer = portal.save_profile(session, &update)?;
            println!("Saved profile for {}.", farmer.name);
        }
        ProfileCommand::DeleteAccount { yes } => {
            if !yes {
                println!("This deletes your account, farmer record and crop entries.");
                println!("Use --yes to confirm.");
                return Ok(());
            }
            portal.delete_account(session)?;
            println!("Account {} deleted.", session.username);
        }
    }
    Ok(())
}

fn handle_catalog(portal: &Portal, session: &Session, cmd: &CatalogCommand) -> Result<()> {
    match cmd {
        CatalogCommand::List(args) => {
            let crops = portal.crops(session)?;
            emit(args.format, &crops, |c| table::crops(c))?;
        }
        CatalogCommand::Add {
            name,
            season,
            price,
            fertilizer,
            water,
        } => {
            let crop = portal.add_crop(
                session,
                &NewCrop {
                    name: name.clone(),
                    season: season.clone(),
                    price_per_quintal: *price,
                    fertilizer: fertilizer.clone(),
                    water_needs: water.map(Into::into),
                },
            )?;
            println!("Added {} with id {}.", crop.name, crop.id);
        }
        CatalogCommand::Update {
            id,
            name,
            season,
            price,
            fertilizer,
            water,
        } => {
            let update = CropUpdate {
                name: name.clone(),
                season: season.clone(),
                price_per_quintal: *price,
                fertilizer: fertilizer.clone(),
                water_needs: water.map(Into::into),
            };
            let crop = portal.update_crop(session, *id, &update)?;
            println!("Updated {} ({}).", crop.id, crop.name);
        }
        CatalogCommand::Delete { id } => {
            portal.delete_crop(session, *id)?;
            println!("Deleted crop {id}.");
        }
    }
    Ok(())
}

fn handle_profits(portal: &Portal, session: &Session, cmd: &ProfitsCommand) -> Result<()> {
    match cmd {
        ProfitsCommand::List {
            season,
            search,
            min,
            max,
            format,
        } => {
            let filter = ProfitFilter {
                season: season.clone(),
                search: search.clone(),
                min_profit: *min,
                max_profit: *max,
            };
            let profits = portal.crop_profits(session, &filter)?;
            emit(*format, &profits, |p| table::crop_profits(p))?;
        }
        ProfitsCommand::Seasons => {
            for season in portal.seasons(session)? {
                println!("{season}");
            }
        }
        ProfitsCommand::Show { crop, format } => {
            let profit = portal.crop_profit(session, crop)?;
            if *format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&profit)?);
            } else {
                println!("Crop:            {}", profit.crop_name);
                println!("Season:          {}", profit.season);
                println!("Profit per acre: {}", table::money(profit.profit_per_acre));
                println!(
                    "Description:     {}",
                    profit.description.as_deref().unwrap_or("(none)")
                );
            }
        }
        ProfitsCommand::Add {
            name,
            season,
            profit,
            description,
        } => {
            let stored = portal.add_crop_profit(
                session,
                &CropProfit {
                    crop_name: name.clone(),
                    season: season.clone(),
                    profit_per_acre: *profit,
                    description: description.clone(),
                },
            )?;
            println!("Added {}.", stored.crop_name);
        }
        ProfitsCommand::Update { crop, profit } => {
            let change = portal.update_profit(session, crop, *profit)?;
            println!(
                "{}: {} -> {} ({:+.2}, {:+.1}%)",
                change.crop_name,
                table::money(change.old),
                table::money(change.new),
                change.change,
                change.change_pct
            );
        }
        ProfitsCommand::Delete { crop } => {
            portal.delete_crop_profit(session, crop)?;
            println!("Deleted {crop}.");
        }
        ProfitsCommand::Describe { crop, description } => {
            portal.describe_crop(session, crop, description)?;
            println!("Description saved.");
        }
    }
    Ok(())
}

fn handle_plantings(portal: &Portal, session: &Session, cmd: &PlantingsCommand) -> Result<()> {
    match cmd {
        PlantingsCommand::Add { crop, acres } => {
            let entry = portal.plant(session, crop, *acres)?;
            println!(
                "Recorded {} acres of {}, estimated profit {}.",
                table::acres(entry.field_size_acres),
                entry.crop_name,
                table::money(entry.estimated_profit)
            );
        }
        PlantingsCommand::List(args) => {
            let summary = portal.my_crops(session)?;
            emit(args.format, &summary, |s| table::plantings(&s.entries))?;
            if args.format == OutputFormat::Table {
                println!(
                    "Total: {} acres, estimated profit {}",
                    table::acres(summary.total_acres),
                    table::money(summary.total_profit)
                );
            }
        }
        PlantingsCommand::Remove { id } => {
            portal.remove_planting(session, *id)?;
            println!("Removed entry {id}.");
        }
        PlantingsCommand::Clear { yes } => {
            if !yes {
                println!("This removes all of your crop entries. Use --yes to confirm.");
                return Ok(());
            }
            let removed = portal.clear_plantings(session)?;
            println!("Removed {removed} entries.");
        }
        PlantingsCommand::Export { path } => {
            let written = portal.export_plantings(session, path)?;
            println!("Wrote {written} entries to {}.", path.display());
        }
    }
    Ok(())
}

fn handle_report(portal: &Portal, session: &Session, format: OutputFormat) -> Result<()> {
    let report = portal.profit_report(session)?;
    emit(format, &report, |r| {
        let mut grid = Table::new(["Username", "Estimated Profit"]);
        for row in &r.rows {
            grid.push([row.username.clone(), table::money(row.total_profit)]);
        }
        grid
    })?;
    if format == OutputFormat::Table {
        println!("Total: {}", table::money(report.total));
    }
    Ok(())
}

fn handle_data(portal: &Portal, cli: &Cli, cmd: &DataCommand) -> Result<()> {
    let transfers = match cmd {
        DataCommand::Import { dir } => {
            // An empty database may be seeded without logging in
            let session = if cli.user.is_some() {
                Some(login(portal, cli)?)
            } else {
                None
            };
            portal
                .import_data(session.as_ref(), dir)
                .with_context(|| format!("importing {}", dir.display()))?
        }
        DataCommand::Export { dir } => {
            let session = login(portal, cli)?;
            portal
                .export_data(&session, dir)
                .with_context(|| format!("exporting to {}", dir.display()))?
        }
    };

    let mut grid = Table::new(["File", "Rows"]);
    for transfer in &transfers {
        grid.push([transfer.file.to_string(), transfer.rows.to_string()]);
    }
    print!("{grid}");
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let rules = &config.validation;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:        {}", config.database_path().display());
                println!();
                println!("[Validation]");
                println!("  Min name length:      {}", rules.min_name_length);
                println!("  Contact digits:       {}", rules.contact_digits);
                println!("  Password min length:  {}", rules.password_min_length);
                println!("  Password specials:    {}", rules.password_specials);
                println!("  Min field size:       {}", rules.min_field_size_acres);
                println!();
                println!("[Display]");
                println!("  Recent limit:         {}", config.display.recent_limit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.clone().unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
