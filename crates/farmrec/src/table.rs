//! Plain-text grid tables for terminal output.

use std::fmt;

use crate::records::{Crop, CropProfit, Farmer, FarmerCrop, User};

/// Text shown in place of a table with no rows.
pub const EMPTY: &str = "(no records)";

/// A grid of text cells with a header row.
///
/// ```
/// use farmrec::table::Table;
///
/// let mut table = Table::new(["Crop", "Season"]);
/// table.push(["Rice", "Kharif"]);
///
/// let rendered = table.to_string();
/// assert!(rendered.contains("| Rice | Kharif |"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty cells.
    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = row.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len().max(cells.len()), String::new());
        self.rows.push(cells);
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|i| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .chain(self.headers.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    for width in widths {
        write!(f, "+{}", "-".repeat(width + 2))?;
    }
    writeln!(f, "+")
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        write!(f, "| {cell:<width$} ")?;
    }
    writeln!(f, "|")
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "{EMPTY}");
        }

        let widths = self.widths();
        write_rule(f, &widths)?;
        write_row(f, &widths, &self.headers)?;
        write_rule(f, &widths)?;
        for row in &self.rows {
            write_row(f, &widths, row)?;
        }
        write_rule(f, &widths)
    }
}

/// Format a money amount with two decimals.
#[must_use]
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Format a field size or acreage total with two decimals.
#[must_use]
pub fn acres(value: f64) -> String {
    format!("{value:.2}")
}

/// Format an optional cell, leaving it blank when absent.
#[must_use]
pub fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Accounts, without credentials.
#[must_use]
pub fn users(users: &[User]) -> Table {
    let mut table = Table::new(["Id", "Username", "Name", "Role", "Registered"]);
    for user in users {
        table.push([
            user.id.to_string(),
            user.username.clone(),
            user.name.clone(),
            user.role.to_string(),
            user.registered_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    table
}

/// Farmer records.
#[must_use]
pub fn farmers(farmers: &[Farmer]) -> Table {
    let mut table = Table::new(["Id", "Name", "Location", "Contact", "Username"]);
    for farmer in farmers {
        table.push([
            farmer.id.to_string(),
            farmer.name.clone(),
            farmer.location.clone(),
            farmer.contact.clone(),
            optional(farmer.username.as_deref()),
        ]);
    }
    table
}

/// The crop catalog.
#[must_use]
pub fn crops(crops: &[Crop]) -> Table {
    let mut table = Table::new([
        "Id",
        "Crop",
        "Season",
        "Price/Quintal",
        "Fertilizer",
        "Water Needs",
    ]);
    for crop in crops {
        table.push([
            crop.id.to_string(),
            crop.name.clone(),
            crop.season.clone(),
            optional(crop.price_per_quintal.map(money)),
            crop.fertilizer.clone(),
            optional(crop.water_needs),
        ]);
    }
    table
}

/// Reference crops with their profit per acre.
#[must_use]
pub fn crop_profits(profits: &[CropProfit]) -> Table {
    let mut table = Table::new(["Crop", "Season", "Profit/Acre"]);
    for profit in profits {
        table.push([
            profit.crop_name.clone(),
            profit.season.clone(),
            money(profit.profit_per_acre),
        ]);
    }
    table
}

/// Farmers' crop entries.
#[must_use]
pub fn plantings(entries: &[FarmerCrop]) -> Table {
    let mut table = Table::new([
        "Id",
        "Username",
        "Crop",
        "Acres",
        "Profit/Acre",
        "Estimated Profit",
    ]);
    for entry in entries {
        table.push([
            entry.id.to_string(),
            entry.username.clone(),
            entry.crop_name.clone(),
            acres(entry.field_size_acres),
            money(entry.profit_per_acre),
            money(entry.estimated_profit),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let table = Table::new(["Name"]);
        assert!(table.is_empty());
        assert_eq!(table.to_string(), "(no records)\n");
    }

    #[test]
    fn test_columns_fit_widest_cell() {
        let mut table = Table::new(["Id", "Name"]);
        table.push(["1", "Ravi"]);
        table.push(["12", "Al"]);

        let expected = "\
+----+------+
| Id | Name |
+----+------+
| 1  | Ravi |
| 12 | Al   |
+----+------+
";
        assert_eq!(table.to_string(), expected);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(["A", "B"]);
        table.push(["x"]);

        assert!(table.to_string().contains("| x |   |"));
    }

    #[test]
    fn test_money_and_optional() {
        assert_eq!(money(62_500.0), "62500.00");
        assert_eq!(optional(Some(3)), "3");
        assert_eq!(optional::<f64>(None), "");
    }

    #[test]
    fn test_acres_hides_float_noise() {
        assert_eq!(acres(0.1 + 0.2), "0.30");
        assert_eq!(acres(2.5), "2.50");
    }

    #[test]
    fn test_crop_profits_table() {
        let rendered = crop_profits(&[CropProfit {
            crop_name: "Wheat".to_string(),
            season: "Rabi".to_string(),
            profit_per_acre: 25_000.0,
            description: None,
        }])
        .to_string();

        assert!(rendered.contains("| Crop  | Season | Profit/Acre |"));
        assert!(rendered.contains("| Wheat | Rabi   | 25000.00    |"));
    }

    #[test]
    fn test_farmers_table_blank_username() {
        let rendered = farmers(&[Farmer {
            id: 4,
            username: None,
            name: "Meena".to_string(),
            location: "Pune".to_string(),
            contact: "9123456780".to_string(),
        }])
        .to_string();

        assert!(rendered.contains("| 4  | Meena | Pune     | 9123456780 |          |"));
    }
}
