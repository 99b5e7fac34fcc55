//! Queries for the crop-profit reference table and crop descriptions.

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::Storage;
use crate::error::{Error, Result};
use crate::records::CropProfit;

const PROFIT_SELECT: &str = r"
    SELECT p.crop_name, p.season, p.profit_per_acre, d.description
    FROM crop_profits p
    LEFT JOIN crop_details d ON d.crop_name = p.crop_name
";

impl Storage {
    /// Add a reference crop. Names are unique ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CropExists`] if the name is taken, or an error if the
    /// database operation fails.
    pub fn insert_crop_profit(&self, profit: &CropProfit) -> Result<()> {
        let inserted = self.conn.execute(
            r"
            INSERT OR IGNORE INTO crop_profits (crop_name, season, profit_per_acre)
            VALUES (?1, ?2, ?3)
            ",
            params![profit.crop_name, profit.season, profit.profit_per_acre],
        )?;
        if inserted == 0 {
            return Err(Error::CropExists(profit.crop_name.clone()));
        }
        if let Some(description) = &profit.description {
            self.set_description(&profit.crop_name, description)?;
        }
        debug!("Inserted reference crop {}", profit.crop_name);
        Ok(())
    }

    /// Look up a reference crop by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn crop_profit(&self, crop_name: &str) -> Result<Option<CropProfit>> {
        let profit = self
            .conn
            .query_row(
                &format!("{PROFIT_SELECT} WHERE p.crop_name = ?1"),
                [crop_name],
                Self::row_to_crop_profit,
            )
            .optional()?;
        Ok(profit)
    }

    /// List every reference crop in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_crop_profits(&self) -> Result<Vec<CropProfit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROFIT_SELECT} ORDER BY p.rowid"))?;
        let profits = stmt
            .query_map([], Self::row_to_crop_profit)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(profits)
    }

    /// Distinct seasons in the reference table, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn seasons(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT season FROM crop_profits GROUP BY season ORDER BY MIN(rowid)",
        )?;
        let seasons = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(seasons)
    }

    /// Set the profit per acre of a reference crop.
    ///
    /// Returns `true` if the crop exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_profit(&self, crop_name: &str, profit_per_acre: f64) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE crop_profits SET profit_per_acre = ?2 WHERE crop_name = ?1",
            params![crop_name, profit_per_acre],
        )?;
        Ok(affected > 0)
    }

    /// Delete a reference crop and its description.
    ///
    /// Returns `true` if the crop existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_crop_profit(&self, crop_name: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM crop_profits WHERE crop_name = ?1", [crop_name])?;
        self.conn
            .execute("DELETE FROM crop_details WHERE crop_name = ?1", [crop_name])?;
        Ok(affected > 0)
    }

    /// Insert or replace the description of a crop.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_description(&self, crop_name: &str, description: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO crop_details (crop_name, description) VALUES (?1, ?2)
            ON CONFLICT(crop_name) DO UPDATE SET description = excluded.description
            ",
            params![crop_name, description],
        )?;
        Ok(())
    }

    /// Every stored description as `(crop name, description)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_crop_details(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT crop_name, description FROM crop_details ORDER BY rowid")?;
        let details = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(details)
    }

    /// Replace the reference table. Repeated names keep the first row.
    ///
    /// Descriptions carried on the rows are ignored; use
    /// [`Storage::replace_crop_details`] for those.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_crop_profits(&self, profits: &[CropProfit]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM crop_profits", [])?;
        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT OR IGNORE INTO crop_profits (crop_name, season, profit_per_acre)
                VALUES (?1, ?2, ?3)
                ",
            )?;
            for profit in profits {
                let inserted =
                    stmt.execute(params![profit.crop_name, profit.season, profit.profit_per_acre])?;
                if inserted == 0 {
                    warn!(crop = %profit.crop_name, "Skipping duplicate reference crop");
                }
                stored += inserted;
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    /// Replace every crop description. Later rows win on repeated names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_crop_details(&self, details: &[(String, String)]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM crop_details", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO crop_details (crop_name, description) VALUES (?1, ?2)",
            )?;
            for (crop_name, description) in details {
                stmt.execute(params![crop_name, description])?;
            }
        }
        tx.commit()?;
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crop_details", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn row_to_crop_profit(row: &Row) -> rusqlite::Result<CropProfit> {
        Ok(CropProfit {
            crop_name: row.get(0)?,
            season: row.get(1)?,
            profit_per_acre: row.get(2)?,
            description: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str, season: &str, profit: f64) -> CropProfit {
        CropProfit {
            crop_name: name.to_string(),
            season: season.to_string(),
            profit_per_acre: profit,
            description: None,
        }
    }

    #[test]
    fn test_insert_and_lookup_ignores_case() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .insert_crop_profit(&reference("Wheat", "Rabi", 25_000.0))
            .unwrap();

        let found = storage.crop_profit("wHEAT").unwrap().unwrap();
        assert_eq!(found.crop_name, "Wheat");
        assert!(found.description.is_none());
        assert!(storage.crop_profit("Rice").unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_is_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .insert_crop_profit(&reference("Wheat", "Rabi", 25_000.0))
            .unwrap();

        let err = storage
            .insert_crop_profit(&reference("WHEAT", "Rabi", 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::CropExists(name) if name == "WHEAT"));
    }

    #[test]
    fn test_description_joins_in() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .insert_crop_profit(&reference("Rice", "Kharif", 30_000.0))
            .unwrap();
        storage.set_description("rice", "Paddy grown in standing water").unwrap();

        let found = storage.crop_profit("Rice").unwrap().unwrap();
        assert_eq!(
            found.description.as_deref(),
            Some("Paddy grown in standing water")
        );

        storage.set_description("Rice", "Staple grain").unwrap();
        assert_eq!(storage.list_crop_details().unwrap().len(), 1);
    }

    #[test]
    fn test_seasons_are_distinct_in_first_seen_order() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .insert_crop_profit(&reference("Rice", "Kharif", 30_000.0))
            .unwrap();
        storage
            .insert_crop_profit(&reference("Wheat", "Rabi", 25_000.0))
            .unwrap();
        storage
            .insert_crop_profit(&reference("Cotton", "Kharif", 40_000.0))
            .unwrap();

        assert_eq!(storage.seasons().unwrap(), vec!["Kharif", "Rabi"]);
    }

    #[test]
    fn test_set_profit_and_delete() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .insert_crop_profit(&reference("Rice", "Kharif", 30_000.0))
            .unwrap();
        storage.set_description("Rice", "Paddy").unwrap();

        assert!(storage.set_profit("rice", 32_000.0).unwrap());
        assert!(!storage.set_profit("Maize", 1.0).unwrap());
        let found = storage.crop_profit("Rice").unwrap().unwrap();
        assert!((found.profit_per_acre - 32_000.0).abs() < 1e-9);

        assert!(storage.delete_crop_profit("RICE").unwrap());
        assert!(storage.list_crop_profits().unwrap().is_empty());
        assert!(storage.list_crop_details().unwrap().is_empty());
    }

    #[test]
    fn test_replace_skips_repeated_names() {
        let storage = Storage::open_in_memory().unwrap();
        let rows = vec![
            reference("Rice", "Kharif", 30_000.0),
            reference("rice", "Kharif", 1.0),
            reference("Gram", "Rabi", 18_000.0),
        ];

        assert_eq!(storage.replace_crop_profits(&rows).unwrap(), 2);
        let names: Vec<String> = storage
            .list_crop_profits()
            .unwrap()
            .into_iter()
            .map(|p| p.crop_name)
            .collect();
        assert_eq!(names, vec!["Rice", "Gram"]);
    }
}
