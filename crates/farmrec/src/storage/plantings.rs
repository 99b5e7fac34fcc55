//! Queries for farmers' crop entries.

use rusqlite::{params, Row};
use tracing::debug;

use super::{parse_timestamp, Storage};
use crate::error::Result;
use crate::records::FarmerCrop;

const PLANTING_COLUMNS: &str =
    "id, username, crop_name, field_size_acres, profit_per_acre, estimated_profit, recorded_at";

impl Storage {
    /// Record a crop entry, assigning the next id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_planting(&self, entry: &FarmerCrop) -> Result<FarmerCrop> {
        let id = self.next_id("farmer_crops")?;
        self.conn.execute(
            r"
            INSERT INTO farmer_crops
                (id, username, crop_name, field_size_acres, profit_per_acre, estimated_profit, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                id,
                entry.username,
                entry.crop_name,
                entry.field_size_acres,
                entry.profit_per_acre,
                entry.estimated_profit,
                entry.recorded_at.to_rfc3339(),
            ],
        )?;
        debug!(
            "Recorded {} acres of {} for {}",
            entry.field_size_acres, entry.crop_name, entry.username
        );
        Ok(FarmerCrop {
            id,
            ..entry.clone()
        })
    }

    /// Entries recorded by `username`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn plantings_for(&self, username: &str) -> Result<Vec<FarmerCrop>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLANTING_COLUMNS} FROM farmer_crops WHERE username = ?1 ORDER BY id"
        ))?;
        let entries = stmt
            .query_map([username], Self::row_to_planting)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Every crop entry, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_plantings(&self) -> Result<Vec<FarmerCrop>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLANTING_COLUMNS} FROM farmer_crops ORDER BY id"
        ))?;
        let entries = stmt
            .query_map([], Self::row_to_planting)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Delete one entry, but only if it belongs to `username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_planting(&self, id: i64, username: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM farmer_crops WHERE id = ?1 AND username = ?2",
            params![id, username],
        )?;
        Ok(affected > 0)
    }

    /// Delete every entry of `username`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_plantings_for(&self, username: &str) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM farmer_crops WHERE username = ?1", [username])?;
        Ok(affected)
    }

    /// Estimated profit summed per username, sorted by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn profit_by_user(&self) -> Result<Vec<(String, f64)>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT username, SUM(estimated_profit)
            FROM farmer_crops
            GROUP BY username
            ORDER BY username
            ",
        )?;
        let totals = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(totals)
    }

    /// Replace every crop entry, keeping their ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_plantings(&self, entries: &[FarmerCrop]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM farmer_crops", [])?;
        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT OR REPLACE INTO farmer_crops
                    (id, username, crop_name, field_size_acres, profit_per_acre, estimated_profit, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )?;
            for entry in entries {
                stored += stmt.execute(params![
                    entry.id,
                    entry.username,
                    entry.crop_name,
                    entry.field_size_acres,
                    entry.profit_per_acre,
                    entry.estimated_profit,
                    entry.recorded_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn row_to_planting(row: &Row) -> rusqlite::Result<FarmerCrop> {
        let recorded_at: String = row.get(6)?;

        Ok(FarmerCrop {
            id: row.get(0)?,
            username: row.get(1)?,
            crop_name: row.get(2)?,
            field_size_acres: row.get(3)?,
            profit_per_acre: row.get(4)?,
            estimated_profit: row.get(5)?,
            recorded_at: parse_timestamp(&recorded_at),
        })
    }
}
