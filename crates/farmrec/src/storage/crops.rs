//! Queries for the crop catalog.

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::Storage;
use crate::error::Result;
use crate::records::Crop;

const CROP_COLUMNS: &str = "id, name, season, price_per_quintal, fertilizer, water_needs";

impl Storage {
    /// Insert a catalog crop, assigning the next id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_crop(&self, crop: &Crop) -> Result<Crop> {
        let id = self.next_id("crops")?;
        self.conn.execute(
            r"
            INSERT INTO crops (id, name, season, price_per_quintal, fertilizer, water_needs)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                id,
                crop.name,
                crop.season,
                crop.price_per_quintal,
                crop.fertilizer,
                crop.water_needs.map(|w| w.to_string()),
            ],
        )?;
        debug!("Inserted crop {} with id {}", crop.name, id);
        Ok(Crop { id, ..crop.clone() })
    }

    /// Get a catalog crop by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn crop(&self, id: i64) -> Result<Option<Crop>> {
        let crop = self
            .conn
            .query_row(
                &format!("SELECT {CROP_COLUMNS} FROM crops WHERE id = ?1"),
                [id],
                Self::row_to_crop,
            )
            .optional()?;
        Ok(crop)
    }

    /// List the catalog in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_crops(&self) -> Result<Vec<Crop>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CROP_COLUMNS} FROM crops ORDER BY id"))?;
        let crops = stmt
            .query_map([], Self::row_to_crop)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(crops)
    }

    /// Overwrite the catalog crop with `crop.id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_crop(&self, crop: &Crop) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE crops
            SET name = ?2, season = ?3, price_per_quintal = ?4, fertilizer = ?5, water_needs = ?6
            WHERE id = ?1
            ",
            params![
                crop.id,
                crop.name,
                crop.season,
                crop.price_per_quintal,
                crop.fertilizer,
                crop.water_needs.map(|w| w.to_string()),
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a catalog crop by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_crop(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM crops WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Replace the whole catalog with `crops`, keeping their ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_crops(&self, crops: &[Crop]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM crops", [])?;
        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT OR REPLACE INTO crops
                    (id, name, season, price_per_quintal, fertilizer, water_needs)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )?;
            for crop in crops {
                stored += stmt.execute(params![
                    crop.id,
                    crop.name,
                    crop.season,
                    crop.price_per_quintal,
                    crop.fertilizer,
                    crop.water_needs.map(|w| w.to_string()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn row_to_crop(row: &Row) -> rusqlite::Result<Crop> {
        let water: Option<String> = row.get(5)?;
        let water_needs = water
            .filter(|w| !w.trim().is_empty())
            .and_then(|w| match w.parse() {
                Ok(needs) => Some(needs),
                Err(_) => {
                    warn!("Unknown water needs: {}, ignoring", w);
                    None
                }
            });

        Ok(Crop {
            id: row.get(0)?,
            name: row.get(1)?,
            season: row.get(2)?,
            price_per_quintal: row.get(3)?,
            fertilizer: row.get(4)?,
            water_needs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::WaterNeeds;

    fn rice() -> Crop {
        Crop {
            id: 0,
            name: "Rice".to_string(),
            season: "Kharif".to_string(),
            price_per_quintal: Some(2_200.0),
            fertilizer: "Urea".to_string(),
            water_needs: Some(WaterNeeds::High),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let storage = Storage::open_in_memory().unwrap();
        let stored = storage.insert_crop(&rice()).unwrap();

        assert_eq!(stored.id, 1);
        assert_eq!(storage.crop(1).unwrap().unwrap(), stored);
        assert!(storage.crop(9).unwrap().is_none());
    }

    #[test]
    fn test_optional_columns() {
        let storage = Storage::open_in_memory().unwrap();
        let crop = Crop {
            price_per_quintal: None,
            water_needs: None,
            ..rice()
        };
        let stored = storage.insert_crop(&crop).unwrap();

        let fetched = storage.crop(stored.id).unwrap().unwrap();
        assert!(fetched.price_per_quintal.is_none());
        assert!(fetched.water_needs.is_none());
    }

    #[test]
    fn test_unknown_water_needs_reads_as_none() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO crops VALUES (1, 'Bajra', 'Kharif', NULL, 'DAP', 'sometimes')",
                [],
            )
            .unwrap();

        assert!(storage.crop(1).unwrap().unwrap().water_needs.is_none());
    }

    #[test]
    fn test_update_delete_and_replace() {
        let storage = Storage::open_in_memory().unwrap();
        let mut stored = storage.insert_crop(&rice()).unwrap();

        stored.season = "Rabi".to_string();
        assert!(storage.update_crop(&stored).unwrap());
        assert_eq!(storage.crop(stored.id).unwrap().unwrap().season, "Rabi");

        assert!(storage.delete_crop(stored.id).unwrap());
        assert!(storage.list_crops().unwrap().is_empty());

        let imported = Crop { id: 12, ..rice() };
        assert_eq!(storage.replace_crops(&[imported]).unwrap(), 1);
        assert_eq!(storage.list_crops().unwrap()[0].id, 12);
    }
}
