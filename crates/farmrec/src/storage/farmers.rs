//! Queries for the `farmers` table.

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::Storage;
use crate::error::Result;
use crate::records::Farmer;

const FARMER_COLUMNS: &str = "id, username, name, location, contact";

impl Storage {
    /// Insert a farmer record, assigning the next id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_farmer(&self, farmer: &Farmer) -> Result<Farmer> {
        let id = self.next_id("farmers")?;
        self.conn.execute(
            r"
            INSERT INTO farmers (id, username, name, location, contact)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                id,
                farmer.username,
                farmer.name,
                farmer.location,
                farmer.contact
            ],
        )?;
        debug!("Inserted farmer {} with id {}", farmer.name, id);
        Ok(Farmer {
            id,
            ..farmer.clone()
        })
    }

    /// Get a farmer record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn farmer(&self, id: i64) -> Result<Option<Farmer>> {
        let farmer = self
            .conn
            .query_row(
                &format!("SELECT {FARMER_COLUMNS} FROM farmers WHERE id = ?1"),
                [id],
                Self::row_to_farmer,
            )
            .optional()?;
        Ok(farmer)
    }

    /// Get the first farmer record linked to `username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn farmer_by_username(&self, username: &str) -> Result<Option<Farmer>> {
        let farmer = self
            .conn
            .query_row(
                &format!(
                    "SELECT {FARMER_COLUMNS} FROM farmers WHERE username = ?1 ORDER BY id LIMIT 1"
                ),
                [username],
                Self::row_to_farmer,
            )
            .optional()?;
        Ok(farmer)
    }

    /// Check whether a farmer with exactly this name exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn farmer_name_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM farmers WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List all farmer records in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_farmers(&self) -> Result<Vec<Farmer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {FARMER_COLUMNS} FROM farmers ORDER BY id"))?;
        let farmers = stmt
            .query_map([], Self::row_to_farmer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(farmers)
    }

    /// The most recently added farmer records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_farmers(&self, limit: usize) -> Result<Vec<Farmer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FARMER_COLUMNS} FROM farmers ORDER BY id DESC LIMIT ?1"
        ))?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut farmers = stmt
            .query_map([limit_i64], Self::row_to_farmer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        farmers.reverse();
        Ok(farmers)
    }

    /// Overwrite the farmer record with `farmer.id`.
    ///
    /// Returns `true` if a row was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_farmer(&self, farmer: &Farmer) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE farmers SET username = ?2, name = ?3, location = ?4, contact = ?5
            WHERE id = ?1
            ",
            params![
                farmer.id,
                farmer.username,
                farmer.name,
                farmer.location,
                farmer.contact
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a farmer record by id.
    ///
    /// Returns `true` if a record was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_farmer(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM farmers WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Delete every farmer record linked to `username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_farmers_for(&self, username: &str) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM farmers WHERE username = ?1", [username])?;
        Ok(affected)
    }

    /// Replace the whole table with `farmers`, keeping their ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_farmers(&self, farmers: &[Farmer]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM farmers", [])?;
        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT OR REPLACE INTO farmers (id, username, name, location, contact)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )?;
            for farmer in farmers {
                stored += stmt.execute(params![
                    farmer.id,
                    farmer.username,
                    farmer.name,
                    farmer.location,
                    farmer.contact
                ])?;
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn row_to_farmer(row: &Row) -> rusqlite::Result<Farmer> {
        Ok(Farmer {
            id: row.get(0)?,
            username: row.get(1)?,
            name: row.get(2)?,
            location: row.get(3)?,
            contact: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farmer(name: &str, username: Option<&str>) -> Farmer {
        Farmer {
            id: 0,
            username: username.map(str::to_string),
            name: name.to_string(),
            location: "Nashik".to_string(),
            contact: "9876543210".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let storage = Storage::open_in_memory().unwrap();
        let stored = storage.insert_farmer(&farmer("Ravi", Some("ravi"))).unwrap();

        assert_eq!(stored.id, 1);
        let fetched = storage.farmer(1).unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert!(storage.farmer(2).unwrap().is_none());
    }

    #[test]
    fn test_unlinked_farmer() {
        let storage = Storage::open_in_memory().unwrap();
        let stored = storage.insert_farmer(&farmer("Meena", None)).unwrap();

        assert!(storage.farmer(stored.id).unwrap().unwrap().username.is_none());
    }

    #[test]
    fn test_farmer_by_username_and_name() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_farmer(&farmer("Ravi", Some("ravi"))).unwrap();

        assert_eq!(
            storage.farmer_by_username("ravi").unwrap().unwrap().name,
            "Ravi"
        );
        assert!(storage.farmer_by_username("meena").unwrap().is_none());
        assert!(storage.farmer_name_exists("Ravi").unwrap());
        assert!(!storage.farmer_name_exists("ravi").unwrap());
    }

    #[test]
    fn test_recent_farmers_keeps_order() {
        let storage = Storage::open_in_memory().unwrap();
        for name in ["A", "B", "C", "D"] {
            storage.insert_farmer(&farmer(name, None)).unwrap();
        }

        let recent: Vec<String> = storage
            .recent_farmers(2)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(recent, vec!["C", "D"]);
    }

    #[test]
    fn test_update_and_delete() {
        let storage = Storage::open_in_memory().unwrap();
        let mut stored = storage.insert_farmer(&farmer("Ravi", Some("ravi"))).unwrap();

        stored.location = "Pune".to_string();
        assert!(storage.update_farmer(&stored).unwrap());
        assert_eq!(storage.farmer(stored.id).unwrap().unwrap().location, "Pune");

        assert!(storage.delete_farmer(stored.id).unwrap());
        assert!(!storage.delete_farmer(stored.id).unwrap());
    }

    #[test]
    fn test_delete_farmers_for() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_farmer(&farmer("Ravi", Some("ravi"))).unwrap();
        storage.insert_farmer(&farmer("Ravi 2", Some("ravi"))).unwrap();
        storage.insert_farmer(&farmer("Meena", Some("meena"))).unwrap();

        assert_eq!(storage.delete_farmers_for("ravi").unwrap(), 2);
        assert_eq!(storage.list_farmers().unwrap().len(), 1);
    }
}
