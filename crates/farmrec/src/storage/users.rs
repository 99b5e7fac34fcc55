//! Queries for the `users` table.

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::{parse_timestamp, Storage};
use crate::error::Result;
use crate::records::{Role, User};

const USER_COLUMNS: &str = "id, username, name, role, password_hash, salt, registered_at";

impl Storage {
    /// Insert a user, assigning the next id.
    ///
    /// The `id` of `user` is ignored. Returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// username is already taken.
    pub fn insert_user(&self, user: &User) -> Result<User> {
        let id = self.next_id("users")?;
        self.conn.execute(
            r"
            INSERT INTO users (id, username, name, role, password_hash, salt, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                id,
                user.username,
                user.name,
                user.role.to_string(),
                user.password_hash,
                user.salt,
                user.registered_at.to_rfc3339(),
            ],
        )?;
        debug!("Inserted user {} with id {}", user.username, id);
        Ok(User { id, ..user.clone() })
    }

    /// Find a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// List all users in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Count registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_users(&self) -> Result<i64> {
        self.count_rows("users")
    }

    /// Overwrite every column of the user with `user.id`.
    ///
    /// Returns `true` if a row was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_user(&self, user: &User) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE users
            SET username = ?2, name = ?3, role = ?4, password_hash = ?5, salt = ?6
            WHERE id = ?1
            ",
            params![
                user.id,
                user.username,
                user.name,
                user.role.to_string(),
                user.password_hash,
                user.salt,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Point farmer records and crop entries at a renamed user.
    ///
    /// Returns the number of rows changed across both tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn rename_user_links(&self, old: &str, new: &str) -> Result<usize> {
        let farmers = self.conn.execute(
            "UPDATE farmers SET username = ?2 WHERE username = ?1",
            params![old, new],
        )?;
        let plantings = self.conn.execute(
            "UPDATE farmer_crops SET username = ?2 WHERE username = ?1",
            params![old, new],
        )?;
        Ok(farmers + plantings)
    }

    /// Delete a user by username.
    ///
    /// Returns `true` if a user was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_user(&self, username: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM users WHERE username = ?1", [username])?;
        Ok(affected > 0)
    }

    /// Replace the whole table with `users`, keeping their ids.
    ///
    /// Rows whose username repeats an earlier row are skipped. Returns the
    /// number of rows stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_users(&self, users: &[User]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM users", [])?;
        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT OR IGNORE INTO users
                    (id, username, name, role, password_hash, salt, registered_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )?;
            for user in users {
                let inserted = stmt.execute(params![
                    user.id,
                    user.username,
                    user.name,
                    user.role.to_string(),
                    user.password_hash,
                    user.salt,
                    user.registered_at.to_rfc3339(),
                ])?;
                if inserted == 0 {
                    warn!(username = %user.username, id = user.id, "Skipping duplicate user");
                }
                stored += inserted;
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        let role_str: String = row.get(3)?;
        let registered_at: String = row.get(6)?;

        let role = role_str.parse().unwrap_or_else(|_| {
            warn!("Unknown role: {}, defaulting to farmer", role_str);
            Role::Farmer
        });

        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            name: row.get(2)?,
            role,
            password_hash: row.get(4)?,
            salt: row.get(5)?,
            registered_at: parse_timestamp(&registered_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::error::Error;

    fn sample_user(username: &str, role: Role) -> User {
        User {
            id: 0,
            username: username.to_string(),
            name: format!("{username} name"),
            role,
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let storage = Storage::open_in_memory().unwrap();

        let first = storage.insert_user(&sample_user("asha", Role::Admin)).unwrap();
        let second = storage
            .insert_user(&sample_user("ravi", Role::Farmer))
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_insert_duplicate_username_fails() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&sample_user("asha", Role::Admin)).unwrap();

        let err = storage
            .insert_user(&sample_user("asha", Role::Farmer))
            .unwrap_err();
        assert!(matches!(err, Error::DatabaseQuery(_)));
    }

    #[test]
    fn test_user_by_username() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&sample_user("asha", Role::Admin)).unwrap();

        let user = storage.user_by_username("asha").unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(storage.user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_update_and_delete() {
        let storage = Storage::open_in_memory().unwrap();
        let mut user = storage.insert_user(&sample_user("asha", Role::Farmer)).unwrap();

        user.role = Role::Admin;
        user.name = "Asha Patil".to_string();
        assert!(storage.update_user(&user).unwrap());

        let stored = storage.user_by_username("asha").unwrap().unwrap();
        assert_eq!(stored.name, "Asha Patil");
        assert_eq!(stored.role, Role::Admin);

        assert!(storage.delete_user("asha").unwrap());
        assert!(!storage.delete_user("asha").unwrap());
        assert_eq!(storage.count_users().unwrap(), 0);
    }

    #[test]
    fn test_next_id_follows_max_after_delete() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&sample_user("a", Role::Farmer)).unwrap();
        storage.insert_user(&sample_user("b", Role::Farmer)).unwrap();
        storage.delete_user("b").unwrap();

        let c = storage.insert_user(&sample_user("c", Role::Farmer)).unwrap();
        assert_eq!(c.id, 2);
    }

    #[test]
    fn test_replace_users_skips_duplicates() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_user(&sample_user("old", Role::Admin)).unwrap();

        let mut a = sample_user("asha", Role::Admin);
        a.id = 7;
        let mut dup = sample_user("asha", Role::Farmer);
        dup.id = 8;

        assert_eq!(storage.replace_users(&[a, dup]).unwrap(), 1);
        let users = storage.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, 7);
    }

    #[test]
    fn test_unknown_role_defaults_to_farmer() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO users VALUES (1, 'x', 'X', 'owner', 'h', 's', '2024-01-01T00:00:00+00:00')",
                [],
            )
            .unwrap();

        let user = storage.user_by_username("x").unwrap().unwrap();
        assert_eq!(user.role, Role::Farmer);
    }
}
