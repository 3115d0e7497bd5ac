//! Generation bookkeeping: open, enumerate, delete.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;

impl CacheDb {
    /// Create the generation if it does not exist yet.
    ///
    /// Returns true when a new generation was created.
    pub async fn open_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let created = conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(created == 1)
            })
            .await
            .map_err(Error::from)
    }

    /// All generation names, oldest first.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and, through the cascade, all of its entries.
    ///
    /// Returns false if no such generation existed.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted == 1)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.open_generation("app-v1").await.unwrap());
        assert!(!db.open_generation("app-v1").await.unwrap());
        assert_eq!(db.generation_names().await.unwrap(), vec!["app-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_names_in_creation_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("b-v2").await.unwrap();
        db.open_generation("a-v1").await.unwrap();
        assert_eq!(db.generation_names().await.unwrap(), vec!["b-v2".to_string(), "a-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("app-v1").await.unwrap();
        assert!(db.delete_generation("app-v1").await.unwrap());
        assert!(!db.delete_generation("app-v1").await.unwrap());
        assert!(db.generation_names().await.unwrap().is_empty());
    }
}
