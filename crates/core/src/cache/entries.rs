//! Response entry operations.
//!
//! Entries are whole-response snapshots keyed by request identity within a
//! generation. Writes replace the full row; there is no partial update.

use super::connection::CacheDb;
use super::hash::RequestKey;
use crate::Error;
use crate::http::{Response, ResponseType};
use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};

/// Listing row for one stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub stored_at: String,
}

/// Row image of an entry before decoding.
struct EntryRow {
    response_url: String,
    status: u16,
    status_text: String,
    response_type: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            response_url: row.get(0)?,
            status: row.get(1)?,
            status_text: row.get(2)?,
            response_type: row.get(3)?,
            headers_json: row.get(4)?,
            body: row.get(5)?,
        })
    }

    fn decode(self) -> Result<Response, Error> {
        let response_type = ResponseType::parse(&self.response_type)
            .ok_or_else(|| Error::CorruptEntry(format!("unknown response type: {}", self.response_type)))?;
        let headers: Vec<(String, String)> = serde_json::from_str(&self.headers_json)?;
        Ok(Response {
            url: self.response_url,
            status: self.status,
            status_text: self.status_text,
            headers,
            body: Bytes::from(self.body),
            response_type,
        })
    }
}

/// Encoded form of a response ready for insertion.
struct EncodedEntry {
    key: RequestKey,
    response_url: String,
    status: u16,
    status_text: String,
    response_type: &'static str,
    headers_json: String,
    body: Vec<u8>,
}

impl EncodedEntry {
    fn new(key: &RequestKey, response: &Response) -> Result<Self, Error> {
        Ok(Self {
            key: key.clone(),
            response_url: response.url.clone(),
            status: response.status,
            status_text: response.status_text.clone(),
            response_type: response.response_type.as_str(),
            headers_json: serde_json::to_string(&response.headers)
                .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?,
            body: response.body.to_vec(),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, generation: &str, stored_at: &str) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
            params![generation, stored_at],
        )?;
        conn.execute(
            "INSERT INTO entries (
                generation, key_hash, method, url, response_url, status, status_text,
                response_type, headers_json, body, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(generation, key_hash) DO UPDATE SET
                method = excluded.method,
                url = excluded.url,
                response_url = excluded.response_url,
                status = excluded.status,
                status_text = excluded.status_text,
                response_type = excluded.response_type,
                headers_json = excluded.headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                generation,
                &self.key.hash,
                &self.key.method,
                &self.key.url,
                &self.response_url,
                self.status,
                &self.status_text,
                self.response_type,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

impl CacheDb {
    /// Insert or replace one entry, creating the generation if needed.
    pub async fn put_entry(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        let generation = generation.to_string();
        let entry = EncodedEntry::new(key, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                entry.insert(conn, &generation, &now)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace a batch of entries in a single transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_entries(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        let generation = generation.to_string();
        let encoded = entries
            .iter()
            .map(|(key, response)| EncodedEntry::new(key, response))
            .collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for entry in &encoded {
                    entry.insert(&tx, &generation, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Find an entry in any generation, oldest generation first.
    pub async fn match_entry(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        let hash = key.hash.clone();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.response_url, e.status, e.status_text, e.response_type, e.headers_json, e.body
                     FROM entries e JOIN generations g ON g.name = e.generation
                     WHERE e.key_hash = ?1
                     ORDER BY g.rowid ASC
                     LIMIT 1",
                )?;
                match stmt.query_row(params![hash], EntryRow::from_row) {
                    Ok(row) => row.decode().map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Find an entry within one generation.
    pub async fn match_entry_in(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        let generation = generation.to_string();
        let hash = key.hash.clone();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT response_url, status, status_text, response_type, headers_json, body
                     FROM entries WHERE generation = ?1 AND key_hash = ?2",
                )?;
                match stmt.query_row(params![generation, hash], EntryRow::from_row) {
                    Ok(row) => row.decode().map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List the entries of one generation in URL order.
    pub async fn list_entries(&self, generation: &str) -> Result<Vec<EntrySummary>, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<EntrySummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, stored_at FROM entries
                     WHERE generation = ?1 ORDER BY url ASC, method ASC",
                )?;
                let rows = stmt
                    .query_map(params![generation], |row| {
                        Ok(EntrySummary {
                            method: row.get(0)?,
                            url: row.get(1)?,
                            status: row.get(2)?,
                            stored_at: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn key(url: &str) -> RequestKey {
        RequestKey::get(&Url::parse(url).unwrap())
    }

    fn response(url: &str, body: &'static str) -> Response {
        Response::ok(&Url::parse(url).unwrap(), body).with_header("content-type", "text/plain")
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let k = key("https://app.example/index.html");
        let r = response("https://app.example/index.html", "<html>");

        db.put_entry("app-v1", &k, &r).await.unwrap();

        let found = db.match_entry(&k).await.unwrap().unwrap();
        assert_eq!(found, r);
        assert_eq!(db.generation_names().await.unwrap(), vec!["app-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.match_entry(&key("https://app.example/none")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_whole_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let k = key("https://app.example/data.json");
        db.put_entry("app-v1", &k, &response("https://app.example/data.json", "old"))
            .await
            .unwrap();
        let newer = Response::ok(&Url::parse("https://app.example/data.json").unwrap(), "new");
        db.put_entry("app-v1", &k, &newer).await.unwrap();

        let found = db.match_entry_in("app-v1", &k).await.unwrap().unwrap();
        assert_eq!(found.body, Bytes::from_static(b"new"));
        assert!(found.headers.is_empty());
        assert_eq!(db.list_entries("app-v1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_match_prefers_oldest_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let k = key("https://app.example/app.js");
        db.put_entry("app-v1", &k, &response("https://app.example/app.js", "v1"))
            .await
            .unwrap();
        db.put_entry("app-v2", &k, &response("https://app.example/app.js", "v2"))
            .await
            .unwrap();

        let found = db.match_entry(&k).await.unwrap().unwrap();
        assert_eq!(found.body, Bytes::from_static(b"v1"));
        let in_v2 = db.match_entry_in("app-v2", &k).await.unwrap().unwrap();
        assert_eq!(in_v2.body, Bytes::from_static(b"v2"));
    }

    #[tokio::test]
    async fn test_delete_generation_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let k = key("https://app.example/");
        db.put_entry("app-v1", &k, &response("https://app.example/", "root"))
            .await
            .unwrap();

        db.delete_generation("app-v1").await.unwrap();

        assert!(db.match_entry(&k).await.unwrap().is_none());
        assert!(db.list_entries("app-v1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_entries_batch() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let batch = vec![
            (key("https://app.example/"), response("https://app.example/", "root")),
            (key("https://app.example/manifest.json"), response("https://app.example/manifest.json", "{}")),
        ];
        db.put_entries("app-v1", &batch).await.unwrap();

        let listed = db.list_entries("app-v1").await.unwrap();
        let urls: Vec<&str> = listed.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://app.example/", "https://app.example/manifest.json"]);
        assert!(listed.iter().all(|e| e.status == 200 && e.method == "GET"));
    }

    #[tokio::test]
    async fn test_response_type_preserved() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let k = key("https://cdn.example/lib.js");
        let r = response("https://cdn.example/lib.js", "lib").with_type(ResponseType::Cors);
        db.put_entry("app-v1", &k, &r).await.unwrap();

        let found = db.match_entry(&k).await.unwrap().unwrap();
        assert_eq!(found.response_type, ResponseType::Cors);
    }
}
