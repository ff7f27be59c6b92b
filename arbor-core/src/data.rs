use crate::error::{StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Titles are cut to this many characters before they are stored.
pub const TITLE_MAX_CHARS: usize = 200;

const PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA temp_store = MEMORY;
    PRAGMA foreign_keys = ON;
    PRAGMA case_sensitive_like = ON;
";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS page_content (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id INTEGER NULL,
        content TEXT,
        title VARCHAR(200) NULL,
        url VARCHAR(2048) NOT NULL CHECK(length(url) <= 2048),
        CONSTRAINT fk_parent_page_content
            FOREIGN KEY (parent_id)
            REFERENCES page_content (id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_page_content_parent ON page_content(parent_id);
    CREATE INDEX IF NOT EXISTS idx_page_content_root_url ON page_content(url) WHERE parent_id IS NULL;
";

const TREE_QUERY: &str = "
    WITH RECURSIVE page_tree (id, depth, url, title) AS (
        SELECT id, 0, url, title
        FROM page_content
        WHERE parent_id IS NULL AND url LIKE ?1
        UNION ALL
        SELECT p.id, pt.depth + 1, p.url, p.title
        FROM page_content p
        JOIN page_tree pt ON p.parent_id = pt.id
    )
    SELECT id, depth, url, title FROM page_tree
    ORDER BY depth, id
    LIMIT ?2
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreStatus {
    Open,
    Closed,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Open => "open",
            StoreStatus::Closed => "closed",
        }
    }
}

/// One stored page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub title: Option<String>,
    pub url: String,
}

/// One row of a reconstructed tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRow {
    pub id: i64,
    pub depth: u32,
    pub url: String,
    pub title: Option<String>,
}

/// Handle on the page store.
///
/// Every operation fails with [`StoreError::NotConnected`] once the handle
/// has been closed; nothing reconnects implicitly.
pub struct Database {
    conn: Option<Connection>,
}

impl Database {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(PRAGMAS)?;
        Ok(Database { conn: Some(conn) })
    }

    pub fn status(&self) -> StoreStatus {
        match self.conn {
            Some(_) => StoreStatus::Open,
            None => StoreStatus::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == StoreStatus::Open
    }

    /// Close the connection. Closing twice is a no-op.
    pub fn close(&mut self) -> StoreResult<()> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, e)| StoreError::Sqlite(e)),
            None => Ok(()),
        }
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or(StoreError::NotConnected)
    }

    pub fn ensure_open(&self) -> StoreResult<()> {
        self.conn().map(|_| ())
    }

    pub fn ensure_schema(&self) -> StoreResult<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert one page and return its id. The parent, if any, must already
    /// be stored.
    pub fn insert(
        &self,
        parent_id: Option<i64>,
        content: &str,
        title: Option<&str>,
        url: &str,
    ) -> StoreResult<i64> {
        let conn = self.conn()?;
        let title = title.map(truncate_title);

        conn.execute(
            "INSERT INTO page_content (parent_id, content, title, url) VALUES (?1, ?2, ?3, ?4)",
            params![parent_id, content, title, url],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Id of the root stored for exactly `url`, if any.
    pub fn find_root(&self, url: &str) -> StoreResult<Option<i64>> {
        let mut stmt = self.conn()?.prepare(
            "SELECT id FROM page_content WHERE parent_id IS NULL AND url = ?1 ORDER BY id LIMIT 1",
        )?;

        let result = stmt.query_row(params![url], |row| row.get(0)).optional()?;
        Ok(result)
    }

    /// Delete the root stored for exactly `url` together with its subtree.
    /// Returns the number of roots removed.
    pub fn delete_root(&self, url: &str) -> StoreResult<usize> {
        let deleted = self.conn()?.execute(
            "DELETE FROM page_content WHERE parent_id IS NULL AND url = ?1",
            params![url],
        )?;
        Ok(deleted)
    }

    /// Walk the trees whose root URL matches the `LIKE` pattern, shallowest
    /// rows first, returning at most `max_rows` rows in total.
    pub fn reconstruct_tree(&self, root_url_pattern: &str, max_rows: u32) -> StoreResult<Vec<TreeRow>> {
        let mut stmt = self.conn()?.prepare(TREE_QUERY)?;

        let rows = stmt
            .query_map(params![root_url_pattern, i64::from(max_rows)], |row| {
                Ok(TreeRow {
                    id: row.get(0)?,
                    depth: row.get(1)?,
                    url: row.get(2)?,
                    title: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn nodes(&self) -> StoreResult<Vec<PageNode>> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT id, parent_id, content, title, url FROM page_content ORDER BY id")?;

        let nodes = stmt
            .query_map([], |row| {
                Ok(PageNode {
                    id: row.get(0)?,
                    parent_id: row.get(1)?,
                    content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    title: row.get(3)?,
                    url: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(nodes)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM page_content", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(TITLE_MAX_CHARS).collect()
}
