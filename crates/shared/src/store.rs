use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Article, StoredArticle};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source TEXT,
        title TEXT,
        url TEXT UNIQUE,
        published TEXT,
        summary TEXT
    )
";

/// Ledger of every article ingested so far, keyed by URL.
///
/// Records are append-only: there is no update or delete path. Uniqueness is
/// enforced by the `UNIQUE` constraint on `url`, so two runs racing on the same
/// file still end up with a single row per URL.
pub struct ArticleStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl ArticleStore {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open article database: {}", path.display()))?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;

        tracing::debug!(path = %path.display(), "opened article store");
        Ok(store)
    }

    /// Open an existing database for reading. Never creates files or tables;
    /// writes through this handle fail.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open article database: {}", path.display()))?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute(SCHEMA, [])
            .context("Failed to create articles table")?;
        Ok(())
    }

    /// Location of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, url: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM articles WHERE url = ?1", [url], |row| row.get(0))
            .optional()
            .context("Failed to look up article")?;
        Ok(found.is_some())
    }

    /// Insert the article unless its URL is already stored.
    ///
    /// Returns `true` when a new row was written. A duplicate URL is not an
    /// error; the existing row is left untouched and `false` is returned.
    pub fn insert_if_absent(&self, article: &Article) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO articles (source, title, url, published, summary)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    article.source,
                    article.title,
                    article.url,
                    article.published,
                    article.summary
                ],
            )
            .with_context(|| format!("Failed to store article: {}", article.url))?;

        Ok(changed == 1)
    }

    pub fn get(&self, url: &str) -> Result<Option<StoredArticle>> {
        self.conn
            .query_row(
                "SELECT id, source, title, url, published, summary FROM articles WHERE url = ?1",
                [url],
                row_to_article,
            )
            .optional()
            .context("Failed to read article")
    }

    /// Most recently ingested articles first.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<StoredArticle>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source, title, url, published, summary
             FROM articles
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], row_to_article)?;

        let mut articles = Vec::new();
        for row in rows {
            articles.push(row.context("Failed to read article row")?);
        }
        Ok(articles)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))
            .context("Failed to count articles")?;
        Ok(count as usize)
    }

    /// Flush and close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close article database")
    }
}

fn row_to_article(row: &Row<'_>) -> rusqlite::Result<StoredArticle> {
    Ok(StoredArticle {
        id: row.get(0)?,
        article: Article {
            source: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            url: row.get(3)?,
            published: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            summary: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        },
    })
}
