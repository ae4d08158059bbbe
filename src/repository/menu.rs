//! Menu repository for SQLite persistence.
//!
//! One row per place, overwritten on every acquisition. The upsert is
//! atomic per key; concurrent writers for the same place race with
//! last-writer-wins semantics, which is acceptable for advisory menu data.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use super::{parse_datetime, Result};
use crate::models::{MenuRecord, ScrapeMethod, ScrapeStatus, StructuredMenu};

/// Outcome of a cache lookup.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// A successful record within the TTL window.
    Fresh(MenuRecord),
    /// A record exists but is stale or failed; re-acquisition required.
    Stale(MenuRecord),
    /// No record for this place.
    Absent,
}

/// SQLite-backed menu repository.
pub struct MenuRepository {
    db_path: PathBuf,
}

impl MenuRepository {
    /// Create a new menu repository, initializing the schema if needed.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS restaurant_menus (
                place_id TEXT PRIMARY KEY,
                menu_url TEXT,
                menu_data TEXT NOT NULL,
                menu_summary TEXT NOT NULL,
                scrape_timestamp TEXT NOT NULL,
                scrape_method TEXT NOT NULL,
                scrape_status TEXT NOT NULL,
                error_message TEXT,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Point lookup by place id.
    pub fn get(&self, place_id: &str) -> Result<Option<MenuRecord>> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                "SELECT place_id, menu_url, menu_data, menu_summary, scrape_timestamp,
                        scrape_method, scrape_status, error_message, updated_at
                 FROM restaurant_menus WHERE place_id = ?1",
                params![place_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Cache lookup with the freshness rule applied at `now`.
    pub fn lookup(&self, place_id: &str, now: DateTime<Utc>) -> Result<CacheLookup> {
        Ok(match self.get(place_id)? {
            Some(record) if record.is_fresh(now) => CacheLookup::Fresh(record),
            Some(record) => CacheLookup::Stale(record),
            None => CacheLookup::Absent,
        })
    }

    /// Write-through upsert keyed by place id. Overwrites unconditionally.
    pub fn upsert(&self, record: &MenuRecord) -> Result<()> {
        let conn = self.connect()?;
        let menu_data = serde_json::to_string(&record.menu_data)?;
        conn.execute(
            "INSERT INTO restaurant_menus
                (place_id, menu_url, menu_data, menu_summary, scrape_timestamp,
                 scrape_method, scrape_status, error_message, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(place_id) DO UPDATE SET
                menu_url = excluded.menu_url,
                menu_data = excluded.menu_data,
                menu_summary = excluded.menu_summary,
                scrape_timestamp = excluded.scrape_timestamp,
                scrape_method = excluded.scrape_method,
                scrape_status = excluded.scrape_status,
                error_message = excluded.error_message,
                updated_at = excluded.updated_at",
            params![
                record.place_id,
                record.menu_url,
                menu_data,
                record.menu_summary,
                record.scrape_timestamp.to_rfc3339(),
                record.scrape_method.as_str(),
                record.scrape_status.as_str(),
                record.error_message,
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<i64> {
        let conn = self.connect()?;
        let count = conn.query_row("SELECT COUNT(*) FROM restaurant_menus", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MenuRecord> {
    let menu_data_json: String = row.get(2)?;
    let menu_data: StructuredMenu = serde_json::from_str(&menu_data_json).unwrap_or_else(|e| {
        warn!("Unparseable menu_data in store, treating as empty: {}", e);
        StructuredMenu::default()
    });

    let method_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let scrape_timestamp: String = row.get(4)?;
    let updated_at: String = row.get(8)?;

    Ok(MenuRecord {
        place_id: row.get(0)?,
        menu_url: row.get(1)?,
        menu_data,
        menu_summary: row.get(3)?,
        scrape_timestamp: parse_datetime(&scrape_timestamp),
        scrape_method: ScrapeMethod::from_str(&method_str).unwrap_or(ScrapeMethod::Error),
        scrape_status: ScrapeStatus::from_str(&status_str).unwrap_or(ScrapeStatus::Failed),
        error_message: row.get(7)?,
        updated_at: parse_datetime(&updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MenuItem, MenuSection};
    use chrono::Duration;

    fn test_repo() -> (tempfile::TempDir, MenuRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = MenuRepository::new(&dir.path().join("menus.db")).unwrap();
        (dir, repo)
    }

    fn sample_menu() -> StructuredMenu {
        StructuredMenu {
            sections: vec![MenuSection {
                name: "Entrees".to_string(),
                items: vec![MenuItem {
                    name: "Pad Thai".to_string(),
                    price: Some("$12.50".to_string()),
                    description: Some("rich and savory".to_string()),
                }],
            }],
        }
    }

    #[test]
    fn test_roundtrip() {
        let (_dir, repo) = test_repo();

        let record = MenuRecord::success(
            "place-1".to_string(),
            Some("https://example.com/menu".to_string()),
            sample_menu(),
            "Thai food, moderately priced.".to_string(),
            ScrapeMethod::HeuristicHtml,
        );
        repo.upsert(&record).unwrap();

        let loaded = repo.get("place-1").unwrap().unwrap();
        assert_eq!(loaded.place_id, "place-1");
        assert_eq!(loaded.menu_data, record.menu_data);
        assert_eq!(loaded.scrape_method, ScrapeMethod::HeuristicHtml);
        assert_eq!(loaded.scrape_status, ScrapeStatus::Success);
        assert_eq!(loaded.menu_summary, "Thai food, moderately priced.");
    }

    #[test]
    fn test_upsert_overwrites() {
        let (_dir, repo) = test_repo();

        let first = MenuRecord::failed(
            "place-1".to_string(),
            None,
            "Unable to extract menu data from website".to_string(),
        );
        repo.upsert(&first).unwrap();

        let second = MenuRecord::success(
            "place-1".to_string(),
            Some("https://example.com/menu".to_string()),
            sample_menu(),
            "Summary".to_string(),
            ScrapeMethod::StructuredHtml,
        );
        repo.upsert(&second).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let loaded = repo.get("place-1").unwrap().unwrap();
        assert_eq!(loaded.scrape_status, ScrapeStatus::Success);
        assert!(loaded.error_message.is_none());
    }

    #[test]
    fn test_lookup_freshness() {
        let (_dir, repo) = test_repo();
        let now = Utc::now();

        assert!(matches!(
            repo.lookup("missing", now).unwrap(),
            CacheLookup::Absent
        ));

        let mut record = MenuRecord::success(
            "place-1".to_string(),
            None,
            sample_menu(),
            "Summary".to_string(),
            ScrapeMethod::StructuredHtml,
        );
        record.scrape_timestamp = now - Duration::days(7) + Duration::seconds(1);
        repo.upsert(&record).unwrap();
        assert!(matches!(
            repo.lookup("place-1", now).unwrap(),
            CacheLookup::Fresh(_)
        ));

        record.scrape_timestamp = now - Duration::days(7) - Duration::seconds(1);
        repo.upsert(&record).unwrap();
        assert!(matches!(
            repo.lookup("place-1", now).unwrap(),
            CacheLookup::Stale(_)
        ));
    }

    #[test]
    fn test_failed_records_are_stale() {
        let (_dir, repo) = test_repo();

        let record = MenuRecord::failed(
            "place-1".to_string(),
            None,
            "Menu URL not found. Restaurant may not have an online menu.".to_string(),
        );
        repo.upsert(&record).unwrap();

        // A failed record never counts as fresh, so a retry re-acquires.
        assert!(matches!(
            repo.lookup("place-1", Utc::now()).unwrap(),
            CacheLookup::Stale(_)
        ));
    }
}
