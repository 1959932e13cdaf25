//! Policy repository for support policy lookups

use super::DbPool;
use crate::{Error, Result};

/// One extracted section of the company policy document
#[derive(Debug, Clone)]
pub struct PolicySection {
    pub section_text: String,
    pub source_page: Option<i64>,
}

/// Policy repository
#[derive(Clone)]
pub struct PolicyRepo {
    pool: DbPool,
}

impl PolicyRepo {
    /// Create a new policy repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a policy section
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn insert(&self, section_text: &str, source_page: Option<i64>) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO policies (section_text, source_page) VALUES (?1, ?2)",
            rusqlite::params![section_text, source_page],
        )?;

        Ok(())
    }

    /// Find policy sections whose text mentions a topic
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find_by_topic(&self, topic: &str) -> Result<Vec<PolicySection>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT section_text, source_page FROM policies
             WHERE section_text LIKE ?1 ORDER BY id",
        )?;

        let sections = stmt
            .query_map([format!("%{topic}%")], |row| {
                Ok(PolicySection {
                    section_text: row.get(0)?,
                    source_page: row.get(1)?,
                })
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(sections)
    }

    /// Remove all policy sections (before a re-ingest)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn clear(&self) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("DELETE FROM policies", [])?;
        Ok(())
    }

    /// Count policy sections
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn count(&self) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM policies", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    #[test]
    fn test_find_by_topic() {
        let repo = PolicyRepo::new(init_memory().unwrap());
        repo.insert("Returns are accepted within 30 days of delivery.", Some(1))
            .unwrap();
        repo.insert("Warranty covers manufacturing defects for 1 year.", Some(2))
            .unwrap();

        let sections = repo.find_by_topic("return").unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].source_page, Some(1));

        assert!(repo.find_by_topic("shipping insurance").unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let repo = PolicyRepo::new(init_memory().unwrap());
        repo.insert("Refunds are issued to the original payment method.", None)
            .unwrap();
        assert_eq!(repo.count().unwrap(), 1);

        repo.clear().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }
}
