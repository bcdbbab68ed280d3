//! Category repository: the hierarchical `event_category` taxonomy.
//!
//! # Invariants
//! - Slugs are unique across the taxonomy.
//! - A parent must exist before a child can reference it.
//! - `assign_event_categories` replaces the full set in one transaction.

use crate::model::category::{Category, CategoryId, NewCategory};
use crate::model::event::EventId;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

pub trait CategoryRepository {
    fn create_category(&self, category: &NewCategory) -> RepoResult<Category>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    /// Lists all categories ordered by label.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Replaces every category link of one event.
    fn assign_event_categories(&self, event_id: EventId, ids: &[CategoryId]) -> RepoResult<()>;
    fn categories_for_event(&self, event_id: EventId) -> RepoResult<Vec<Category>>;
}

pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["events", "categories", "event_categories"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, category: &NewCategory) -> RepoResult<Category> {
        let (label, slug) = category.normalized()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(parent_id) = category.parent_id {
            if !category_exists(&tx, parent_id)? {
                return Err(RepoError::CategoryNotFound(parent_id));
            }
        }
        let taken: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = ?1);",
            [slug.as_str()],
            |row| row.get(0),
        )?;
        if taken == 1 {
            return Err(RepoError::DuplicateSlug(slug));
        }

        tx.execute(
            "INSERT INTO categories (slug, label, parent_id) VALUES (?1, ?2, ?3);",
            params![slug.as_str(), label.as_str(), category.parent_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Category {
            id,
            slug,
            label,
            parent_id: category.parent_id,
        })
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, slug, label, parent_id FROM categories WHERE id = ?1;",
                [id],
                parse_category_row,
            )
            .optional()
            .map_err(RepoError::from)
    }

    fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, slug, label, parent_id FROM categories WHERE slug = ?1;",
                [slug.trim().to_ascii_lowercase()],
                parse_category_row,
            )
            .optional()
            .map_err(RepoError::from)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, slug, label, parent_id
             FROM categories
             ORDER BY label COLLATE NOCASE ASC, id ASC;",
        )?;
        let rows = stmt.query_map([], parse_category_row)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn assign_event_categories(&self, event_id: EventId, ids: &[CategoryId]) -> RepoResult<()> {
        let event_text = event_id.to_string();
        let unique: BTreeSet<CategoryId> = ids.iter().copied().collect();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let event_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM events WHERE uuid = ?1);",
            [event_text.as_str()],
            |row| row.get(0),
        )?;
        if event_exists != 1 {
            return Err(RepoError::NotFound(event_id));
        }

        tx.execute(
            "DELETE FROM event_categories WHERE event_uuid = ?1;",
            [event_text.as_str()],
        )?;
        for category_id in unique {
            if !category_exists(&tx, category_id)? {
                return Err(RepoError::CategoryNotFound(category_id));
            }
            tx.execute(
                "INSERT INTO event_categories (event_uuid, category_id) VALUES (?1, ?2);",
                params![event_text.as_str(), category_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn categories_for_event(&self, event_id: EventId) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.slug, c.label, c.parent_id
             FROM event_categories ec
             INNER JOIN categories c ON c.id = ec.category_id
             WHERE ec.event_uuid = ?1
             ORDER BY c.label COLLATE NOCASE ASC, c.id ASC;",
        )?;
        let rows = stmt.query_map([event_id.to_string()], parse_category_row)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }
}

fn parse_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        slug: row.get("slug")?,
        label: row.get("label")?,
        parent_id: row.get("parent_id")?,
    })
}

fn category_exists(conn: &Connection, id: CategoryId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
