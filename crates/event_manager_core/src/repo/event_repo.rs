//! Event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and listing APIs over canonical `events` storage.
//! - Own status transitions so the before/after pair is observed atomically.
//!
//! # Invariants
//! - Write paths call `Event::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - A status write reads the previous status inside the same immediate
//!   transaction, so concurrent publishers observe exactly one publication.

use crate::model::event::{Event, EventDate, EventId, EventStatus, StatusChange};
use crate::repo::{ensure_tables, parse_event_id, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    status,
    event_date,
    event_location,
    created_at,
    updated_at
FROM events";

/// Result ordering for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOrder {
    /// Newest created first.
    #[default]
    NewestFirst,
    /// Earliest event date first.
    DateAscending,
}

/// Query options for listing events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventListQuery {
    pub status: Option<EventStatus>,
    /// Category slug; events in descendant categories match too.
    pub category_slug: Option<String>,
    /// Keeps only dated events on or after this day.
    pub dated_on_or_after: Option<NaiveDate>,
    pub order: EventOrder,
    pub limit: Option<u32>,
}

/// Repository interface for event persistence.
pub trait EventRepository {
    /// Inserts a new event, including its initial status.
    fn create_event(&self, event: &Event) -> RepoResult<EventId>;
    /// Replaces title, content, date and location. Status is left untouched.
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>>;
    /// Writes a new status and reports the status it replaced.
    fn set_status(&self, id: EventId, status: EventStatus) -> RepoResult<StatusChange>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["events", "categories", "event_categories"])?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO events (
                uuid,
                title,
                content,
                status,
                event_date,
                event_location
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                event.id.to_string(),
                event.title.trim(),
                event.content.as_str(),
                event.status.as_str(),
                event.date.map(|date| date.to_string()),
                event.location.as_deref(),
            ],
        )?;

        Ok(event.id)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                title = ?1,
                content = ?2,
                event_date = ?3,
                event_location = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                event.title.trim(),
                event.content.as_str(),
                event.date.map(|date| date.to_string()),
                event.location.as_deref(),
                event.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>> {
        let mut sql = format!("{EVENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(slug) = query.category_slug.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    WITH RECURSIVE scope(id) AS (
                        SELECT id FROM categories WHERE slug = ?
                        UNION
                        SELECT c.id
                        FROM categories c
                        INNER JOIN scope s ON c.parent_id = s.id
                    )
                    SELECT 1
                    FROM event_categories ec
                    WHERE ec.event_uuid = events.uuid
                      AND ec.category_id IN (SELECT id FROM scope)
                )",
            );
            bind_values.push(Value::Text(slug.clone()));
        }

        if let Some(from) = query.dated_on_or_after {
            sql.push_str(" AND event_date IS NOT NULL AND event_date >= ?");
            bind_values.push(Value::Text(EventDate::from_naive(from).to_string()));
        }

        match query.order {
            EventOrder::NewestFirst => sql.push_str(" ORDER BY created_at DESC, rowid DESC"),
            EventOrder::DateAscending => {
                sql.push_str(" ORDER BY event_date ASC, created_at ASC, rowid ASC")
            }
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }

    fn set_status(&self, id: EventId, status: EventStatus) -> RepoResult<StatusChange> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let previous: Option<String> = tx
            .query_row(
                "SELECT status FROM events WHERE uuid = ?1;",
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(previous) = previous else {
            return Err(RepoError::NotFound(id));
        };
        let previous = parse_status(&previous)?;

        tx.execute(
            "UPDATE events
             SET
                status = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id_text.as_str(), status.as_str()],
        )?;
        tx.commit()?;

        Ok(StatusChange {
            event_id: id,
            previous: Some(previous),
            current: status,
        })
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_event_id(&uuid_text)?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text)?;

    let date = match row.get::<_, Option<String>>("event_date")? {
        Some(value) => Some(EventDate::parse(&value).map_err(|_| {
            RepoError::InvalidData(format!("invalid event date `{value}` in events.event_date"))
        })?),
        None => None,
    };

    let event = Event {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        status,
        date,
        location: row.get("event_location")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    event.validate()?;
    Ok(event)
}

fn parse_status(value: &str) -> RepoResult<EventStatus> {
    EventStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{value}` in events.status"))
    })
}
