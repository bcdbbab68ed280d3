//! Attendee repository: append-only RSVP storage.
//!
//! # Responsibility
//! - Append one attendee row per accepted RSVP.
//! - Serve attendee lists and counts for the read API.
//!
//! # Invariants
//! - Appends are one conditional `INSERT ... SELECT`; there is no
//!   read-modify-write of a shared list, so concurrent RSVPs never overwrite
//!   each other.
//! - Only events in `publish` status accept attendees; the status check runs
//!   inside the same statement as the insert.
//! - `submitted_at` is assigned by SQLite at write time.
//! - No update or delete path exists.

use crate::model::attendee::{Attendee, NewAttendee};
use crate::model::event::EventId;
use crate::repo::{ensure_tables, parse_event_id, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ATTENDEE_SELECT_SQL: &str = "SELECT
    id,
    event_uuid,
    name,
    email,
    submitted_at
FROM attendees";

pub trait AttendeeRepository {
    /// Appends one attendee to a published event.
    ///
    /// Returns `NotFound` when no published event has this id.
    fn append_attendee(&self, event_id: EventId, attendee: &NewAttendee) -> RepoResult<Attendee>;
    /// Lists attendees in RSVP order.
    fn list_attendees(&self, event_id: EventId) -> RepoResult<Vec<Attendee>>;
    fn attendee_count(&self, event_id: EventId) -> RepoResult<u64>;
}

pub struct SqliteAttendeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendeeRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["events", "attendees"])?;
        Ok(Self { conn })
    }
}

impl AttendeeRepository for SqliteAttendeeRepository<'_> {
    fn append_attendee(&self, event_id: EventId, attendee: &NewAttendee) -> RepoResult<Attendee> {
        let inserted = self.conn.execute(
            "INSERT INTO attendees (event_uuid, name, email)
             SELECT uuid, ?2, ?3
             FROM events
             WHERE uuid = ?1
               AND status = 'publish';",
            params![event_id.to_string(), attendee.name(), attendee.email()],
        )?;
        if inserted == 0 {
            return Err(RepoError::NotFound(event_id));
        }

        let row_id = self.conn.last_insert_rowid();
        let mut stmt = self
            .conn
            .prepare(&format!("{ATTENDEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([row_id])?;
        match rows.next()? {
            Some(row) => parse_attendee_row(row),
            None => Err(RepoError::InvalidData(format!(
                "attendee row {row_id} missing after insert"
            ))),
        }
    }

    fn list_attendees(&self, event_id: EventId) -> RepoResult<Vec<Attendee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDEE_SELECT_SQL} WHERE event_uuid = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([event_id.to_string()])?;
        let mut attendees = Vec::new();
        while let Some(row) = rows.next()? {
            attendees.push(parse_attendee_row(row)?);
        }
        Ok(attendees)
    }

    fn attendee_count(&self, event_id: EventId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM attendees WHERE event_uuid = ?1;",
            [event_id.to_string()],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative attendee count `{count}`")))
    }
}

fn parse_attendee_row(row: &Row<'_>) -> RepoResult<Attendee> {
    let event_text: String = row.get("event_uuid")?;
    Ok(Attendee {
        id: row.get("id")?,
        event_id: parse_event_id(&event_text)?,
        name: row.get("name")?,
        email: row.get("email")?,
        submitted_at: row.get("submitted_at")?,
    })
}
