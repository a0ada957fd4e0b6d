//! Ticket repository — operations on the `tickets` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{now_timestamp, Database, DatabaseError};

/// Maximum ticket title length, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// A ticket row from the database.
///
/// `id` is also the public ticket number quoted in reply subjects as
/// `[HD-<id>]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRow {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub body: String,
    pub customer: String,
    pub message_id: Option<String>,
    pub assignee: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl TicketRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            customer: row.get("customer")?,
            message_id: row.get("message_id")?,
            assignee: row.get("assignee")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Fields of a ticket about to be created.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub project_id: i64,
    pub title: String,
    pub body: String,
    pub customer: String,
    pub message_id: Option<String>,
    pub assignee: Option<String>,
}

/// Inserts a ticket and returns its id. Status defaults to `open`.
pub fn insert(db: &Database, ticket: &NewTicket) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO tickets (project_id, title, body, customer, message_id, assignee, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ticket.project_id,
                ticket.title,
                ticket.body,
                ticket.customer,
                ticket.message_id,
                ticket.assignee,
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Finds a ticket by id.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<TicketRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM tickets WHERE id = ?1",
                params![id],
                TicketRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Finds the ticket with the given id, provided it belongs to `customer`.
pub fn find_by_customer_and_id(
    db: &Database,
    customer: &str,
    id: i64,
) -> Result<Option<TicketRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM tickets WHERE id = ?1 AND customer = ?2",
                params![id, customer],
                TicketRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Returns true if a ticket was created from the given message id.
pub fn exists_with_message_id(db: &Database, message_id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE message_id = ?1)",
            params![message_id],
            |r| r.get(0),
        )?;
        Ok(exists)
    })
}

/// Lists the tickets of a project, oldest first.
pub fn list_by_project(db: &Database, project_id: i64) -> Result<Vec<TicketRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM tickets WHERE project_id = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(params![project_id], TicketRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts all tickets.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM tickets", [], |r| r.get(0))?;
        Ok(count)
    })
}
