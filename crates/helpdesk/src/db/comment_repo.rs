//! Comment repository — replies attached to existing tickets.

use rusqlite::{params, Row};

use super::{now_timestamp, Database, DatabaseError};

/// A comment row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRow {
    pub id: i64,
    pub ticket_id: i64,
    pub body: String,
    /// Internal author; `None` for comments that arrived by mail.
    pub author: Option<String>,
    pub message_id: Option<String>,
    pub created_at: String,
}

impl CommentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            ticket_id: row.get("ticket_id")?,
            body: row.get("body")?,
            author: row.get("author")?,
            message_id: row.get("message_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Fields of a comment about to be created.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub ticket_id: i64,
    pub body: String,
    pub author: Option<String>,
    pub message_id: Option<String>,
}

/// Inserts a comment and returns its id.
pub fn insert(db: &Database, comment: &NewComment) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO comments (ticket_id, body, author, message_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.ticket_id,
                comment.body,
                comment.author,
                comment.message_id,
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Returns true if a comment was created from the given message id.
pub fn exists_with_message_id(db: &Database, message_id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE message_id = ?1)",
            params![message_id],
            |r| r.get(0),
        )?;
        Ok(exists)
    })
}

/// Lists the comments on a ticket, oldest first.
pub fn list_by_ticket(db: &Database, ticket_id: i64) -> Result<Vec<CommentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM comments WHERE ticket_id = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(params![ticket_id], CommentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts all comments.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))?;
        Ok(count)
    })
}
