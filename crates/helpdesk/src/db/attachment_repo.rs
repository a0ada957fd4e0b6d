//! Mail attachment repository.
//!
//! An attachment belongs to either a ticket or a comment. The owner is
//! stored as a `(container_kind, container_id)` pair and surfaced as
//! [`AttachmentContainer`].

use std::fmt;

use rusqlite::{params, Row};

use super::{now_timestamp, Database, DatabaseError};

/// The record an attachment hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentContainer {
    Ticket(i64),
    Comment(i64),
}

impl AttachmentContainer {
    /// The `container_kind` column value.
    pub fn kind(&self) -> &'static str {
        match self {
            AttachmentContainer::Ticket(_) => "ticket",
            AttachmentContainer::Comment(_) => "comment",
        }
    }

    /// The id of the owning ticket or comment.
    pub fn id(&self) -> i64 {
        match self {
            AttachmentContainer::Ticket(id) | AttachmentContainer::Comment(id) => *id,
        }
    }

    fn from_columns(kind: &str, id: i64) -> Result<Self, DatabaseError> {
        match kind {
            "ticket" => Ok(AttachmentContainer::Ticket(id)),
            "comment" => Ok(AttachmentContainer::Comment(id)),
            other => Err(DatabaseError::InvalidValue {
                column: "container_kind",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AttachmentContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// A mail attachment row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct MailAttachmentRow {
    pub id: i64,
    pub container: AttachmentContainer,
    pub filename: String,
    pub stored_path: String,
    pub mime_type: String,
    pub size: u64,
    pub created_at: String,
}

struct RawAttachmentRow {
    id: i64,
    container_kind: String,
    container_id: i64,
    filename: String,
    stored_path: String,
    mime_type: String,
    size: u64,
    created_at: String,
}

impl RawAttachmentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            container_kind: row.get("container_kind")?,
            container_id: row.get("container_id")?,
            filename: row.get("filename")?,
            stored_path: row.get("stored_path")?,
            mime_type: row.get("mime_type")?,
            size: row.get("size")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_row(self) -> Result<MailAttachmentRow, DatabaseError> {
        Ok(MailAttachmentRow {
            id: self.id,
            container: AttachmentContainer::from_columns(&self.container_kind, self.container_id)?,
            filename: self.filename,
            stored_path: self.stored_path,
            mime_type: self.mime_type,
            size: self.size,
            created_at: self.created_at,
        })
    }
}

/// Fields of an attachment record about to be created.
#[derive(Debug, Clone)]
pub struct NewMailAttachment {
    pub container: AttachmentContainer,
    pub filename: String,
    pub stored_path: String,
    pub mime_type: String,
    pub size: u64,
}

/// Inserts an attachment record and returns its id.
pub fn insert(db: &Database, attachment: &NewMailAttachment) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO mail_attachments
             (container_kind, container_id, filename, stored_path, mime_type, size, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                attachment.container.kind(),
                attachment.container.id(),
                attachment.filename,
                attachment.stored_path,
                attachment.mime_type,
                attachment.size,
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Lists the attachments of a ticket or comment, oldest first.
pub fn list_for(
    db: &Database,
    container: AttachmentContainer,
) -> Result<Vec<MailAttachmentRow>, DatabaseError> {
    let raw = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM mail_attachments
             WHERE container_kind = ?1 AND container_id = ?2
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(
                params![container.kind(), container.id()],
                RawAttachmentRow::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    raw.into_iter().map(RawAttachmentRow::into_row).collect()
}

/// Counts all attachment records.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 =
            conn.query_row("SELECT COUNT(*) FROM mail_attachments", [], |r| r.get(0))?;
        Ok(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample(container: AttachmentContainer, filename: &str) -> NewMailAttachment {
        NewMailAttachment {
            container,
            filename: filename.to_string(),
            stored_path: format!("/srv/attachments/{}", filename),
            mime_type: "application/pdf".to_string(),
            size: 1024,
        }
    }

    #[test]
    fn test_container_columns() {
        assert_eq!(AttachmentContainer::Ticket(7).kind(), "ticket");
        assert_eq!(AttachmentContainer::Comment(9).kind(), "comment");
        assert_eq!(AttachmentContainer::Comment(9).id(), 9);
        assert_eq!(AttachmentContainer::Ticket(7).to_string(), "ticket 7");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(matches!(
            AttachmentContainer::from_columns("project", 1),
            Err(DatabaseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_ticket_and_comment_attachments_are_separate() {
        let db = test_db();
        insert(&db, &sample(AttachmentContainer::Ticket(1), "invoice.pdf")).unwrap();
        insert(&db, &sample(AttachmentContainer::Ticket(1), "photo.jpg")).unwrap();
        insert(&db, &sample(AttachmentContainer::Comment(1), "log.txt")).unwrap();

        let on_ticket = list_for(&db, AttachmentContainer::Ticket(1)).unwrap();
        assert_eq!(on_ticket.len(), 2);
        assert_eq!(on_ticket[0].filename, "invoice.pdf");
        assert_eq!(on_ticket[0].container, AttachmentContainer::Ticket(1));

        let on_comment = list_for(&db, AttachmentContainer::Comment(1)).unwrap();
        assert_eq!(on_comment.len(), 1);
        assert_eq!(on_comment[0].size, 1024);

        assert_eq!(count(&db).unwrap(), 3);
    }
}
