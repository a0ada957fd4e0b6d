//! Reply-target resolution: does an inbound message continue a ticket?

use std::sync::LazyLock;

use regex::Regex;

use crate::db::ticket_repo::{self, TicketRow};
use crate::db::{Database, DatabaseError};

// Anchored at the start only; `.` stops at a newline, so the last token on
// the first line wins.
static RE_TICKET_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\[HD-(\d+)\].*").unwrap());

/// Extracts the ticket id referenced as `[HD-<id>]` in a subject line.
///
/// A number too large for a ticket id counts as no reference.
pub fn parse_ticket_reference(subject: &str) -> Option<i64> {
    RE_TICKET_REFERENCE
        .captures(subject)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Finds the ticket a message replies to: the subject must reference it and
/// the ticket's customer must be the sender. Read-only.
pub fn find_reply_target(
    db: &Database,
    sender: &str,
    subject: &str,
) -> Result<Option<TicketRow>, DatabaseError> {
    match parse_ticket_reference(subject) {
        Some(ticket_id) => ticket_repo::find_by_customer_and_id(db, sender, ticket_id),
        None => Ok(None),
    }
}
