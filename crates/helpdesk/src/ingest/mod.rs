//! Mail ingestion: classify unread messages and create helpdesk records.

pub mod classify;
pub mod job;
pub mod reply;
pub mod report;

pub use classify::{extract_body, is_autoreply};
pub use job::{CheckMail, DEFAULT_SUBJECT};
pub use reply::{find_reply_target, parse_ticket_reference};
pub use report::{BatchReport, MessageReport, Outcome, RunReport};
