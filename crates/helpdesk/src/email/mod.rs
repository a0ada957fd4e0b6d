//! Mail source module.
//!
//! Talks to the helpdesk mailbox over IMAP and turns raw messages into
//! [`ParsedMail`] values for the ingestion job.

pub mod client;
pub mod error;
pub mod mailbox;
pub mod parser;

pub use client::ImapClient;
pub use error::EmailError;
pub use mailbox::{FetchedMessage, Mailbox};
pub use parser::{parse_message, ParsedAttachment, ParsedMail};
