//! The mailbox session seam between the ingestion job and the mail server.

use async_trait::async_trait;

use super::error::Result;

/// A message as delivered by the server: its UID and raw RFC 822 bytes.
#[derive(Debug, Clone)]
pub struct FetchedMessage {
    pub uid: u32,
    pub raw: Vec<u8>,
}

impl FetchedMessage {
    pub fn new(uid: u32, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            uid,
            raw: raw.into(),
        }
    }

    /// The identifier stored as `message_id` on tickets and comments.
    pub fn message_id(&self) -> String {
        self.uid.to_string()
    }
}

/// A mailbox session.
///
/// [`ImapClient`](super::ImapClient) talks to a real server; tests drive the
/// job with an in-memory implementation.
#[async_trait(?Send)]
pub trait Mailbox {
    /// Opens the session. Calling it on an open session is a no-op.
    async fn connect(&mut self) -> Result<()>;

    /// Lists unread messages in `folder` addressed to `sent_to`, in mailbox
    /// order. Listing must not mark anything as read.
    async fn unread_messages(&mut self, folder: &str, sent_to: &str)
        -> Result<Vec<FetchedMessage>>;

    /// Flags a message as read.
    async fn mark_seen(&mut self, uid: u32) -> Result<()>;

    /// Closes the session.
    async fn disconnect(&mut self) -> Result<()>;
}
