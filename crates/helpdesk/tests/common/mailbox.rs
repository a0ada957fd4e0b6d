//! In-memory mailbox.

#![allow(dead_code)]

use std::collections::HashSet;

use async_trait::async_trait;

use helpdesk::email::{EmailError, FetchedMessage, Mailbox};

struct StoredMessage {
    uid: u32,
    folder: String,
    to: String,
    raw: Vec<u8>,
    seen: bool,
}

/// A `Mailbox` over a list of messages, with switches for failures.
pub struct FakeMailbox {
    messages: Vec<StoredMessage>,
    next_uid: u32,
    pub connects: usize,
    pub disconnects: usize,
    pub connected: bool,
    /// Recipient addresses queried, in order.
    pub queries: Vec<String>,
    pub fail_connect: bool,
    pub fail_listing: bool,
    pub fail_mark_seen: HashSet<u32>,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_uid: 1,
            connects: 0,
            disconnects: 0,
            connected: false,
            queries: Vec::new(),
            fail_connect: false,
            fail_listing: false,
            fail_mark_seen: HashSet::new(),
        }
    }

    /// Delivers an unread message to INBOX and returns its UID.
    pub fn deliver(&mut self, to: &str, raw: Vec<u8>) -> u32 {
        self.deliver_to_folder("INBOX", to, raw)
    }

    pub fn deliver_to_folder(&mut self, folder: &str, to: &str, raw: Vec<u8>) -> u32 {
        let uid = self.next_uid;
        self.next_uid += 1;
        self.messages.push(StoredMessage {
            uid,
            folder: folder.to_string(),
            to: to.to_string(),
            raw,
            seen: false,
        });
        uid
    }

    pub fn is_seen(&self, uid: u32) -> bool {
        self.messages.iter().any(|m| m.uid == uid && m.seen)
    }

    pub fn unseen_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.seen).count()
    }
}

#[async_trait(?Send)]
impl Mailbox for FakeMailbox {
    async fn connect(&mut self) -> Result<(), EmailError> {
        if self.fail_connect {
            return Err(EmailError::ConnectionFailed("connection refused".to_string()));
        }
        self.connects += 1;
        self.connected = true;
        Ok(())
    }

    async fn unread_messages(
        &mut self,
        folder: &str,
        sent_to: &str,
    ) -> Result<Vec<FetchedMessage>, EmailError> {
        if !self.connected {
            return Err(EmailError::NotConnected);
        }
        if self.fail_listing {
            return Err(EmailError::ProtocolError("SEARCH failed".to_string()));
        }
        self.queries.push(sent_to.to_string());

        Ok(self
            .messages
            .iter()
            .filter(|m| !m.seen && m.folder == folder && m.to.eq_ignore_ascii_case(sent_to))
            .map(|m| FetchedMessage::new(m.uid, m.raw.clone()))
            .collect())
    }

    async fn mark_seen(&mut self, uid: u32) -> Result<(), EmailError> {
        if !self.connected {
            return Err(EmailError::NotConnected);
        }
        if self.fail_mark_seen.contains(&uid) {
            return Err(EmailError::ProtocolError("STORE failed".to_string()));
        }
        if let Some(message) = self.messages.iter_mut().find(|m| m.uid == uid) {
            message.seen = true;
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), EmailError> {
        self.disconnects += 1;
        self.connected = false;
        Ok(())
    }
}
