//! Outcome records of an ingestion run.

use std::fmt;

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    SkippedAutoreply,
    SkippedDuplicate,
    TicketCreated {
        ticket_id: i64,
        attachments: usize,
    },
    CommentCreated {
        ticket_id: i64,
        comment_id: i64,
        attachments: usize,
    },
    Failed {
        error: String,
    },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::SkippedAutoreply => write!(f, "skipped (autoreply)"),
            Outcome::SkippedDuplicate => write!(f, "skipped (already processed)"),
            Outcome::TicketCreated {
                ticket_id,
                attachments,
            } => write!(f, "created ticket #{} with {} attachment(s)", ticket_id, attachments),
            Outcome::CommentCreated {
                ticket_id,
                comment_id,
                attachments,
            } => write!(
                f,
                "created comment #{} on ticket #{} with {} attachment(s)",
                comment_id, ticket_id, attachments
            ),
            Outcome::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReport {
    pub uid: u32,
    pub outcome: Outcome,
    pub marked_seen: bool,
}

/// Messages handled for one project address or alias address.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// `project <title>` or `alias <address>`.
    pub source: String,
    pub address: String,
    pub messages: Vec<MessageReport>,
}

impl BatchReport {
    pub fn new(source: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            address: address.into(),
            messages: Vec::new(),
        }
    }
}

/// Everything a run did, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
}

impl RunReport {
    pub fn messages(&self) -> impl Iterator<Item = &MessageReport> {
        self.batches.iter().flat_map(|b| b.messages.iter())
    }

    pub fn total(&self) -> usize {
        self.messages().count()
    }

    pub fn tickets_created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::TicketCreated { .. }))
    }

    pub fn comments_created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::CommentCreated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::SkippedAutoreply | Outcome::SkippedDuplicate))
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    pub fn attachments_stored(&self) -> usize {
        self.messages()
            .map(|m| match m.outcome {
                Outcome::TicketCreated { attachments, .. }
                | Outcome::CommentCreated { attachments, .. } => attachments,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.messages().filter(|m| pred(&m.outcome)).count()
    }
}
