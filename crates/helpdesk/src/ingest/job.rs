//! The `check-mail` job: unread mail in, tickets and comments out.

use tracing::{debug, error, info, info_span, warn};

use crate::config::Config;
use crate::db::attachment_repo::{self, AttachmentContainer, NewMailAttachment};
use crate::db::comment_repo::{self, NewComment};
use crate::db::project_repo::{self, ProjectRow};
use crate::db::ticket_repo::{self, NewTicket, MAX_TITLE_CHARS};
use crate::db::Database;
use crate::email::{parse_message, EmailError, FetchedMessage, Mailbox, ParsedAttachment};
use crate::error::HelpdeskError;
use crate::storage::AttachmentStore;

use super::classify::{extract_body, is_autoreply};
use super::reply::find_reply_target;
use super::report::{BatchReport, MessageReport, Outcome, RunReport};

/// Title used for messages without a Subject header.
pub const DEFAULT_SUBJECT: &str = "Email ticket";

/// Mail ingestion job.
///
/// Walks every project address, then every alias address, over a single
/// mailbox session and turns each unread message into a ticket or a comment.
pub struct CheckMail {
    config: Config,
    db: Database,
    store: AttachmentStore,
}

impl CheckMail {
    pub fn new(config: Config, db: Database, store: AttachmentStore) -> Self {
        Self { config, db, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one pass over the mailbox.
    ///
    /// Per-message failures are recorded in the report. Connecting, listing
    /// and loading projects are fatal; the session is closed before the error
    /// is returned.
    pub async fn run<M: Mailbox + ?Sized>(
        &self,
        mailbox: &mut M,
    ) -> Result<RunReport, HelpdeskError> {
        let _span = info_span!("check_mail", folder = %self.config.folder).entered();
        info!("Started check_mail");

        mailbox.connect().await?;

        let result = self.process_all(mailbox).await;

        if let Err(e) = mailbox.disconnect().await {
            warn!("Failed to close mailbox session: {}", e);
        }

        let report = result?;
        info!(
            total = report.total(),
            tickets = report.tickets_created(),
            comments = report.comments_created(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Finished check_mail"
        );
        Ok(report)
    }

    async fn process_all<M: Mailbox + ?Sized>(
        &self,
        mailbox: &mut M,
    ) -> Result<RunReport, HelpdeskError> {
        let mut report = RunReport::default();

        for project in project_repo::list_projects(&self.db)? {
            info!("Processing project {}", project.title);
            let batch = self
                .handle_messages(
                    mailbox,
                    &project,
                    format!("project {}", project.title),
                    &project.email,
                    None,
                )
                .await?;
            report.batches.push(batch);
        }

        for (alias, project) in project_repo::list_aliases_with_project(&self.db)? {
            info!(
                "Processing alias '{}' for project '{}'",
                alias.email, project.title
            );
            let batch = self
                .handle_messages(
                    mailbox,
                    &project,
                    format!("alias {}", alias.email),
                    &alias.email,
                    alias.assignee.as_deref(),
                )
                .await?;
            report.batches.push(batch);
        }

        Ok(report)
    }

    /// Processes the unread messages addressed to `address`, in mailbox order.
    async fn handle_messages<M: Mailbox + ?Sized>(
        &self,
        mailbox: &mut M,
        project: &ProjectRow,
        source: String,
        address: &str,
        assignee: Option<&str>,
    ) -> Result<BatchReport, HelpdeskError> {
        let _span = info_span!("mail_source", source = %source, address = %address).entered();

        let messages = mailbox.unread_messages(&self.config.folder, address).await?;
        info!("{} unread message(s) for {}", messages.len(), address);

        let mut batch = BatchReport::new(source, address);
        for message in &messages {
            let report = self.handle_message(mailbox, project, assignee, message).await;
            batch.messages.push(report);
        }

        debug!("Finished processing {}", address);
        Ok(batch)
    }

    async fn handle_message<M: Mailbox + ?Sized>(
        &self,
        mailbox: &mut M,
        project: &ProjectRow,
        assignee: Option<&str>,
        message: &FetchedMessage,
    ) -> MessageReport {
        let uid = message.uid;

        let outcome = match self.process_message(project, assignee, message) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(uid, "Error while processing message {}: {}", uid, e);
                return MessageReport {
                    uid,
                    outcome: Outcome::Failed {
                        error: e.to_string(),
                    },
                    marked_seen: false,
                };
            }
        };
        info!(uid, "Message {}: {}", uid, outcome);

        if !self.config.mark_seen {
            return MessageReport {
                uid,
                outcome,
                marked_seen: false,
            };
        }

        match mailbox.mark_seen(uid).await {
            Ok(()) => MessageReport {
                uid,
                outcome,
                marked_seen: true,
            },
            Err(e) => {
                error!(uid, "Failed to mark message {} as read: {}", uid, e);
                MessageReport {
                    uid,
                    outcome: Outcome::Failed {
                        error: format!("{} (mark as read failed: {})", outcome, e),
                    },
                    marked_seen: false,
                }
            }
        }
    }

    /// Classifies one message and writes the resulting records.
    fn process_message(
        &self,
        project: &ProjectRow,
        assignee: Option<&str>,
        message: &FetchedMessage,
    ) -> Result<Outcome, HelpdeskError> {
        let mail = parse_message(&message.raw)?;
        let subject = mail.subject.as_deref().unwrap_or(DEFAULT_SUBJECT);
        info!(uid = message.uid, "Got message {}: {}", message.uid, subject);

        if self.config.ignore_autoreply && is_autoreply(&mail) {
            return Ok(Outcome::SkippedAutoreply);
        }

        let message_id = message.message_id();
        if ticket_repo::exists_with_message_id(&self.db, &message_id)?
            || comment_repo::exists_with_message_id(&self.db, &message_id)?
        {
            return Ok(Outcome::SkippedDuplicate);
        }

        let body = extract_body(&mail);
        let sender = mail
            .sender
            .as_deref()
            .ok_or_else(|| EmailError::ParseError("message has no sender address".to_string()))?;

        match find_reply_target(&self.db, sender, subject)? {
            None => {
                let ticket_id = ticket_repo::insert(
                    &self.db,
                    &NewTicket {
                        project_id: project.id,
                        title: subject.chars().take(MAX_TITLE_CHARS).collect(),
                        body,
                        customer: sender.to_string(),
                        message_id: Some(message_id),
                        assignee: assignee
                            .or(project.default_assignee.as_deref())
                            .map(str::to_string),
                    },
                )?;
                let attachments = self.create_attachments(
                    AttachmentContainer::Ticket(ticket_id),
                    &mail.attachments,
                )?;
                Ok(Outcome::TicketCreated {
                    ticket_id,
                    attachments,
                })
            }
            Some(ticket) => {
                let comment_id = comment_repo::insert(
                    &self.db,
                    &NewComment {
                        ticket_id: ticket.id,
                        body,
                        author: None,
                        message_id: Some(message_id),
                    },
                )?;
                let attachments = self.create_attachments(
                    AttachmentContainer::Comment(comment_id),
                    &mail.attachments,
                )?;
                Ok(Outcome::CommentCreated {
                    ticket_id: ticket.id,
                    comment_id,
                    attachments,
                })
            }
        }
    }

    fn create_attachments(
        &self,
        container: AttachmentContainer,
        attachments: &[ParsedAttachment],
    ) -> Result<usize, HelpdeskError> {
        for attachment in attachments {
            let stored_path = self
                .store
                .store(container, &attachment.filename, &attachment.content)?;
            attachment_repo::insert(
                &self.db,
                &NewMailAttachment {
                    container,
                    filename: attachment.filename.clone(),
                    stored_path: stored_path.to_string_lossy().into_owned(),
                    mime_type: attachment.mime_type.clone(),
                    size: attachment.content.len() as u64,
                },
            )?;
            debug!("Stored attachment {} for {}", attachment.filename, container);
        }
        Ok(attachments.len())
    }
}
