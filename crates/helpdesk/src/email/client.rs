//! IMAP client for the helpdesk mailbox.

use async_imap::Session;
use async_native_tls::TlsConnector;
use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::config::Config;

use super::error::{EmailError, Result};
use super::mailbox::{FetchedMessage, Mailbox};

/// Type alias for the underlying async stream (using async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

/// IMAP client: one authenticated session, reused for every project and alias.
pub struct ImapClient {
    session: Option<Session<TlsStream>>,
    config: Config,
    current_folder: Option<String>,
}

impl ImapClient {
    /// Creates a new IMAP client with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            session: None,
            config,
            current_folder: None,
        }
    }

    /// Connects to the IMAP server and authenticates with the configured password.
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Already connected to IMAP server");
            return Ok(());
        }

        if !self.config.use_tls {
            return Err(EmailError::ConfigError(
                "TLS is required for secure email connections".to_string(),
            ));
        }

        let password = self.get_password()?;

        let addr = format!("{}:{}", self.config.imap_host, self.config.imap_port);
        info!("Connecting to IMAP server at {}", addr);

        let std_stream = std::net::TcpStream::connect(&addr)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        std_stream
            .set_nonblocking(true)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        let tcp_stream = async_io::Async::new(std_stream)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;

        let tls = TlsConnector::new();
        let tls_stream = tls.connect(&self.config.imap_host, tcp_stream).await?;

        let client = async_imap::Client::new(tls_stream);

        let session = client
            .login(&self.config.username, password.expose_secret())
            .await
            .map_err(|(e, _)| EmailError::AuthenticationFailed(e.to_string()))?;

        info!("Successfully authenticated to IMAP server as {}", self.config.username);
        self.session = Some(session);
        Ok(())
    }

    fn get_password(&self) -> Result<SecretString> {
        self.config
            .resolve_password()
            .map_err(|e| EmailError::CredentialsNotFound(e.to_string()))
    }

    fn session_mut(&mut self) -> Result<&mut Session<TlsStream>> {
        self.session
            .as_mut()
            .ok_or(EmailError::NotConnected)
    }

    /// Opens a folder read-write with SELECT, so `\Seen` flags can be stored.
    /// A folder that is already selected is not re-selected.
    pub async fn select_folder(&mut self, folder: &str) -> Result<()> {
        if self.current_folder.as_deref() == Some(folder) {
            return Ok(());
        }

        let session = self.session_mut()?;
        info!("Selecting folder: {}", folder);

        session
            .select(folder)
            .await
            .map_err(|e| select_error(folder, e))?;

        self.current_folder = Some(folder.to_string());
        Ok(())
    }

    /// Searches the selected folder for unseen messages addressed to `sent_to`.
    /// UIDs come back in ascending order.
    pub async fn search_unseen_to(&mut self, sent_to: &str) -> Result<Vec<u32>> {
        let session = self.session_mut()?;

        let query = unseen_to_query(sent_to);
        debug!("Searching with query: {}", query);

        let uids = session
            .uid_search(&query)
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_unstable();
        debug!("Found {} unseen messages for {}", uid_list.len(), sent_to);
        Ok(uid_list)
    }

    /// Fetches messages by UID using BODY.PEEK[] so they stay unread.
    pub async fn fetch_messages_peek(&mut self, uids: &[u32]) -> Result<Vec<FetchedMessage>> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let session = self.session_mut()?;

        let uid_set = uids
            .iter()
            .map(|u| u.to_string())
            .collect::<Vec<_>>()
            .join(",");

        debug!("Fetching {} messages with UIDs: {}", uids.len(), uid_set);

        let mut messages = session
            .uid_fetch(&uid_set, "(UID BODY.PEEK[])")
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(message_result) = messages.next().await {
            match message_result {
                Ok(message) => {
                    if let (Some(uid), Some(body)) = (message.uid, message.body()) {
                        results.push(FetchedMessage::new(uid, body.to_vec()));
                    } else {
                        warn!(
                            "Fetch response without UID or body (uid={:?}, seq={})",
                            message.uid, message.message
                        );
                    }
                }
                Err(e) => {
                    warn!("Error fetching messages {}: {}", uid_set, e);
                }
            }
        }
        drop(messages);

        // The server may answer out of order; keep mailbox order.
        results.sort_by_key(|m| m.uid);

        let missing = missing_uids(uids, &results);
        if !missing.is_empty() {
            warn!(
                "{} of {} messages not fetched, left unread for the next run: {:?}",
                missing.len(),
                uids.len(),
                missing
            );
        }
        debug!("Successfully fetched {} messages", results.len());
        Ok(results)
    }

    /// Adds the `\Seen` flag to a message.
    pub async fn store_seen(&mut self, uid: u32) -> Result<()> {
        let session = self.session_mut()?;

        let updates = session
            .uid_store(uid.to_string(), "+FLAGS (\\Seen)")
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;
        let _: Vec<_> = updates
            .try_collect()
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        debug!("Marked UID {} as seen", uid);
        Ok(())
    }

    /// Disconnects from the IMAP server gracefully.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            info!("Disconnecting from IMAP server");
            session
                .logout()
                .await
                .map_err(|e| EmailError::ProtocolError(e.to_string()))?;
        }
        self.current_folder = None;
        Ok(())
    }

    /// Checks if the client is currently connected.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

#[async_trait(?Send)]
impl Mailbox for ImapClient {
    async fn connect(&mut self) -> Result<()> {
        ImapClient::connect(self).await
    }

    async fn unread_messages(
        &mut self,
        folder: &str,
        sent_to: &str,
    ) -> Result<Vec<FetchedMessage>> {
        self.select_folder(folder).await?;
        let uids = self.search_unseen_to(sent_to).await?;
        self.fetch_messages_peek(&uids).await
    }

    async fn mark_seen(&mut self, uid: u32) -> Result<()> {
        self.store_seen(uid).await
    }

    async fn disconnect(&mut self) -> Result<()> {
        ImapClient::disconnect(self).await
    }
}

impl Drop for ImapClient {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("ImapClient dropped without explicit disconnect - session will be closed");
        }
    }
}

/// A tagged NO to SELECT means the folder is missing or not selectable.
fn select_error(folder: &str, error: async_imap::error::Error) -> EmailError {
    match error {
        async_imap::error::Error::No(_) => EmailError::FolderNotFound(folder.to_string()),
        other => EmailError::ProtocolError(other.to_string()),
    }
}

/// Requested UIDs with no message in `fetched`, in request order.
fn missing_uids(requested: &[u32], fetched: &[FetchedMessage]) -> Vec<u32> {
    requested
        .iter()
        .copied()
        .filter(|uid| !fetched.iter().any(|m| m.uid == *uid))
        .collect()
}

/// Builds `UNSEEN TO "<address>"`, quoting the address as an IMAP string.
fn unseen_to_query(sent_to: &str) -> String {
    let escaped = sent_to.replace('\\', "\\\\").replace('"', "\\\"");
    format!("UNSEEN TO \"{}\"", escaped)
}
