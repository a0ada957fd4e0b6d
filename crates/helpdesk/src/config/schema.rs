use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for a `check-mail` run.
///
/// Loaded once at startup and passed explicitly to the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IMAP server hostname (e.g., "imap.example.com").
    pub imap_host: String,

    /// IMAP server port (default: 993 for IMAPS).
    #[serde(default = "default_imap_port")]
    pub imap_port: u16,

    /// Whether to use TLS. Connecting without TLS is refused.
    #[serde(default = "default_true")]
    pub use_tls: bool,

    /// Mailbox login, typically the support address itself.
    pub username: String,

    /// Direct password value. Prefer `password_file` or `password_env_var`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// File containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<String>,

    /// Environment variable containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env_var: Option<String>,

    /// IMAP folder to poll (default: "INBOX").
    #[serde(default = "default_inbox")]
    pub folder: String,

    /// Skip messages carrying `Auto-Submitted` / `X-AutoReply` headers.
    #[serde(default = "default_true")]
    pub ignore_autoreply: bool,

    /// Flag handled and skipped messages as `\Seen` on the server.
    #[serde(default = "default_true")]
    pub mark_seen: bool,

    /// SQLite database holding projects, tickets and comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Root directory for stored attachment files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments_directory: Option<PathBuf>,
}

fn default_imap_port() -> u16 {
    993
}

fn default_true() -> bool {
    true
}

fn default_inbox() -> String {
    "INBOX".to_string()
}

impl Config {
    /// Creates a config with defaults for everything but the session parameters.
    pub fn new(imap_host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            imap_host: imap_host.into(),
            imap_port: default_imap_port(),
            use_tls: true,
            username: username.into(),
            password: None,
            password_file: None,
            password_env_var: None,
            folder: default_inbox(),
            ignore_autoreply: true,
            mark_seen: true,
            database_path: None,
            attachments_directory: None,
        }
    }
}
