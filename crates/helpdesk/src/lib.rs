pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod secrets;
pub mod storage;

pub use config::{load_config, Config};
pub use db::Database;
pub use email::{ImapClient, Mailbox};
pub use error::{ConfigError, HelpdeskError, Result, StorageError};
pub use ingest::{CheckMail, Outcome, RunReport};
pub use secrets::{resolve_secret, SecretError};
pub use storage::AttachmentStore;
