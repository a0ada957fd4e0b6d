//! `check-mail`: one ingestion pass over the helpdesk mailbox.

use std::process::ExitCode;

use tracing::{error, info};

use helpdesk::config::{config_path, load_config};
use helpdesk::db::Database;
use helpdesk::email::ImapClient;
use helpdesk::ingest::{CheckMail, RunReport};
use helpdesk::logging::{init_logging, LogFormat};
use helpdesk::storage::AttachmentStore;
use helpdesk::HelpdeskError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging(LogFormat::from_env()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run().await {
        Ok(report) => {
            if report.failed() > 0 {
                info!("{} message(s) could not be processed", report.failed());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("check_mail aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunReport, HelpdeskError> {
    let path = config_path()?;
    info!("Loading configuration from {}", path.display());
    let config = load_config(&path)?;

    let db = Database::open(&config.resolved_database_path()?)?;
    let store = AttachmentStore::new(config.resolved_attachments_directory()?);

    let mut client = ImapClient::new(config.clone());
    let job = CheckMail::new(config, db, store);

    job.run(&mut client).await
}
