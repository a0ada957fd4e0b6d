//! Test harness for isolated ingestion runs.
//!
//! Each `TestHarness` owns an in-memory database, a temporary attachments
//! directory and a config pointing at them.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use helpdesk::db::{project_repo, Database};
use helpdesk::ingest::CheckMail;
use helpdesk::storage::AttachmentStore;
use helpdesk::Config;

pub const SUPPORT_ADDRESS: &str = "support@example.com";

pub struct TestHarness {
    temp_dir: TempDir,
    pub db: Database,
    pub attachments_dir: PathBuf,
    pub config: Config,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let attachments_dir = temp_dir.path().join("attachments");
        let db = Database::open_in_memory().expect("Failed to open database");

        let mut config = Config::new("imap.example.com", "helpdesk@example.com");
        config.password_env_var = Some("HELPDESK_TEST_PASSWORD".to_string());
        config.attachments_directory = Some(attachments_dir.clone());

        Self {
            temp_dir,
            db,
            attachments_dir,
            config,
        }
    }

    pub fn job(&self) -> CheckMail {
        CheckMail::new(
            self.config.clone(),
            self.db.clone(),
            AttachmentStore::new(&self.attachments_dir),
        )
    }

    pub fn add_project(&self, title: &str, email: &str, default_assignee: Option<&str>) -> i64 {
        project_repo::insert_project(&self.db, title, email, default_assignee)
            .expect("Failed to insert project")
    }

    pub fn add_alias(&self, project_id: i64, email: &str, assignee: Option<&str>) -> i64 {
        project_repo::insert_alias(&self.db, project_id, email, assignee)
            .expect("Failed to insert alias")
    }

    /// Inserts a ticket with a fixed id, as if created earlier by another path.
    pub fn add_ticket_with_id(&self, id: i64, project_id: i64, customer: &str) {
        self.db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO tickets (id, project_id, title, body, customer, created_at)
                     VALUES (?1, ?2, 'Existing ticket', '', ?3, '2026-10-01T00:00:00+00:00')",
                    rusqlite::params![id, project_id, customer],
                )?;
                Ok(())
            })
            .expect("Failed to insert ticket");
    }
}
