//! Shared test utilities for helpdesk integration tests.
//!
//! This module provides:
//! - `TestHarness` with an in-memory database and a temp attachments directory
//! - `FakeMailbox`, an in-memory `Mailbox`
//! - `MessageBuilder` for raw RFC 822 messages

pub mod builders;
pub mod harness;
pub mod mailbox;

pub use builders::*;
pub use harness::TestHarness;
pub use mailbox::FakeMailbox;
