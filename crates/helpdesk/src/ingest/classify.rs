//! Message classification helpers.

use crate::email::ParsedMail;

/// Headers whose presence marks an automatic reply. Any value counts, empty
/// included, except `no`, which is matched case-insensitively (RFC 3834).
const AUTOREPLY_HEADERS: [&str; 2] = ["Auto-Submitted", "X-AutoReply"];

/// Returns true when the message was generated automatically
/// (vacation notices, bounces and the like).
pub fn is_autoreply(mail: &ParsedMail) -> bool {
    AUTOREPLY_HEADERS.iter().any(|name| {
        mail.header_values(name)
            .any(|value| !value.eq_ignore_ascii_case("no"))
    })
}

/// First HTML body, else first plain-text body, else an empty string.
pub fn extract_body(mail: &ParsedMail) -> String {
    mail.html_bodies
        .first()
        .or_else(|| mail.text_bodies.first())
        .cloned()
        .unwrap_or_default()
}
