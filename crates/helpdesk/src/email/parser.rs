//! Message parsing: headers, bodies and attachments.

use log::debug;
use mail_parser::{HeaderValue, MessageParser, MessagePart, MimeHeaders, PartType};

use super::error::{EmailError, Result};

/// Filename used when an attachment carries no usable name.
pub const DEFAULT_ATTACHMENT_NAME: &str = "Attachment";

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An attachment found in a message.
#[derive(Debug, Clone)]
pub struct ParsedAttachment {
    /// Sanitized filename.
    pub filename: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// The parts of an inbound message the ingestion job looks at.
#[derive(Debug, Clone, Default)]
pub struct ParsedMail {
    pub subject: Option<String>,
    /// First address of the From header.
    pub sender: Option<String>,
    /// Textual headers as (name, trimmed value), in message order.
    pub headers: Vec<(String, String)>,
    pub html_bodies: Vec<String>,
    pub text_bodies: Vec<String>,
    pub attachments: Vec<ParsedAttachment>,
}

impl ParsedMail {
    /// Values of every header named `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Parses raw RFC 822 bytes.
pub fn parse_message(raw: &[u8]) -> Result<ParsedMail> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| EmailError::ParseError("Failed to parse email message".to_string()))?;

    let mut mail = ParsedMail {
        subject: message.subject().map(|s| s.to_string()),
        sender: message
            .from()
            .and_then(|addr| addr.first())
            .and_then(|addr| addr.address())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        ..Default::default()
    };

    for header in message.headers() {
        let value = match header.value() {
            HeaderValue::Text(text) => text.trim().to_string(),
            HeaderValue::TextList(list) => list.join(", ").trim().to_string(),
            // `Auto-Submitted:` with nothing after it still counts
            HeaderValue::Empty => String::new(),
            _ => continue,
        };
        mail.headers.push((header.name().to_string(), value));
    }

    for part in message.parts.iter() {
        if is_attachment(part) {
            let content = match &part.body {
                PartType::Binary(data) | PartType::InlineBinary(data) => data.to_vec(),
                PartType::Text(text) => text.as_bytes().to_vec(),
                PartType::Html(html) => html.as_bytes().to_vec(),
                _ => continue,
            };
            let filename = attachment_filename(part);
            let mime_type = detect_mime_type(part, &filename);

            debug!(
                "Found attachment: {} ({}, {} bytes)",
                filename,
                mime_type,
                content.len()
            );
            mail.attachments.push(ParsedAttachment {
                filename,
                mime_type,
                content,
            });
            continue;
        }

        match &part.body {
            PartType::Html(html) if has_text_subtype(part, "html") => {
                mail.html_bodies.push(html.to_string())
            }
            PartType::Text(text) if has_text_subtype(part, "plain") => {
                mail.text_bodies.push(text.to_string())
            }
            _ => debug!("Skipping non-body part"),
        }
    }

    debug!(
        "Parsed message subject={:?} with {} attachments",
        mail.subject.as_deref().unwrap_or("(no subject)"),
        mail.attachments.len()
    );
    Ok(mail)
}

/// Checks if a message part is an attachment.
fn is_attachment(part: &MessagePart) -> bool {
    if matches!(part.body, PartType::Multipart(_) | PartType::Message(_)) {
        return false;
    }

    if let Some(disposition) = part.content_disposition() {
        if disposition.ctype().eq_ignore_ascii_case("attachment") {
            return true;
        }
    }

    // Inline parts that carry a filename
    if part.attachment_name().is_some() {
        return true;
    }

    if let Some(content_type) = part.content_type() {
        let ctype = content_type.ctype();
        if !ctype.eq_ignore_ascii_case("text")
            && !ctype.eq_ignore_ascii_case("multipart")
            && !ctype.eq_ignore_ascii_case("message")
            && content_type.subtype().is_some()
        {
            return true;
        }
    }

    false
}

/// True for `text/<subtype>` parts. A part without Content-Type is whatever
/// mail-parser decoded it as.
fn has_text_subtype(part: &MessagePart, subtype: &str) -> bool {
    match part.content_type() {
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct
                    .subtype()
                    .map_or(subtype == "plain", |s| s.eq_ignore_ascii_case(subtype))
        }
        None => true,
    }
}

fn attachment_filename(part: &MessagePart) -> String {
    let raw_filename = part
        .attachment_name()
        .or_else(|| part.content_type().and_then(|ct| ct.attribute("name")));

    sanitize_filename(raw_filename.unwrap_or_default())
}

/// Declared Content-Type, else a guess from the filename, else octet-stream.
fn detect_mime_type(part: &MessagePart, filename: &str) -> String {
    if let Some(ct) = part.content_type() {
        if let Some(subtype) = ct.subtype() {
            return format!("{}/{}", ct.ctype(), subtype).to_lowercase();
        }
    }

    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

/// Replaces path separators and other unsafe characters, caps the length.
pub fn sanitize_filename(filename: &str) -> String {
    let filename = filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();

    // Remove leading/trailing dots and spaces
    let filename = filename.trim_matches(|c| c == '.' || c == ' ');

    if filename.is_empty() {
        return DEFAULT_ATTACHMENT_NAME.to_string();
    }

    if filename.chars().count() > 255 {
        let ext: String = match filename.rfind('.') {
            Some(pos) if filename.len() - pos <= 16 => filename[pos..].to_string(),
            _ => String::new(),
        };
        let base: String = filename
            .chars()
            .take(255 - ext.chars().count())
            .collect();
        format!("{}{}", base, ext)
    } else {
        filename.to_string()
    }
}
