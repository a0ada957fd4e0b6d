//! Builders for raw test messages.

#![allow(dead_code)]

const BOUNDARY: &str = "helpdesk-test-boundary";

struct Attachment {
    filename: Option<String>,
    mime_type: String,
    content: String,
}

/// Builds a raw RFC 822 message.
///
/// Single-part when there is at most one body and no attachment,
/// `multipart/mixed` otherwise.
pub struct MessageBuilder {
    from: Option<String>,
    to: String,
    subject: Option<String>,
    headers: Vec<(String, String)>,
    text: Option<String>,
    html: Option<String>,
    attachments: Vec<Attachment>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            from: Some("customer@example.com".to_string()),
            to: "support@example.com".to_string(),
            subject: Some("Test message".to_string()),
            headers: Vec::new(),
            text: Some("Test body".to_string()),
            html: None,
            attachments: Vec::new(),
        }
    }

    pub fn from(mut self, from: &str) -> Self {
        self.from = Some(from.to_string());
        self
    }

    pub fn without_from(mut self) -> Self {
        self.from = None;
        self
    }

    pub fn to(mut self, to: &str) -> Self {
        self.to = to.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn without_subject(mut self) -> Self {
        self.subject = None;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn without_text(mut self) -> Self {
        self.text = None;
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    /// Adds an attachment. `content` is sent without transfer encoding, so
    /// keep it to ASCII.
    pub fn attachment(mut self, filename: &str, mime_type: &str, content: &str) -> Self {
        self.attachments.push(Attachment {
            filename: Some(filename.to_string()),
            mime_type: mime_type.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn unnamed_attachment(mut self, mime_type: &str, content: &str) -> Self {
        self.attachments.push(Attachment {
            filename: None,
            mime_type: mime_type.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = String::new();
        if let Some(from) = &self.from {
            out.push_str(&format!("From: {}\r\n", from));
        }
        out.push_str(&format!("To: {}\r\n", self.to));
        if let Some(subject) = &self.subject {
            out.push_str(&format!("Subject: {}\r\n", subject));
        }
        out.push_str("Date: Mon, 19 Oct 2026 10:00:00 +0000\r\n");
        for (name, value) in &self.headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str("MIME-Version: 1.0\r\n");

        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(format!("Content-Type: text/plain; charset=utf-8\r\n\r\n{}", text));
        }
        if let Some(html) = &self.html {
            parts.push(format!("Content-Type: text/html; charset=utf-8\r\n\r\n{}", html));
        }
        for attachment in &self.attachments {
            let part = match &attachment.filename {
                Some(name) => format!(
                    "Content-Type: {}; name=\"{}\"\r\n\
                     Content-Disposition: attachment; filename=\"{}\"\r\n\r\n{}",
                    attachment.mime_type, name, name, attachment.content
                ),
                None => format!(
                    "Content-Type: {}\r\nContent-Disposition: attachment\r\n\r\n{}",
                    attachment.mime_type, attachment.content
                ),
            };
            parts.push(part);
        }

        match parts.len() {
            0 => out.push_str("\r\n"),
            1 if self.attachments.is_empty() => out.push_str(&parts[0]),
            _ => {
                out.push_str(&format!(
                    "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
                    BOUNDARY
                ));
                for part in &parts {
                    out.push_str(&format!("--{}\r\n{}\r\n", BOUNDARY, part));
                }
                out.push_str(&format!("--{}--\r\n", BOUNDARY));
            }
        }

        out.into_bytes()
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
